//! Type algebras for the lathe pipeline.
//!
//! This module contains:
//! - `Type`: source-level types, as produced by the external type checker
//! - `CType`: implementation types used by the serializer (`ctype` submodule)
//! - Helper functions for creating common types (int32, seq, func, etc.)
//!
//! Both algebras are plain values with structural equality. A polytype is only
//! valid at the top of a type; every pass that walks a type treats a nested
//! polytype as a type-shape violation.

pub mod ctype;

pub use ctype::CType;

use std::fmt;

/// Source type.
///
/// `Monotype` leaves double as type variables inside the body of a `Polytype`:
/// `forall a. (a) -> a` is `Polytype { vars: [a], body: Fn { args: [a], result: a } }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Monotype(String),
    Polytype { vars: Vec<Type>, body: Box<Type> },
    Sequence(Box<Type>),
    Tuple(Vec<Type>),
    /// Function type. The argument list is always a tuple, so it is stored
    /// as the tuple's element list.
    Fn { args: Vec<Type>, result: Box<Type> },
}

impl Type {
    pub fn mono(name: impl Into<String>) -> Type {
        Type::Monotype(name.into())
    }

    /// The source void type, which every node carries until assigned.
    pub fn void() -> Type {
        Type::Monotype("Void".to_string())
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Monotype(name) if name == "Void")
    }

    /// Name of a monotype leaf, if this is one.
    pub fn as_monotype(&self) -> Option<&str> {
        match self {
            Type::Monotype(name) => Some(name),
            _ => None,
        }
    }

    /// Element type of a sequence, if this is one.
    pub fn sequence_elem(&self) -> Option<&Type> {
        match self {
            Type::Sequence(elem) => Some(elem),
            _ => None,
        }
    }

    /// Argument and result types of a function type, looking through a
    /// top-level polytype.
    pub fn as_fn(&self) -> Option<(&[Type], &Type)> {
        match self {
            Type::Fn { args, result } => Some((args, result)),
            Type::Polytype { body, .. } => match body.as_ref() {
                Type::Fn { args, result } => Some((args, result)),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn is_polytype(&self) -> bool {
        matches!(self, Type::Polytype { .. })
    }
}

impl Default for Type {
    fn default() -> Self {
        Type::void()
    }
}

// =============================================================================
// Type construction helpers
// =============================================================================

pub fn int32() -> Type {
    Type::mono("Int32")
}

pub fn int64() -> Type {
    Type::mono("Int64")
}

pub fn uint32() -> Type {
    Type::mono("Uint32")
}

pub fn uint64() -> Type {
    Type::mono("Uint64")
}

pub fn float32() -> Type {
    Type::mono("Float32")
}

pub fn float64() -> Type {
    Type::mono("Float64")
}

pub fn bool_type() -> Type {
    Type::mono("Bool")
}

pub fn seq(elem: Type) -> Type {
    Type::Sequence(Box::new(elem))
}

pub fn tuple(elems: Vec<Type>) -> Type {
    Type::Tuple(elems)
}

pub fn func(args: Vec<Type>, result: Type) -> Type {
    Type::Fn {
        args,
        result: Box::new(result),
    }
}

/// Quantify `body` over the named type variables.
pub fn forall(vars: &[&str], body: Type) -> Type {
    Type::Polytype {
        vars: vars.iter().map(|v| Type::mono(*v)).collect(),
        body: Box::new(body),
    }
}

/// Integer monotypes, the only element types accepted by `indices`.
pub const INTEGER_TYPE_NAMES: [&str; 4] = ["Int32", "Int64", "Uint32", "Uint64"];

pub fn is_integer_type(ty: &Type) -> bool {
    matches!(ty, Type::Monotype(name) if INTEGER_TYPE_NAMES.contains(&name.as_str()))
}

// =============================================================================
// Formatting
// =============================================================================

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Monotype(name) => write!(f, "{}", name),
            Type::Polytype { vars, body } => {
                write!(f, "forall ")?;
                write_list(f, vars)?;
                write!(f, ". {}", body)
            }
            Type::Sequence(elem) => write!(f, "[{}]", elem),
            Type::Tuple(elems) => {
                write!(f, "(")?;
                write_list(f, elems)?;
                write!(f, ")")
            }
            Type::Fn { args, result } => {
                write!(f, "(")?;
                write_list(f, args)?;
                write!(f, ") -> {}", result)
            }
        }
    }
}
