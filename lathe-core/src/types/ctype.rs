//! Implementation types: the target-language view of every node.

use std::fmt;

/// Implementation type.
///
/// Mirrors [`super::Type`] and adds `Templated`, which stands for a generated
/// template instantiation such as `transformed_sequence<fn_f, tuple<T>>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CType {
    Monotype(String),
    Polytype { vars: Vec<CType>, body: Box<CType> },
    Sequence(Box<CType>),
    Tuple(Vec<CType>),
    Fn { args: Vec<CType>, result: Box<CType> },
    Templated { base: Box<CType>, args: Vec<CType> },
}

impl CType {
    pub fn mono(name: impl Into<String>) -> CType {
        CType::Monotype(name.into())
    }

    /// The implementation void type, which every node carries until lowered.
    pub fn void() -> CType {
        CType::Monotype("void".to_string())
    }

    pub fn is_void(&self) -> bool {
        matches!(self, CType::Monotype(name) if name == "void")
    }

    pub fn seq(elem: CType) -> CType {
        CType::Sequence(Box::new(elem))
    }

    pub fn func(args: Vec<CType>, result: CType) -> CType {
        CType::Fn {
            args,
            result: Box::new(result),
        }
    }

    pub fn templated(base: CType, args: Vec<CType>) -> CType {
        CType::Templated {
            base: Box::new(base),
            args,
        }
    }

    pub fn sequence_elem(&self) -> Option<&CType> {
        match self {
            CType::Sequence(elem) => Some(elem),
            _ => None,
        }
    }

    /// Result type of a function ctype. A templated function (a lowered
    /// polytype) answers with the result of its base.
    pub fn fn_result(&self) -> Option<&CType> {
        match self {
            CType::Fn { result, .. } => Some(result),
            CType::Templated { base, .. } => match base.as_ref() {
                CType::Fn { result, .. } => Some(result),
                _ => None,
            },
            _ => None,
        }
    }
}

impl Default for CType {
    fn default() -> Self {
        CType::void()
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[CType]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for CType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CType::Monotype(name) => write!(f, "{}", name),
            CType::Polytype { vars, body } => {
                write!(f, "template<")?;
                write_list(f, vars)?;
                write!(f, "> {}", body)
            }
            CType::Sequence(elem) => write!(f, "sequence<{}>", elem),
            CType::Tuple(elems) => {
                write!(f, "tuple<")?;
                write_list(f, elems)?;
                write!(f, ">")
            }
            CType::Fn { args, result } => {
                write!(f, "fn<(")?;
                write_list(f, args)?;
                write!(f, "), {}>", result)
            }
            CType::Templated { base, args } => {
                write!(f, "{}<", base)?;
                write_list(f, args)?;
                write!(f, ">")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_templated() {
        let ty = CType::templated(
            CType::mono("transformed_sequence"),
            vec![CType::mono("fn_f"), CType::templated(CType::mono("thrust::tuple"), vec![CType::mono("float32")])],
        );
        assert_eq!(ty.to_string(), "transformed_sequence<fn_f, thrust::tuple<float32>>");
    }

    #[test]
    fn test_fn_result_through_template() {
        let f = CType::func(vec![CType::mono("a")], CType::mono("a"));
        let t = CType::templated(f.clone(), vec![CType::mono("a")]);
        assert_eq!(f.fn_result(), Some(&CType::mono("a")));
        assert_eq!(t.fn_result(), Some(&CType::mono("a")));
        assert_eq!(CType::void().fn_result(), None);
    }
}
