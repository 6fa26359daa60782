//! Tree grammar shared by every pass.
//!
//! Expressions carry both a source [`Type`] and an implementation [`CType`];
//! both default to void until a pass assigns them. Nodes are never mutated
//! once built: passes construct new nodes and share untouched subtrees through
//! `Rc` clones.

use crate::types::{CType, Type};
use std::rc::Rc;

// =============================================================================
// Expressions
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Name(Name),
    Tuple(Tuple),
    Apply(Apply),
    Lambda(Lambda),
    Closure(Closure),
}

/// Literal constant, kept as source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: String,
    pub ty: Type,
    pub ctype: CType,
}

/// Identifier. `template_args` is non-empty only for explicit template
/// instantiations synthesized by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Name {
    pub id: String,
    pub template_args: Vec<CType>,
    pub ty: Type,
    pub ctype: CType,
}

/// Ordered expression list. Used for argument lists as well as tuple values.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    pub values: Vec<Rc<Expr>>,
    pub ty: Type,
    pub ctype: CType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Apply {
    pub func: Name,
    pub args: Tuple,
    pub ty: Type,
    pub ctype: CType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub args: Tuple,
    pub body: Rc<Expr>,
    pub ty: Type,
    pub ctype: CType,
}

/// Explicit closure: the captured values and the function they are passed to.
/// The body is either a `Name` of a procedure or an `Apply`.
#[derive(Debug, Clone, PartialEq)]
pub struct Closure {
    pub args: Tuple,
    pub body: Rc<Expr>,
    pub ty: Type,
    pub ctype: CType,
}

impl Expr {
    pub fn ty(&self) -> &Type {
        match self {
            Expr::Literal(n) => &n.ty,
            Expr::Name(n) => &n.ty,
            Expr::Tuple(n) => &n.ty,
            Expr::Apply(n) => &n.ty,
            Expr::Lambda(n) => &n.ty,
            Expr::Closure(n) => &n.ty,
        }
    }

    pub fn ctype(&self) -> &CType {
        match self {
            Expr::Literal(n) => &n.ctype,
            Expr::Name(n) => &n.ctype,
            Expr::Tuple(n) => &n.ctype,
            Expr::Apply(n) => &n.ctype,
            Expr::Lambda(n) => &n.ctype,
            Expr::Closure(n) => &n.ctype,
        }
    }

    pub fn as_name(&self) -> Option<&Name> {
        match self {
            Expr::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_apply(&self) -> Option<&Apply> {
        match self {
            Expr::Apply(n) => Some(n),
            _ => None,
        }
    }

    /// Short node-kind label for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Literal(_) => "literal",
            Expr::Name(_) => "name",
            Expr::Tuple(_) => "tuple",
            Expr::Apply(_) => "apply",
            Expr::Lambda(_) => "lambda",
            Expr::Closure(_) => "closure",
        }
    }
}

impl Literal {
    pub fn new(value: impl Into<String>) -> Self {
        Literal {
            value: value.into(),
            ty: Type::void(),
            ctype: CType::void(),
        }
    }

    pub fn with_type(self, ty: Type) -> Self {
        Literal { ty, ..self }
    }
}

impl Name {
    pub fn new(id: impl Into<String>) -> Self {
        Name {
            id: id.into(),
            template_args: Vec::new(),
            ty: Type::void(),
            ctype: CType::void(),
        }
    }

    /// A typed name, as delivered by the type checker.
    pub fn typed(id: impl Into<String>, ty: Type) -> Self {
        Name::new(id).with_type(ty)
    }

    pub fn with_type(self, ty: Type) -> Self {
        Name { ty, ..self }
    }

    pub fn with_ctype(self, ctype: CType) -> Self {
        Name { ctype, ..self }
    }

    pub fn with_template_args(self, template_args: Vec<CType>) -> Self {
        Name { template_args, ..self }
    }

    pub fn is_templated(&self) -> bool {
        !self.template_args.is_empty()
    }
}

impl Tuple {
    pub fn new(values: Vec<Rc<Expr>>) -> Self {
        Tuple {
            values,
            ty: Type::void(),
            ctype: CType::void(),
        }
    }

    pub fn empty() -> Self {
        Tuple::new(Vec::new())
    }

    /// Tuple of plain names, the shape of every formal argument list.
    pub fn of_names(names: impl IntoIterator<Item = Name>) -> Self {
        Tuple::new(names.into_iter().map(|n| Rc::new(Expr::Name(n))).collect())
    }

    pub fn arity(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<Expr>> {
        self.values.iter()
    }

    /// Source types of the elements, as a tuple type.
    pub fn element_types(&self) -> Type {
        Type::Tuple(self.values.iter().map(|v| v.ty().clone()).collect())
    }
}

impl Apply {
    pub fn new(func: Name, args: Tuple) -> Self {
        Apply {
            func,
            args,
            ty: Type::void(),
            ctype: CType::void(),
        }
    }

    pub fn with_type(self, ty: Type) -> Self {
        Apply { ty, ..self }
    }

    pub fn with_ctype(self, ctype: CType) -> Self {
        Apply { ctype, ..self }
    }
}

impl Lambda {
    pub fn new(args: Tuple, body: Rc<Expr>) -> Self {
        Lambda {
            args,
            body,
            ty: Type::void(),
            ctype: CType::void(),
        }
    }
}

impl Closure {
    pub fn new(args: Tuple, body: Rc<Expr>) -> Self {
        Closure {
            args,
            body,
            ty: Type::void(),
            ctype: CType::void(),
        }
    }

    /// Identifier of the procedure this closure calls.
    pub fn body_id(&self) -> Option<&str> {
        match self.body.as_ref() {
            Expr::Name(n) => Some(&n.id),
            Expr::Apply(a) => Some(&a.func.id),
            _ => None,
        }
    }
}

impl From<Literal> for Expr {
    fn from(n: Literal) -> Self {
        Expr::Literal(n)
    }
}

impl From<Name> for Expr {
    fn from(n: Name) -> Self {
        Expr::Name(n)
    }
}

impl From<Tuple> for Expr {
    fn from(n: Tuple) -> Self {
        Expr::Tuple(n)
    }
}

impl From<Apply> for Expr {
    fn from(n: Apply) -> Self {
        Expr::Apply(n)
    }
}

impl From<Lambda> for Expr {
    fn from(n: Lambda) -> Self {
        Expr::Lambda(n)
    }
}

impl From<Closure> for Expr {
    fn from(n: Closure) -> Self {
        Expr::Closure(n)
    }
}

// =============================================================================
// Statements and declarations
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Procedure(Procedure),
    Structure(Structure),
    Bind(Bind),
    Ret(Ret),
    Conditional(Conditional),
    Typedefn(Typedefn),
    Namespace(Namespace),
    Include(Include),
}

/// Ordered statement list. A whole program is a `Suite`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Suite {
    pub stmts: Vec<Rc<Stmt>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Procedure {
    pub id: Name,
    pub args: Tuple,
    pub body: Suite,
    pub ty: Type,
    pub ctype: CType,
    /// Placement qualifier printed before the signature (e.g. a device qualifier).
    pub place: Option<String>,
}

/// Generated function-object type definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    pub id: Name,
    pub body: Suite,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bind {
    pub lhs: Name,
    pub rhs: Rc<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ret {
    pub val: Rc<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    pub cond: Rc<Expr>,
    pub then_branch: Suite,
    pub else_branch: Suite,
}

/// Type alias declaration: `rename` names `origin`.
#[derive(Debug, Clone, PartialEq)]
pub struct Typedefn {
    pub origin: CType,
    pub rename: CType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Namespace {
    pub name: String,
    pub body: Suite,
}

/// Header inclusion. `system` selects angle brackets over quotes.
#[derive(Debug, Clone, PartialEq)]
pub struct Include {
    pub target: String,
    pub system: bool,
}

impl Stmt {
    pub fn as_procedure(&self) -> Option<&Procedure> {
        match self {
            Stmt::Procedure(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_bind(&self) -> Option<&Bind> {
        match self {
            Stmt::Bind(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_structure(&self) -> Option<&Structure> {
        match self {
            Stmt::Structure(s) => Some(s),
            _ => None,
        }
    }
}

impl Suite {
    pub fn new(stmts: Vec<Rc<Stmt>>) -> Self {
        Suite { stmts }
    }

    pub fn from_stmts(stmts: impl IntoIterator<Item = Stmt>) -> Self {
        Suite {
            stmts: stmts.into_iter().map(Rc::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<Stmt>> {
        self.stmts.iter()
    }

    /// Top-level procedures, in program order.
    pub fn procedures(&self) -> impl Iterator<Item = &Procedure> {
        self.stmts.iter().filter_map(|s| s.as_procedure())
    }
}

impl Procedure {
    /// A procedure as delivered by the type checker: ctype still void.
    pub fn new(id: impl Into<String>, args: Tuple, body: Suite, ty: Type) -> Self {
        Procedure {
            id: Name::typed(id, ty.clone()),
            args,
            body,
            ty,
            ctype: CType::void(),
            place: None,
        }
    }
}

impl Bind {
    pub fn new(lhs: Name, rhs: impl Into<Expr>) -> Self {
        Bind {
            lhs,
            rhs: Rc::new(rhs.into()),
        }
    }
}

impl Ret {
    pub fn new(val: impl Into<Expr>) -> Self {
        Ret {
            val: Rc::new(val.into()),
        }
    }
}

impl From<Procedure> for Stmt {
    fn from(n: Procedure) -> Self {
        Stmt::Procedure(n)
    }
}

impl From<Structure> for Stmt {
    fn from(n: Structure) -> Self {
        Stmt::Structure(n)
    }
}

impl From<Bind> for Stmt {
    fn from(n: Bind) -> Self {
        Stmt::Bind(n)
    }
}

impl From<Ret> for Stmt {
    fn from(n: Ret) -> Self {
        Stmt::Ret(n)
    }
}

impl From<Conditional> for Stmt {
    fn from(n: Conditional) -> Self {
        Stmt::Conditional(n)
    }
}

impl From<Typedefn> for Stmt {
    fn from(n: Typedefn) -> Self {
        Stmt::Typedefn(n)
    }
}

impl From<Namespace> for Stmt {
    fn from(n: Namespace) -> Self {
        Stmt::Namespace(n)
    }
}

impl From<Include> for Stmt {
    fn from(n: Include) -> Self {
        Stmt::Include(n)
    }
}
