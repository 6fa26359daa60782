//! Type lowering: attach implementation types to the tree.
//!
//! Source types map homomorphically onto implementation types. Builtin scalar
//! names go through the fixed table in [`crate::markers::SCALAR_TYPES`]; any
//! other name is an opaque user or library type and passes through. A
//! top-level polytype becomes a template over its lowered body.
//!
//! Example:
//!   forall a. ([a], Int32) -> a   ~>   fn<(sequence<a>, int32), a><a>

use crate::ast::{Apply, Closure, Lambda, Literal, Name, Procedure, Suite, Tuple};
use crate::bail_type_shape;
use crate::error::Result;
use crate::markers::scalar_ctype_name;
use crate::rewrite::{
    walk_apply, walk_closure, walk_lambda, walk_procedure, walk_tuple, Rewriter, StmtRewrite,
};
use crate::types::{CType, Type};

/// Lower a source type, allowing a polytype only at the top.
pub fn lower_type(ty: &Type) -> Result<CType> {
    match ty {
        Type::Polytype { vars, body } => {
            let base = lower_monotype(body)?;
            let args = vars.iter().map(lower_monotype).collect::<Result<Vec<_>>>()?;
            Ok(CType::templated(base, args))
        }
        other => lower_monotype(other),
    }
}

fn lower_monotype(ty: &Type) -> Result<CType> {
    Ok(match ty {
        Type::Monotype(name) => match scalar_ctype_name(name) {
            Some(imp) => CType::mono(imp),
            None => CType::mono(name.clone()),
        },
        Type::Polytype { .. } => {
            bail_type_shape!("Polytype {} may not appear nested inside a type", ty)
        }
        Type::Sequence(elem) => CType::seq(lower_monotype(elem)?),
        Type::Tuple(elems) => CType::Tuple(elems.iter().map(lower_monotype).collect::<Result<_>>()?),
        Type::Fn { args, result } => CType::func(
            args.iter().map(lower_monotype).collect::<Result<_>>()?,
            lower_monotype(result)?,
        ),
    })
}

/// Lowered `ty`, or `current` when the node has no source type yet.
fn lower_typed(ty: &Type, current: &CType) -> Result<CType> {
    if ty.is_void() {
        return Ok(current.clone());
    }
    lower_type(ty)
}

/// Attach a lowered implementation type to every typed node of `program`.
pub fn lower_types(program: &Suite) -> Result<Suite> {
    TypeLowering.rewrite_suite(program)
}

struct TypeLowering;

impl Rewriter for TypeLowering {
    fn rewrite_name(&mut self, n: &Name) -> Result<Name> {
        Ok(Name {
            ctype: lower_type(&n.ty)?,
            ..n.clone()
        })
    }

    fn rewrite_literal(&mut self, n: &Literal) -> Result<Literal> {
        Ok(Literal {
            ctype: lower_typed(&n.ty, &n.ctype)?,
            ..n.clone()
        })
    }

    fn rewrite_tuple(&mut self, n: &Tuple) -> Result<Tuple> {
        let walked = walk_tuple(self, n)?;
        let ctype = lower_typed(&n.ty, &n.ctype)?;
        Ok(Tuple { ctype, ..walked })
    }

    fn rewrite_apply(&mut self, n: &Apply) -> Result<Apply> {
        let walked = walk_apply(self, n)?;
        let ctype = lower_typed(&n.ty, &n.ctype)?;
        Ok(Apply { ctype, ..walked })
    }

    fn rewrite_lambda(&mut self, n: &Lambda) -> Result<Lambda> {
        let walked = walk_lambda(self, n)?;
        let ctype = lower_typed(&n.ty, &n.ctype)?;
        Ok(Lambda { ctype, ..walked })
    }

    fn rewrite_closure(&mut self, n: &Closure) -> Result<Closure> {
        let walked = walk_closure(self, n)?;
        let ctype = lower_typed(&n.ty, &n.ctype)?;
        Ok(Closure { ctype, ..walked })
    }

    fn rewrite_procedure(&mut self, n: &Procedure) -> Result<StmtRewrite> {
        let walked = walk_procedure(self, n)?;
        let ctype = lower_type(&n.ty)?;
        Ok(StmtRewrite::single(Procedure { ctype, ..walked }))
    }
}
