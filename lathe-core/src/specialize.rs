//! Backend specialization of builtin sequence operations.
//!
//! Binds whose right-hand side calls a recognized builtin get a precise
//! implementation type for the bound name, so the serializer can declare it
//! with the lazy sequence type the runtime provides:
//!
//!   ys = map1(fn_f(), xs)
//!     ys : transformed_sequence<fn_f, thrust::tuple<Txs>>
//!
//!   is = indices(xs)
//!     is : index_sequence
//!
//! The call itself is carried over unchanged. Rules are looked up by callee
//! name; binds of anything else are copied structurally.

use crate::ast::*;
use crate::error::Result;
use crate::markers::{
    closure_tag, fnize_id, map_arity, typify, INDEX_SEQUENCE, MAX_MAP_ARITY, TRANSFORMED_SEQUENCE,
    TUPLE_TEMPLATE,
};
use crate::rewrite::{walk_bind, Rewriter, StmtRewrite};
use crate::types::{is_integer_type, CType};
use crate::{bail_shape, bail_type_shape, err_shape};
use log::trace;
use std::collections::HashMap;
use std::rc::Rc;

/// Specialize every recognized builtin bind in `program`.
pub fn specialize(program: &Suite) -> Result<Suite> {
    Specializer::new().rewrite_suite(program)
}

type RewriteFn = fn(&Bind, &Apply) -> Result<Bind>;

struct Specializer {
    rules: HashMap<String, RewriteFn>,
}

impl Specializer {
    fn new() -> Self {
        let mut rules: HashMap<String, RewriteFn> = HashMap::new();
        for arity in 1..=MAX_MAP_ARITY {
            rules.insert(format!("map{}", arity), map_rewrite);
        }
        rules.insert("indices".to_string(), indices_rewrite);
        Specializer { rules }
    }
}

impl Rewriter for Specializer {
    fn rewrite_bind(&mut self, n: &Bind) -> Result<StmtRewrite> {
        let rule = n.rhs.as_apply().and_then(|rhs| self.rules.get(&rhs.func.id).map(|rule| (*rule, rhs)));
        match rule {
            Some((rule, rhs)) => Ok(StmtRewrite::single(rule(n, rhs)?)),
            None => Ok(StmtRewrite::single(walk_bind(self, n)?)),
        }
    }
}

/// Rebind `lhs` with a new implementation type, keeping the call by reference.
fn retype(n: &Bind, ctype: CType) -> Bind {
    Bind {
        lhs: n.lhs.clone().with_ctype(ctype),
        rhs: Rc::clone(&n.rhs),
    }
}

fn map_rewrite(n: &Bind, rhs: &Apply) -> Result<Bind> {
    let arity = map_arity(&rhs.func.id)
        .ok_or_else(|| err_shape!("{} is not a supported map arity", rhs.func.id))?;
    let Some((func, sequences)) = rhs.args.values.split_first() else {
        bail_shape!("{} must have arguments", rhs.func.id);
    };
    if sequences.len() != arity {
        bail_shape!(
            "{} applied to {} sequences, expected {}",
            rhs.func.id,
            sequences.len(),
            arity
        );
    }

    let fn_tag = match func.as_ref() {
        // Function instantiation
        Expr::Apply(inst) if inst.func.is_templated() => {
            CType::templated(CType::mono(inst.func.id.clone()), inst.func.template_args.clone())
        }
        Expr::Apply(inst) => CType::mono(inst.func.id.clone()),
        Expr::Name(f) => CType::mono(fnize_id(&f.id)),
        Expr::Closure(c) => closure_type(c)?,
        other => bail_shape!(
            "First argument of {} must be a function or closure, found {}",
            rhs.func.id,
            other.kind_name()
        ),
    };

    // Element types are named after the sequence they come from; the
    // serializer declares a matching type parameter for each.
    let mut elem_types = Vec::with_capacity(sequences.len());
    for seq in sequences {
        let Some(name) = seq.as_name() else {
            bail_shape!("Sequence arguments of {} must be names, found {}", rhs.func.id, seq.kind_name());
        };
        elem_types.push(CType::mono(typify(&name.id)));
    }

    let tupled = CType::templated(CType::mono(TUPLE_TEMPLATE), elem_types);
    let transformed = CType::templated(CType::mono(TRANSFORMED_SEQUENCE), vec![fn_tag, tupled]);
    trace!("Specialized {} = {}(...) as {}", n.lhs.id, rhs.func.id, transformed);
    Ok(retype(n, transformed))
}

/// `closureN<captured..., fn_body>` for a closure capturing N values.
fn closure_type(c: &Closure) -> Result<CType> {
    let arity = c.args.arity();
    if arity == 0 {
        bail_shape!("Closure must capture at least one value");
    }
    let Some(body_id) = c.body_id() else {
        bail_shape!("Closure body must be a name or an apply, found {}", c.body.kind_name());
    };
    let mut args: Vec<CType> = c.args.iter().map(|a| a.ctype().clone()).collect();
    args.push(CType::mono(fnize_id(body_id)));
    Ok(CType::templated(CType::mono(closure_tag(arity)), args))
}

fn indices_rewrite(n: &Bind, rhs: &Apply) -> Result<Bind> {
    let [arg] = rhs.args.values.as_slice() else {
        bail_shape!("indices takes exactly one argument, found {}", rhs.args.arity());
    };
    match arg.ty().sequence_elem() {
        Some(elem) if is_integer_type(elem) => {}
        _ => bail_type_shape!("indices expects a sequence of integers, found {}", arg.ty()),
    }
    trace!("Specialized {} = indices(...) as {}", n.lhs.id, INDEX_SEQUENCE);
    Ok(retype(n, CType::mono(INDEX_SEQUENCE)))
}
