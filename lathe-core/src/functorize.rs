//! Functorization: closure conversion of top-level procedures.
//!
//! The target language has no first-class top-level functions, so every
//! procedure other than the entry point gets a companion function-object type:
//!
//!   def saxpy(a, x, y): ...
//!
//! is followed by
//!
//!   struct fn_saxpy {
//!     typedef <result> result_type;
//!     operator()(a, x, y) { return saxpy(a, x, y); }
//!   }
//!
//! and every place a known procedure is passed as a value (`map1(saxpy, xs)`)
//! the bare name becomes a default-constructed instance (`map1(fn_saxpy(), xs)`).
//! Calls through the name (`saxpy(a, x, y)`) are left as they are.
//!
//! The set of known procedures starts with every name in the registry and
//! grows as function objects are synthesized, so a procedure is only
//! instantiated by code that follows its definition.

use crate::ast::*;
use crate::correspond::{correspond, TypeMap};
use crate::error::Result;
use crate::markers::{fnize_id, CALL_OPERATOR, RESULT_TYPE};
use crate::registry::Registry;
use crate::rewrite::{walk_bind, walk_closure, walk_lambda, walk_procedure, Rewriter, StmtRewrite};
use crate::scope::ScopeStack;
use crate::types::{CType, Type};
use crate::{bail_shape, err_shape};
use indexmap::IndexMap;
use log::{debug, trace};
use std::rc::Rc;

/// Type-variable bindings recovered at one polymorphic call site.
#[derive(Debug, Clone, PartialEq)]
pub struct CallCorrespondence {
    pub callee: String,
    pub bindings: TypeMap,
}

/// Output of the functorization pass.
#[derive(Debug, Clone)]
pub struct Functorization {
    pub program: Suite,
    /// One entry per polymorphic call site, in program order.
    pub correspondences: Vec<CallCorrespondence>,
}

/// Functorize a whole program.
pub fn functorize(program: &Suite, entry_point: &str, registry: &Registry) -> Result<Functorization> {
    let mut pass = Functorizer::new(entry_point, registry);
    let program = pass.rewrite_suite(program)?;
    Ok(Functorization {
        program,
        correspondences: pass.correspondences,
    })
}

pub struct Functorizer<'a> {
    entry_point: &'a str,
    /// Known procedure name -> name of its function-object type
    functors: IndexMap<String, String>,
    /// Formal arguments and binds of the enclosing procedures and lambdas
    locals: ScopeStack,
    correspondences: Vec<CallCorrespondence>,
}

impl<'a> Functorizer<'a> {
    pub fn new(entry_point: &'a str, registry: &Registry) -> Self {
        let functors = registry
            .names()
            .map(|name| (name.to_string(), fnize_id(name)))
            .collect();
        Functorizer {
            entry_point,
            functors,
            locals: ScopeStack::new(),
            correspondences: Vec::new(),
        }
    }

    /// Function-object type for `name` if it refers to a known procedure
    /// rather than a local variable.
    fn functor_for(&self, name: &Name) -> Option<&str> {
        if self.locals.is_local(&name.id) {
            return None;
        }
        self.functors.get(&name.id).map(String::as_str)
    }

    /// Default-construct the function object standing for `name`.
    fn instantiate(name: &Name, functor: &str) -> Expr {
        trace!("Instantiating {} as {}()", name.id, functor);
        let ctype = CType::mono(functor);
        let constructor = Name::new(functor).with_ctype(ctype.clone());
        Expr::Apply(Apply::new(constructor, Tuple::empty()).with_type(name.ty.clone()).with_ctype(ctype))
    }

    fn record_correspondence(&mut self, n: &Apply, skeleton_args: &[Type]) -> Result<()> {
        let actual = n.args.element_types();
        let skeleton = Type::Tuple(skeleton_args.to_vec());
        debug!("Making type map for applying {}: {} against {}", n.func.id, actual, skeleton);
        let bindings = correspond(&actual, &skeleton)?;
        self.correspondences.push(CallCorrespondence {
            callee: n.func.id.clone(),
            bindings,
        });
        Ok(())
    }

    fn make_functor(&self, proc: &Procedure) -> Result<Structure> {
        let result_ctype = proc.ctype.fn_result().cloned().ok_or_else(|| {
            err_shape!(
                "Procedure {} has implementation type {}, expected a function type",
                proc.id.id,
                proc.ctype
            )
        })?;
        let result_ty = proc.ty.as_fn().map(|(_, r)| r.clone()).unwrap_or_default();

        let result_alias = Typedefn {
            origin: result_ctype.clone(),
            rename: CType::mono(RESULT_TYPE),
        };

        let forward = Apply::new(proc.id.clone(), proc.args.clone())
            .with_type(result_ty)
            .with_ctype(result_ctype);
        let operator = Procedure {
            id: Name::new(CALL_OPERATOR).with_type(proc.ty.clone()).with_ctype(proc.ctype.clone()),
            args: proc.args.clone(),
            body: Suite::from_stmts([Stmt::Ret(Ret::new(forward))]),
            ty: proc.ty.clone(),
            ctype: proc.ctype.clone(),
            place: proc.place.clone(),
        };

        let functor_id = fnize_id(&proc.id.id);
        debug!("Synthesized function object {} for {}", functor_id, proc.id.id);
        Ok(Structure {
            id: Name::new(functor_id.clone()).with_ctype(CType::mono(functor_id)),
            body: Suite::from_stmts([Stmt::Typedefn(result_alias), Stmt::Procedure(operator)]),
        })
    }
}

impl Rewriter for Functorizer<'_> {
    fn rewrite_apply(&mut self, n: &Apply) -> Result<Apply> {
        if let Type::Polytype { body, .. } = &n.func.ty {
            match body.as_ref() {
                Type::Fn { args, .. } => self.record_correspondence(n, args)?,
                other => bail_shape!(
                    "Callee {} is polymorphic over {}, expected a function type",
                    n.func.id,
                    other
                ),
            }
        }

        let param_count = match &n.func.ty {
            Type::Fn { args, .. } => args.len(),
            // map is arity-polymorphic and is resolved by the backend
            _ if n.func.id == "map" => return Ok(n.clone()),
            other => match other.as_fn() {
                Some((args, _)) => args.len(),
                None => bail_shape!("Callee {} has type {}, expected a function type", n.func.id, other),
            },
        };
        if n.args.arity() != param_count {
            bail_shape!(
                "Call to {} passes {} arguments, its type expects {}",
                n.func.id,
                n.args.arity(),
                param_count
            );
        }

        let mut values = Vec::with_capacity(n.args.arity());
        for arg in &n.args.values {
            let functor = arg.as_name().and_then(|name| self.functor_for(name).map(|f| (name, f.to_string())));
            match functor {
                Some((name, functor)) => values.push(Rc::new(Self::instantiate(name, &functor))),
                None => values.push(self.rewrite_expr(arg)?),
            }
        }

        Ok(Apply {
            func: self.rewrite_name(&n.func)?,
            args: Tuple {
                values,
                ty: n.args.ty.clone(),
                ctype: n.args.ctype.clone(),
            },
            ty: n.ty.clone(),
            ctype: n.ctype.clone(),
        })
    }

    fn rewrite_lambda(&mut self, n: &Lambda) -> Result<Lambda> {
        self.locals.enter_frame(&n.args);
        let walked = walk_lambda(self, n);
        self.locals.exit_frame();
        walked
    }

    fn rewrite_closure(&mut self, n: &Closure) -> Result<Closure> {
        match n.body.as_ref() {
            Expr::Name(_) | Expr::Apply(_) => walk_closure(self, n),
            other => bail_shape!("Closure body must be a name or an apply, found {}", other.kind_name()),
        }
    }

    fn rewrite_bind(&mut self, n: &Bind) -> Result<StmtRewrite> {
        let bind = walk_bind(self, n)?;
        self.locals.bind(&bind.lhs);
        Ok(StmtRewrite::single(bind))
    }

    fn rewrite_procedure(&mut self, n: &Procedure) -> Result<StmtRewrite> {
        self.locals.enter_frame(&n.args);
        let walked = walk_procedure(self, n);
        self.locals.exit_frame();
        let proc = walked?;

        if proc.id.id == self.entry_point {
            return Ok(StmtRewrite::single(proc));
        }

        let functor = self.make_functor(&proc)?;
        self.functors.insert(proc.id.id.clone(), functor.id.id.clone());
        Ok(StmtRewrite::with_auxiliary(proc, vec![Rc::new(Stmt::Structure(functor))]))
    }
}
