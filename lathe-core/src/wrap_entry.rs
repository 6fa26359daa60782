//! Entry-point wrapping.
//!
//! The entry point is the only procedure called from outside the program, and
//! its callers hand over containers that own their storage. Everything else
//! operates on views. This pass demotes the entry procedure to an internal name
//! and adds a wrapper under the original name that derives a view from each
//! container argument and forwards to it:
//!
//!   def entry(xs, a): ...
//!
//! becomes
//!
//!   def _entry(xs, a): ...
//!   def entry(xs: sp_cuarray_var, a) {
//!     view_xs = make_sequence<sequence<float32>>(xs)
//!     return _entry(view_xs, a)
//!   }

use crate::ast::*;
use crate::error::Result;
use crate::lower_types::lower_type;
use crate::markers::{mark_generated_id, view_id, CONTAINER_TYPE, MAKE_SEQUENCE};
use crate::rewrite::{Rewriter, StmtRewrite};
use crate::types::CType;
use crate::{bail_config, bail_shape, err_config, err_shape};
use log::debug;
use std::rc::Rc;

/// Wrap the procedure named `entry_point`. Exactly one such procedure must
/// exist at the top level of `program`.
pub fn wrap_entry(program: &Suite, entry_point: &str) -> Result<Suite> {
    let mut pass = EntryWrapper {
        entry_point,
        wrapped: false,
    };
    let program = pass.rewrite_suite(program)?;
    if !pass.wrapped {
        return Err(err_config!("No procedure named {} to use as the entry point", entry_point));
    }
    Ok(program)
}

struct EntryWrapper<'a> {
    entry_point: &'a str,
    wrapped: bool,
}

impl EntryWrapper<'_> {
    fn wrap(&mut self, entry: &Procedure) -> Result<StmtRewrite> {
        if self.wrapped {
            bail_config!("More than one procedure is named {}", self.entry_point);
        }
        self.wrapped = true;

        let (_, result_ty) = entry.ty.as_fn().ok_or_else(|| {
            err_shape!("Entry point {} has type {}, expected a function type", entry.id.id, entry.ty)
        })?;
        let result_ctype = lower_type(result_ty)?;

        let demoted = Procedure {
            id: Name {
                id: mark_generated_id(&entry.id.id),
                ..entry.id.clone()
            },
            ..entry.clone()
        };

        let mut body = Vec::new();
        let mut params = Vec::with_capacity(entry.args.arity());
        let mut views = Vec::with_capacity(entry.args.arity());
        for arg in entry.args.iter() {
            let Some(param) = arg.as_name() else {
                bail_shape!(
                    "Entry point {} has a {} among its formal arguments",
                    entry.id.id,
                    arg.kind_name()
                );
            };
            if param.ty.sequence_elem().is_none() {
                params.push(param.clone());
                views.push(param.clone());
                continue;
            }

            let view_ctype = lower_type(&param.ty)?;
            let container = param.clone().with_ctype(CType::mono(CONTAINER_TYPE));
            let view = Name::typed(view_id(&param.id), param.ty.clone()).with_ctype(view_ctype.clone());
            let derive = Apply::new(
                Name::new(MAKE_SEQUENCE).with_template_args(vec![view_ctype.clone()]),
                Tuple::of_names([container.clone()]),
            )
            .with_type(param.ty.clone())
            .with_ctype(view_ctype);
            body.push(Stmt::Bind(Bind::new(view.clone(), derive)));
            params.push(container);
            views.push(view);
        }

        let call = Apply::new(demoted.id.clone(), Tuple::of_names(views))
            .with_type(result_ty.clone())
            .with_ctype(result_ctype.clone());
        body.push(Stmt::Ret(Ret::new(call)));

        let wrapper_ctype = CType::func(params.iter().map(|p| p.ctype.clone()).collect(), result_ctype);
        let wrapper = Procedure {
            id: entry.id.clone().with_ctype(wrapper_ctype.clone()),
            args: Tuple::of_names(params),
            body: Suite::from_stmts(body),
            ty: entry.ty.clone(),
            ctype: wrapper_ctype,
            place: entry.place.clone(),
        };
        debug!("Wrapped entry point {} around {}", wrapper.id.id, demoted.id.id);

        Ok(StmtRewrite::with_auxiliary(demoted, vec![Rc::new(Stmt::Procedure(wrapper))]))
    }
}

impl Rewriter for EntryWrapper<'_> {
    // Only top-level statements are inspected; everything else is shared as is.
    fn rewrite_stmt(&mut self, s: &Rc<Stmt>) -> Result<StmtRewrite> {
        match s.as_ref() {
            Stmt::Procedure(p) if p.id.id == self.entry_point => self.wrap(p),
            _ => Ok(StmtRewrite::unchanged(s)),
        }
    }
}
