//! Tree rewriting framework shared by every pass.
//!
//! A pass implements [`Rewriter`] and overrides only the hooks for the node
//! kinds it changes. Every hook defaults to a `walk_*` function that rebuilds
//! the same node with its children rewritten by the same pass, so a rewriter
//! with no overrides is a structural copy.
//!
//! Statement hooks return a [`StmtRewrite`]: the replacement statement plus
//! auxiliary statements (generated declarations and the like) that
//! [`walk_suite`] splices immediately after it, in encounter order.

use crate::ast::*;
use crate::error::Result;
use std::rc::Rc;

/// Result of rewriting one statement.
#[derive(Debug, Clone, PartialEq)]
pub struct StmtRewrite {
    pub primary: Rc<Stmt>,
    pub auxiliary: Vec<Rc<Stmt>>,
}

impl StmtRewrite {
    pub fn single(stmt: impl Into<Stmt>) -> Self {
        StmtRewrite {
            primary: Rc::new(stmt.into()),
            auxiliary: Vec::new(),
        }
    }

    /// Keep an existing statement as is.
    pub fn unchanged(stmt: &Rc<Stmt>) -> Self {
        StmtRewrite {
            primary: Rc::clone(stmt),
            auxiliary: Vec::new(),
        }
    }

    pub fn with_auxiliary(stmt: impl Into<Stmt>, auxiliary: Vec<Rc<Stmt>>) -> Self {
        StmtRewrite {
            primary: Rc::new(stmt.into()),
            auxiliary,
        }
    }
}

impl From<Stmt> for StmtRewrite {
    fn from(stmt: Stmt) -> Self {
        StmtRewrite::single(stmt)
    }
}

/// Rewriter trait for transforming the tree.
///
/// All methods have default implementations that delegate to `walk_*`
/// functions. Implementors override specific hooks to customize behavior.
pub trait Rewriter: Sized {
    // --- Expressions ---

    fn rewrite_expr(&mut self, e: &Rc<Expr>) -> Result<Rc<Expr>> {
        walk_expr(self, e)
    }

    fn rewrite_literal(&mut self, n: &Literal) -> Result<Literal> {
        Ok(n.clone())
    }

    fn rewrite_name(&mut self, n: &Name) -> Result<Name> {
        Ok(n.clone())
    }

    fn rewrite_tuple(&mut self, n: &Tuple) -> Result<Tuple> {
        walk_tuple(self, n)
    }

    fn rewrite_apply(&mut self, n: &Apply) -> Result<Apply> {
        walk_apply(self, n)
    }

    fn rewrite_lambda(&mut self, n: &Lambda) -> Result<Lambda> {
        walk_lambda(self, n)
    }

    fn rewrite_closure(&mut self, n: &Closure) -> Result<Closure> {
        walk_closure(self, n)
    }

    // --- Statements ---

    fn rewrite_suite(&mut self, n: &Suite) -> Result<Suite> {
        walk_suite(self, n)
    }

    fn rewrite_stmt(&mut self, s: &Rc<Stmt>) -> Result<StmtRewrite> {
        walk_stmt(self, s)
    }

    fn rewrite_procedure(&mut self, n: &Procedure) -> Result<StmtRewrite> {
        Ok(StmtRewrite::single(walk_procedure(self, n)?))
    }

    fn rewrite_structure(&mut self, n: &Structure) -> Result<StmtRewrite> {
        Ok(StmtRewrite::single(walk_structure(self, n)?))
    }

    fn rewrite_bind(&mut self, n: &Bind) -> Result<StmtRewrite> {
        Ok(StmtRewrite::single(walk_bind(self, n)?))
    }

    fn rewrite_ret(&mut self, n: &Ret) -> Result<StmtRewrite> {
        Ok(StmtRewrite::single(walk_ret(self, n)?))
    }

    fn rewrite_conditional(&mut self, n: &Conditional) -> Result<StmtRewrite> {
        Ok(StmtRewrite::single(walk_conditional(self, n)?))
    }

    fn rewrite_typedefn(&mut self, n: &Typedefn) -> Result<StmtRewrite> {
        Ok(StmtRewrite::single(n.clone()))
    }

    fn rewrite_namespace(&mut self, n: &Namespace) -> Result<StmtRewrite> {
        Ok(StmtRewrite::single(walk_namespace(self, n)?))
    }

    fn rewrite_include(&mut self, n: &Include) -> Result<StmtRewrite> {
        Ok(StmtRewrite::single(n.clone()))
    }
}

/// Rewriter with no overrides: a structural copy of whatever it is given.
#[derive(Debug, Default)]
pub struct Copier;

impl Rewriter for Copier {}

// =============================================================================
// Walk functions
// =============================================================================

pub fn walk_expr<V: Rewriter>(v: &mut V, e: &Rc<Expr>) -> Result<Rc<Expr>> {
    let rewritten = match e.as_ref() {
        Expr::Literal(n) => Expr::Literal(v.rewrite_literal(n)?),
        Expr::Name(n) => Expr::Name(v.rewrite_name(n)?),
        Expr::Tuple(n) => Expr::Tuple(v.rewrite_tuple(n)?),
        Expr::Apply(n) => Expr::Apply(v.rewrite_apply(n)?),
        Expr::Lambda(n) => Expr::Lambda(v.rewrite_lambda(n)?),
        Expr::Closure(n) => Expr::Closure(v.rewrite_closure(n)?),
    };
    Ok(Rc::new(rewritten))
}

pub fn walk_tuple<V: Rewriter>(v: &mut V, n: &Tuple) -> Result<Tuple> {
    let values = n.values.iter().map(|e| v.rewrite_expr(e)).collect::<Result<Vec<_>>>()?;
    Ok(Tuple {
        values,
        ty: n.ty.clone(),
        ctype: n.ctype.clone(),
    })
}

pub fn walk_apply<V: Rewriter>(v: &mut V, n: &Apply) -> Result<Apply> {
    let func = v.rewrite_name(&n.func)?;
    let args = v.rewrite_tuple(&n.args)?;
    Ok(Apply {
        func,
        args,
        ty: n.ty.clone(),
        ctype: n.ctype.clone(),
    })
}

pub fn walk_lambda<V: Rewriter>(v: &mut V, n: &Lambda) -> Result<Lambda> {
    let args = v.rewrite_tuple(&n.args)?;
    let body = v.rewrite_expr(&n.body)?;
    Ok(Lambda {
        args,
        body,
        ty: n.ty.clone(),
        ctype: n.ctype.clone(),
    })
}

pub fn walk_closure<V: Rewriter>(v: &mut V, n: &Closure) -> Result<Closure> {
    let args = v.rewrite_tuple(&n.args)?;
    let body = v.rewrite_expr(&n.body)?;
    Ok(Closure {
        args,
        body,
        ty: n.ty.clone(),
        ctype: n.ctype.clone(),
    })
}

pub fn walk_suite<V: Rewriter>(v: &mut V, n: &Suite) -> Result<Suite> {
    let mut stmts = Vec::with_capacity(n.stmts.len());
    for stmt in &n.stmts {
        let StmtRewrite { primary, auxiliary } = v.rewrite_stmt(stmt)?;
        stmts.push(primary);
        stmts.extend(auxiliary);
    }
    Ok(Suite { stmts })
}

pub fn walk_stmt<V: Rewriter>(v: &mut V, s: &Rc<Stmt>) -> Result<StmtRewrite> {
    match s.as_ref() {
        Stmt::Procedure(n) => v.rewrite_procedure(n),
        Stmt::Structure(n) => v.rewrite_structure(n),
        Stmt::Bind(n) => v.rewrite_bind(n),
        Stmt::Ret(n) => v.rewrite_ret(n),
        Stmt::Conditional(n) => v.rewrite_conditional(n),
        Stmt::Typedefn(n) => v.rewrite_typedefn(n),
        Stmt::Namespace(n) => v.rewrite_namespace(n),
        Stmt::Include(n) => v.rewrite_include(n),
    }
}

pub fn walk_procedure<V: Rewriter>(v: &mut V, n: &Procedure) -> Result<Procedure> {
    let id = v.rewrite_name(&n.id)?;
    let args = v.rewrite_tuple(&n.args)?;
    let body = v.rewrite_suite(&n.body)?;
    Ok(Procedure {
        id,
        args,
        body,
        ty: n.ty.clone(),
        ctype: n.ctype.clone(),
        place: n.place.clone(),
    })
}

pub fn walk_structure<V: Rewriter>(v: &mut V, n: &Structure) -> Result<Structure> {
    let id = v.rewrite_name(&n.id)?;
    let body = v.rewrite_suite(&n.body)?;
    Ok(Structure { id, body })
}

pub fn walk_bind<V: Rewriter>(v: &mut V, n: &Bind) -> Result<Bind> {
    let lhs = v.rewrite_name(&n.lhs)?;
    let rhs = v.rewrite_expr(&n.rhs)?;
    Ok(Bind { lhs, rhs })
}

pub fn walk_ret<V: Rewriter>(v: &mut V, n: &Ret) -> Result<Ret> {
    let val = v.rewrite_expr(&n.val)?;
    Ok(Ret { val })
}

pub fn walk_conditional<V: Rewriter>(v: &mut V, n: &Conditional) -> Result<Conditional> {
    let cond = v.rewrite_expr(&n.cond)?;
    let then_branch = v.rewrite_suite(&n.then_branch)?;
    let else_branch = v.rewrite_suite(&n.else_branch)?;
    Ok(Conditional {
        cond,
        then_branch,
        else_branch,
    })
}

pub fn walk_namespace<V: Rewriter>(v: &mut V, n: &Namespace) -> Result<Namespace> {
    let body = v.rewrite_suite(&n.body)?;
    Ok(Namespace {
        name: n.name.clone(),
        body,
    })
}
