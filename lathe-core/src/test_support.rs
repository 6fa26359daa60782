//! Tree builders shared by the unit tests.

use crate::ast::*;
use crate::registry::Registry;
use crate::types::*;
use std::rc::Rc;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn name(id: &str, ty: Type) -> Name {
    Name::typed(id, ty)
}

pub fn var(id: &str, ty: Type) -> Rc<Expr> {
    Rc::new(Expr::Name(name(id, ty)))
}

pub fn lit(value: &str, ty: Type) -> Rc<Expr> {
    Rc::new(Expr::Literal(Literal::new(value).with_type(ty)))
}

/// Apply `callee` (whose type is `callee_ty`) to `args`, typed as `result`.
pub fn call(callee: &str, callee_ty: Type, args: Vec<Rc<Expr>>, result: Type) -> Rc<Expr> {
    Rc::new(Expr::Apply(
        Apply::new(name(callee, callee_ty), Tuple::new(args)).with_type(result),
    ))
}

pub fn bind(lhs: &str, ty: Type, rhs: Rc<Expr>) -> Stmt {
    Stmt::Bind(Bind {
        lhs: name(lhs, ty),
        rhs,
    })
}

pub fn ret(val: Rc<Expr>) -> Stmt {
    Stmt::Ret(Ret { val })
}

pub fn procedure(id: &str, params: Vec<(&str, Type)>, result: Type, body: Vec<Stmt>) -> Stmt {
    let ty = func(params.iter().map(|(_, t)| t.clone()).collect(), result);
    let args = Tuple::of_names(params.into_iter().map(|(p, t)| name(p, t)));
    Stmt::Procedure(Procedure::new(id, args, Suite::from_stmts(body), ty))
}

pub fn program(stmts: Vec<Stmt>) -> Suite {
    Suite::from_stmts(stmts)
}

pub fn f32_unary() -> Type {
    func(vec![float32()], float32())
}

pub fn f32_binary() -> Type {
    func(vec![float32(), float32()], float32())
}

/// forall a b. ((a) -> b, [a]) -> [b]
pub fn map1_type() -> Type {
    let a = Type::mono("a");
    let b = Type::mono("b");
    forall(&["a", "b"], func(vec![func(vec![a.clone()], b.clone()), seq(a)], seq(b)))
}

/// forall a b c. ((a, b) -> c, [a], [b]) -> [c]
pub fn map2_type() -> Type {
    let a = Type::mono("a");
    let b = Type::mono("b");
    let c = Type::mono("c");
    forall(
        &["a", "b", "c"],
        func(vec![func(vec![a.clone(), b.clone()], c.clone()), seq(a), seq(b)], seq(c)),
    )
}

/// forall a. ((a, a) -> a, [a], a) -> a
pub fn reduce_type() -> Type {
    let a = Type::mono("a");
    forall(
        &["a"],
        func(vec![func(vec![a.clone(), a.clone()], a.clone()), seq(a.clone()), a.clone()], a),
    )
}

/// forall a. ([a]) -> [Int32]
pub fn indices_type() -> Type {
    forall(&["a"], func(vec![seq(Type::mono("a"))], seq(int32())))
}

pub fn library() -> Registry {
    vec![
        ("op_add", f32_binary()),
        ("op_mul", f32_binary()),
        ("map1", map1_type()),
        ("map2", map2_type()),
        ("reduce", reduce_type()),
        ("indices", indices_type()),
    ]
    .into_iter()
    .collect()
}

/// A small saxpy-like program:
///
///   def square(x) = op_mul(x, x)
///   def axpy(x, y) = op_add(square(x), y)
///   def entry(xs, ys):
///     sq = map1(square, xs)
///     zs = map2(axpy, sq, ys)
///     total = reduce(op_add, zs, 0.0)
///     return zs
pub fn sample_program() -> Suite {
    let x = || var("x", float32());
    let y = || var("y", float32());
    let fseq = || seq(float32());

    program(vec![
        procedure(
            "square",
            vec![("x", float32())],
            float32(),
            vec![ret(call("op_mul", f32_binary(), vec![x(), x()], float32()))],
        ),
        procedure(
            "axpy",
            vec![("x", float32()), ("y", float32())],
            float32(),
            vec![ret(call(
                "op_add",
                f32_binary(),
                vec![call("square", f32_unary(), vec![x()], float32()), y()],
                float32(),
            ))],
        ),
        procedure(
            "entry",
            vec![("xs", fseq()), ("ys", fseq())],
            fseq(),
            vec![
                bind(
                    "sq",
                    fseq(),
                    call("map1", map1_type(), vec![var("square", f32_unary()), var("xs", fseq())], fseq()),
                ),
                bind(
                    "zs",
                    fseq(),
                    call(
                        "map2",
                        map2_type(),
                        vec![var("axpy", f32_binary()), var("sq", fseq()), var("ys", fseq())],
                        fseq(),
                    ),
                ),
                bind(
                    "total",
                    float32(),
                    call(
                        "reduce",
                        reduce_type(),
                        vec![var("op_add", f32_binary()), var("zs", fseq()), lit("0.0", float32())],
                        float32(),
                    ),
                ),
                ret(var("zs", fseq())),
            ],
        ),
    ])
}

/// Body statements of the top-level procedure named `id`.
pub fn body_of<'a>(program: &'a Suite, id: &str) -> &'a Suite {
    &program
        .procedures()
        .find(|p| p.id.id == id)
        .unwrap_or_else(|| panic!("no procedure {}", id))
        .body
}

/// Right-hand side of the bind to `lhs` inside `suite`.
pub fn rhs_of<'a>(suite: &'a Suite, lhs: &str) -> &'a Expr {
    suite
        .iter()
        .filter_map(|s| s.as_bind())
        .find(|b| b.lhs.id == lhs)
        .map(|b| b.rhs.as_ref())
        .unwrap_or_else(|| panic!("no bind to {}", lhs))
}

pub fn bind_of<'a>(suite: &'a Suite, lhs: &str) -> &'a Bind {
    suite
        .iter()
        .filter_map(|s| s.as_bind())
        .find(|b| b.lhs.id == lhs)
        .unwrap_or_else(|| panic!("no bind to {}", lhs))
}
