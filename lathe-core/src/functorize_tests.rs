use crate::ast::*;
use crate::error::CompilerError;
use crate::functorize::{functorize, Functorization};
use crate::lower_types::lower_types;
use crate::registry::Registry;
use crate::test_support::*;
use crate::types::*;
use std::rc::Rc;

fn run(program: &Suite) -> Functorization {
    init_logging();
    let lowered = lower_types(program).unwrap();
    functorize(&lowered, "entry", &library()).unwrap()
}

fn run_err(program: &Suite) -> CompilerError {
    let lowered = lower_types(program).unwrap();
    functorize(&lowered, "entry", &library()).unwrap_err()
}

fn labels(program: &Suite) -> Vec<String> {
    program
        .iter()
        .map(|s| match s.as_ref() {
            Stmt::Procedure(p) => format!("proc {}", p.id.id),
            Stmt::Structure(s) => format!("struct {}", s.id.id),
            other => format!("{:?}", other),
        })
        .collect()
}

/// Name of the function object a functor instance constructs.
fn instance_of(e: &Expr) -> Option<&str> {
    match e {
        Expr::Apply(a) if a.args.values.is_empty() => Some(&a.func.id),
        _ => None,
    }
}

#[test]
fn test_one_function_object_per_procedure_except_entry() {
    let out = run(&sample_program());
    assert_eq!(
        labels(&out.program),
        vec![
            "proc square",
            "struct fn_square",
            "proc axpy",
            "struct fn_axpy",
            "proc entry",
        ]
    );
    assert_eq!(out.program.procedures().filter(|p| p.id.id == "entry").count(), 1);
}

#[test]
fn test_function_object_layout() {
    let out = run(&sample_program());
    let functor = out.program.stmts[1].as_structure().unwrap();
    assert_eq!(functor.id.id, "fn_square");
    assert_eq!(functor.id.ctype, CType::mono("fn_square"));
    assert_eq!(functor.body.len(), 2);

    let Stmt::Typedefn(alias) = functor.body.stmts[0].as_ref() else {
        panic!("expected the result typedef first");
    };
    assert_eq!(alias.origin, CType::mono("float32"));
    assert_eq!(alias.rename, CType::mono("result_type"));

    let operator = functor.body.stmts[1].as_procedure().unwrap();
    assert_eq!(operator.id.id, "operator()");
    assert_eq!(operator.ty, func(vec![float32()], float32()));
    assert_eq!(operator.ctype, CType::func(vec![CType::mono("float32")], CType::mono("float32")));
    assert_eq!(operator.args.arity(), 1);

    let Stmt::Ret(r) = operator.body.stmts[0].as_ref() else {
        panic!("expected the operator to return");
    };
    let forward = r.val.as_apply().unwrap();
    assert_eq!(forward.func.id, "square");
    assert_eq!(forward.args, operator.args);
    assert_eq!(forward.ctype, CType::mono("float32"));
}

#[test]
fn test_procedures_passed_as_values_become_instances() {
    let out = run(&sample_program());
    let entry = body_of(&out.program, "entry");

    let sq = rhs_of(entry, "sq").as_apply().unwrap();
    assert_eq!(sq.func.id, "map1");
    assert_eq!(instance_of(&sq.args.values[0]), Some("fn_square"));
    assert_eq!(sq.args.values[0].ctype(), &CType::mono("fn_square"));
    assert_eq!(sq.args.values[0].ty(), &f32_unary());
    assert_eq!(sq.args.values[1].as_name().unwrap().id, "xs");

    let zs = rhs_of(entry, "zs").as_apply().unwrap();
    assert_eq!(instance_of(&zs.args.values[0]), Some("fn_axpy"));

    // Library procedures are known from the start
    let total = rhs_of(entry, "total").as_apply().unwrap();
    assert_eq!(instance_of(&total.args.values[0]), Some("fn_op_add"));
}

#[test]
fn test_call_targets_are_not_instantiated() {
    let out = run(&sample_program());
    let axpy = body_of(&out.program, "axpy");
    let Stmt::Ret(r) = axpy.stmts[0].as_ref() else {
        panic!("expected a return");
    };
    let outer = r.val.as_apply().unwrap();
    assert_eq!(outer.func.id, "op_add");

    let inner = outer.args.values[0].as_apply().unwrap();
    assert_eq!(inner.func.id, "square");
    assert_eq!(inner.args.values[0].as_name().unwrap().id, "x");
}

#[test]
fn test_correspondences_recorded_for_polymorphic_calls() {
    let out = run(&sample_program());
    let callees: Vec<&str> = out.correspondences.iter().map(|c| c.callee.as_str()).collect();
    assert_eq!(callees, vec!["map1", "map2", "reduce"]);

    let map1 = &out.correspondences[0].bindings;
    assert_eq!(map1.len(), 2);
    assert_eq!(map1["a"], float32());
    assert_eq!(map1["b"], float32());

    let reduce = &out.correspondences[2].bindings;
    assert_eq!(reduce.len(), 1);
    assert_eq!(reduce["a"], float32());
}

#[test]
fn test_local_shadowing_a_procedure_is_left_alone() {
    let fseq = || seq(float32());
    let program = program(vec![
        procedure("square", vec![("x", float32())], float32(), vec![ret(var("x", float32()))]),
        procedure(
            "entry",
            vec![("square", f32_unary()), ("xs", fseq())],
            fseq(),
            vec![
                bind(
                    "ys",
                    fseq(),
                    call("map1", map1_type(), vec![var("square", f32_unary()), var("xs", fseq())], fseq()),
                ),
                ret(var("ys", fseq())),
            ],
        ),
    ]);

    let out = run(&program);
    let ys = rhs_of(body_of(&out.program, "entry"), "ys").as_apply().unwrap();
    assert_eq!(ys.args.values[0].as_name().unwrap().id, "square");
}

#[test]
fn test_lambda_parameter_shadowing_a_procedure_is_left_alone() {
    let fseq = || seq(float32());
    let mapped = || call("map1", map1_type(), vec![var("square", f32_unary()), var("xs", fseq())], fseq());
    let lambda = Lambda::new(Tuple::of_names([name("square", f32_unary())]), mapped());
    let program = program(vec![
        procedure("square", vec![("x", float32())], float32(), vec![ret(var("x", float32()))]),
        procedure(
            "entry",
            vec![("xs", fseq())],
            fseq(),
            vec![
                bind("k", func(vec![f32_unary()], fseq()), Rc::new(Expr::Lambda(lambda))),
                bind("ys", fseq(), mapped()),
                ret(var("ys", fseq())),
            ],
        ),
    ]);

    let out = run(&program);
    let entry = body_of(&out.program, "entry");

    let Expr::Lambda(k) = rhs_of(entry, "k") else {
        panic!("expected a lambda");
    };
    let inner = k.body.as_apply().unwrap();
    assert_eq!(inner.args.values[0].as_name().unwrap().id, "square");

    // The lambda's frame is closed again after its body
    let ys = rhs_of(entry, "ys").as_apply().unwrap();
    assert_eq!(instance_of(&ys.args.values[0]), Some("fn_square"));
}

#[test]
fn test_reference_before_definition_is_not_instantiated() {
    let fseq = || seq(float32());
    let program = program(vec![
        procedure(
            "entry",
            vec![("xs", fseq())],
            fseq(),
            vec![ret(call(
                "map1",
                map1_type(),
                vec![var("later", f32_unary()), var("xs", fseq())],
                fseq(),
            ))],
        ),
        procedure("later", vec![("x", float32())], float32(), vec![ret(var("x", float32()))]),
    ]);

    let out = run(&program);
    let Stmt::Ret(r) = body_of(&out.program, "entry").stmts[0].as_ref() else {
        panic!("expected a return");
    };
    let map = r.val.as_apply().unwrap();
    assert_eq!(map.args.values[0].as_name().unwrap().id, "later");
    assert_eq!(labels(&out.program), vec!["proc entry", "proc later", "struct fn_later"]);
}

#[test]
fn test_arity_polymorphic_map_passes_through() {
    let fseq = || seq(float32());
    let program = program(vec![
        procedure("square", vec![("x", float32())], float32(), vec![ret(var("x", float32()))]),
        procedure(
            "entry",
            vec![("xs", fseq())],
            fseq(),
            vec![ret(call(
                "map",
                Type::void(),
                vec![var("square", f32_unary()), var("xs", fseq())],
                fseq(),
            ))],
        ),
    ]);

    let out = run(&program);
    let Stmt::Ret(r) = body_of(&out.program, "entry").stmts[0].as_ref() else {
        panic!("expected a return");
    };
    let map = r.val.as_apply().unwrap();
    assert_eq!(map.func.id, "map");
    assert_eq!(map.args.values[0].as_name().unwrap().id, "square");
    assert!(out.correspondences.is_empty());
}

#[test]
fn test_arity_mismatch_is_a_shape_error() {
    let program = program(vec![
        procedure("square", vec![("x", float32())], float32(), vec![ret(var("x", float32()))]),
        procedure(
            "entry",
            vec![("x", float32())],
            float32(),
            vec![ret(call(
                "square",
                f32_unary(),
                vec![var("x", float32()), var("x", float32())],
                float32(),
            ))],
        ),
    ]);
    assert!(matches!(run_err(&program), CompilerError::Shape(_)));
}

#[test]
fn test_non_function_callee_is_a_shape_error() {
    let program = program(vec![procedure(
        "entry",
        vec![("x", float32())],
        float32(),
        vec![ret(call("x", float32(), vec![], float32()))],
    )]);
    assert!(matches!(run_err(&program), CompilerError::Shape(_)));

    let polymorphic_value = Suite::from_stmts([procedure(
        "entry",
        vec![("x", float32())],
        float32(),
        vec![ret(call("id", forall(&["a"], Type::mono("a")), vec![], float32()))],
    )]);
    assert!(matches!(run_err(&polymorphic_value), CompilerError::Shape(_)));
}

#[test]
fn test_closure_body_must_be_name_or_apply() {
    let closure = Closure::new(Tuple::new(vec![var("y", float32())]), lit("1.0", float32()));
    let program = program(vec![procedure(
        "entry",
        vec![("y", float32())],
        f32_unary(),
        vec![ret(Rc::new(Expr::Closure(closure)))],
    )]);
    assert!(matches!(run_err(&program), CompilerError::Shape(_)));
}

#[test]
fn test_closure_over_named_procedure_is_accepted() {
    let closure = Closure::new(Tuple::new(vec![var("y", float32())]), var("op_add", f32_binary()));
    let program = program(vec![procedure(
        "entry",
        vec![("y", float32())],
        f32_unary(),
        vec![ret(Rc::new(Expr::Closure(closure)))],
    )]);
    let out = run(&program);
    assert_eq!(labels(&out.program), vec!["proc entry"]);
}

#[test]
fn test_empty_registry_and_single_entry() {
    let program = program(vec![procedure(
        "entry",
        vec![("x", int32())],
        int32(),
        vec![ret(var("x", int32()))],
    )]);
    let lowered = lower_types(&program).unwrap();
    let out = functorize(&lowered, "entry", &Registry::new()).unwrap();
    assert_eq!(out.program, lowered);
}
