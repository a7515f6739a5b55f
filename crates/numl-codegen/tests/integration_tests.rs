//! End-to-end tests through the public `compile` entry point, covering one
//! full program per backend rather than individual emitter fragments.

use numl_codegen::{compile, BackendKind, CompileOptions};
use numl_core::ast::{Expr, FunctionDef, Literal, Param, Program, Stmt, Target};
use numl_core::ops::{BinOp, CmpOp};

fn saxpy_program() -> Program {
    // def saxpy(a: FLOAT, x, y, out, n, tid):
    //     if tid < n:
    //         out[tid] = a * x[tid] + y[tid]
    Program {
        functions: vec![FunctionDef {
            name: "saxpy".into(),
            params: vec![
                Param::annotated("a", numl_core::types::NumType::Float),
                Param::new("x"),
                Param::new("y"),
                Param::new("out"),
                Param::new("n"),
                Param::new("tid"),
            ],
            body: vec![Stmt::If {
                test: Expr::Compare { operands: vec![Expr::Name("tid".into()), Expr::Name("n".into())], ops: vec![CmpOp::Lt] },
                body: vec![Stmt::Assign {
                    targets: vec![Target::Subscript { container: Box::new(Expr::Name("out".into())), index: Box::new(Expr::Name("tid".into())) }],
                    value: Expr::BinOp {
                        op: BinOp::Add,
                        left: Box::new(Expr::BinOp {
                            op: BinOp::Mul,
                            left: Box::new(Expr::Name("a".into())),
                            right: Box::new(Expr::Subscript { container: Box::new(Expr::Name("x".into())), index: Box::new(Expr::Name("tid".into())) }),
                        }),
                        right: Box::new(Expr::Subscript { container: Box::new(Expr::Name("y".into())), index: Box::new(Expr::Name("tid".into())) }),
                    },
                }],
                orelse: vec![],
            }],
        }],
        top_level: vec![],
    }
}

#[test]
fn saxpy_kernel_compiles_to_a_correctly_shaped_metal_signature() {
    let program = saxpy_program();
    let options = CompileOptions { backend: BackendKind::Gpu, entry_function: None };
    let src = compile(&program, &options).expect("saxpy has no print calls, should not be rejected");

    assert!(src.contains("#include <metal_stdlib>"));
    assert!(src.contains("kernel void saxpy("));
    assert!(src.contains("constant float& a [[buffer(0)]]"));
    assert!(src.contains("device float* x [[buffer(1)]]"));
    assert!(src.contains("device float* y [[buffer(2)]]"));
    assert!(src.contains("device float* out [[buffer(3)]]"));
    assert!(src.contains("constant uint& n [[buffer(4)]]"));
    assert!(src.contains("uint tid [[thread_position_in_grid]]"));
    assert!(src.contains("if ((tid < n)) {"));
}

#[test]
fn a_kernel_that_prints_is_rejected_not_silently_degraded() {
    let program = Program {
        functions: vec![FunctionDef {
            name: "debug_kernel".into(),
            params: vec![Param::new("tid")],
            body: vec![Stmt::Expr(Expr::Call { callee: "print".into(), args: vec![Expr::Name("tid".into())] })],
        }],
        top_level: vec![],
    };
    let options = CompileOptions { backend: BackendKind::Gpu, entry_function: None };
    let err = compile(&program, &options).unwrap_err();
    assert!(err.to_string().contains("print"));
}

#[test]
fn fibonacci_sequence_compiles_to_c_with_printf_and_no_math_header() {
    // a = 0; b = 1
    // while a < 100:
    //     print(a)
    //     a, b = b, a + b   (modeled here as two sequential assigns through a temp)
    let program = Program {
        functions: vec![],
        top_level: vec![
            Stmt::Assign { targets: vec![Target::Name("a".into())], value: Expr::Literal(Literal::Int(0)) },
            Stmt::Assign { targets: vec![Target::Name("b".into())], value: Expr::Literal(Literal::Int(1)) },
            Stmt::While {
                test: Expr::Compare { operands: vec![Expr::Name("a".into()), Expr::Literal(Literal::Int(100))], ops: vec![CmpOp::Lt] },
                body: vec![
                    Stmt::Expr(Expr::Call { callee: "print".into(), args: vec![Expr::Name("a".into())] }),
                    Stmt::Assign { targets: vec![Target::Name("temp".into())], value: Expr::Name("b".into()) },
                    Stmt::Assign {
                        targets: vec![Target::Name("b".into())],
                        value: Expr::BinOp { op: BinOp::Add, left: Box::new(Expr::Name("a".into())), right: Box::new(Expr::Name("b".into())) },
                    },
                    Stmt::Assign { targets: vec![Target::Name("a".into())], value: Expr::Name("temp".into()) },
                ],
            },
        ],
    };

    let src = compile(&program, &CompileOptions::default()).unwrap();
    assert!(src.contains("#include <stdio.h>"));
    assert!(!src.contains("math.h"));
    assert!(src.contains("while ((a < 100)) {"));
    assert!(src.contains("printf(\"%lld\\n\", a)"));
}

#[test]
fn a_function_using_pow_pulls_in_the_math_header_and_casts_the_integer_result() {
    let program = Program {
        functions: vec![FunctionDef {
            name: "square".into(),
            params: vec![Param::new("n")],
            body: vec![Stmt::Return(Some(Expr::BinOp {
                op: BinOp::Pow,
                left: Box::new(Expr::Name("n".into())),
                right: Box::new(Expr::Literal(Literal::Int(2))),
            }))],
        }],
        top_level: vec![Stmt::Expr(Expr::Call { callee: "square".into(), args: vec![Expr::Literal(Literal::Int(9))] })],
    };

    let src = compile(&program, &CompileOptions::default()).unwrap();
    assert!(src.contains("#include <math.h>"));
    assert!(src.contains("(long long)pow((double)n, (double)2)"));
}

#[test]
fn entry_function_override_is_honored_for_the_c_like_backend() {
    let program = Program { functions: vec![], top_level: vec![] };
    let options = CompileOptions { backend: BackendKind::CLike, entry_function: Some("kernel_main".into()) };
    let src = compile(&program, &options).unwrap();
    assert!(src.contains("int kernel_main() {"));
    assert!(!src.contains("int main()"));
}
