//! Bottom-up expression/statement inference plus call-site refinement.
//!
//! Mirrors the teacher's `typecheck` module shape (pure functions operating
//! on an owned table, grouped by concern) but the lattice here has only two
//! points, so there is no coercion table and no diagnostics type: every
//! lookup is total.

use numl_core::ast::{Expr, Literal, Param, Program, Stmt, Target};
use numl_core::ops::BinOp;
use numl_core::symtab::SymbolTables;
use numl_core::types::NumType;
use indexmap::IndexMap;

/// Infers the type of a single expression against the tables built so far.
///
/// This is also reused at emission time (pow/floor-division lowering and
/// `print` specifier selection need to know an operand's type without
/// re-running the whole pass) -- it is a pure function of the tables and
/// the expression, so recomputing it is cheap and always consistent with
/// whatever the tables currently hold.
pub fn infer_expr_type(tables: &SymbolTables, scope: Option<&str>, expr: &Expr) -> NumType {
    match expr {
        Expr::Literal(Literal::Int(_)) => NumType::Int,
        Expr::Literal(Literal::Float(_)) => NumType::Float,
        Expr::Literal(Literal::Bool(_)) => NumType::Int,
        // Strings never participate in the numeric lattice; the only
        // construct that accepts one (`print`) inspects the literal kind
        // directly rather than going through this function.
        Expr::Literal(Literal::Str(_)) => NumType::Int,
        Expr::Name(name) => tables.lookup(scope, name),
        Expr::BinOp { op, left, right } => match op {
            BinOp::TrueDiv => NumType::Float,
            BinOp::FloorDiv => NumType::Int,
            _ => {
                let l = infer_expr_type(tables, scope, left);
                let r = infer_expr_type(tables, scope, right);
                l.join(r)
            }
        },
        Expr::UnaryOp { operand, .. } => infer_expr_type(tables, scope, operand),
        Expr::Compare { .. } => NumType::Int,
        Expr::BoolOp { .. } => NumType::Int,
        Expr::IfExp { body, orelse, .. } => {
            let b = infer_expr_type(tables, scope, body);
            let o = infer_expr_type(tables, scope, orelse);
            b.join(o)
        }
        Expr::Call { callee, .. } => {
            if tables.is_known_function(callee) {
                tables.return_type(callee)
            } else {
                NumType::Int
            }
        }
        Expr::Subscript { container, .. } => infer_expr_type(tables, scope, container),
    }
}

/// Runs the full two-phase pass over `program` and returns the populated
/// tables. Phase 1 seeds types in source order; phase 2 refines parameter
/// types from call sites. Both phases are total.
pub fn run(program: &Program) -> SymbolTables {
    let mut tables = SymbolTables::new();
    predeclare_functions(&mut tables, program);
    infer_program(&mut tables, program);
    refine_call_sites(&mut tables, program);
    tables
}

/// Registers every function's parameter table (annotation-seeded or `INT`)
/// and a default `INT` return type before any body is walked, so that a
/// call to a function defined later in the module still resolves as
/// "known" during phase 1.
fn predeclare_functions(tables: &mut SymbolTables, program: &Program) {
    for func in &program.functions {
        let params = seed_params(&func.params);
        tables.declare_function(&func.name, params);
        tables.set_return_type(&func.name, NumType::Int);
    }
}

fn seed_params(params: &[Param]) -> IndexMap<String, NumType> {
    params
        .iter()
        .map(|p| (p.name.clone(), p.annotation.unwrap_or(NumType::Int)))
        .collect()
}

/// Phase 1: bottom-up expression/statement inference, in source order.
fn infer_program(tables: &mut SymbolTables, program: &Program) {
    infer_stmts(tables, None, &program.top_level);
    for func in &program.functions {
        infer_stmts(tables, Some(func.name.as_str()), &func.body);
        let ret = NumType::Int.join(collect_return_type(tables, Some(func.name.as_str()), &func.body));
        tables.set_return_type(&func.name, ret);
    }
}

fn infer_stmts(tables: &mut SymbolTables, scope: Option<&str>, stmts: &[Stmt]) {
    for stmt in stmts {
        infer_stmt(tables, scope, stmt);
    }
}

fn infer_stmt(tables: &mut SymbolTables, scope: Option<&str>, stmt: &Stmt) {
    match stmt {
        Stmt::Assign { targets, value } => {
            let ty = infer_expr_type(tables, scope, value);
            for target in targets {
                match target {
                    Target::Name(name) => tables.set(scope, name, ty),
                    // A subscript target declares no new name, but a write
                    // through a plain-name container still widens that
                    // container's own element type in the lattice (§9:
                    // subscripting returns the container's own type, so a
                    // FLOAT store through it makes the container FLOAT).
                    Target::Subscript { container, .. } => {
                        if let Expr::Name(name) = container.as_ref() {
                            let current = tables.lookup(scope, name);
                            tables.set(scope, name, current.join(ty));
                        }
                    }
                }
            }
        }
        Stmt::AugAssign { target, value, .. } => {
            if let Target::Name(name) = target {
                let current = tables.lookup(scope, name);
                let rhs = infer_expr_type(tables, scope, value);
                tables.set(scope, name, current.join(rhs));
            }
        }
        Stmt::Expr(_) | Stmt::Pass | Stmt::Break | Stmt::Continue | Stmt::Return(None) => {}
        Stmt::Return(Some(expr)) => {
            // The expression's type is not stored here -- `collect_return_type`
            // re-walks return expressions once the whole body has been
            // inferred, after any reassignment elsewhere in the body has
            // already settled each name's type.
            let _ = infer_expr_type(tables, scope, expr);
        }
        Stmt::If { body, orelse, .. } => {
            infer_stmts(tables, scope, body);
            infer_stmts(tables, scope, orelse);
        }
        Stmt::While { body, .. } => {
            infer_stmts(tables, scope, body);
        }
        Stmt::For { var, body, .. } => {
            // The loop variable of a `for ... in range(...)` is always INT
            // (see the data model's for/while/conditional recursion rule);
            // an implementation MAY additionally join the range arguments'
            // types in, but this one deliberately does not (see DESIGN.md).
            tables.set(scope, var, NumType::Int);
            infer_stmts(tables, scope, body);
        }
    }
}

/// Recurses through a body (including nested `if`/`while`/`for`) collecting
/// the join of every `return <expr>` found, used to derive a function's
/// return type after its body has been fully inferred.
fn collect_return_type(tables: &SymbolTables, scope: Option<&str>, stmts: &[Stmt]) -> NumType {
    let mut ty = NumType::Int;
    for stmt in stmts {
        ty = ty.join(collect_return_type_stmt(tables, scope, stmt));
    }
    ty
}

fn collect_return_type_stmt(tables: &SymbolTables, scope: Option<&str>, stmt: &Stmt) -> NumType {
    match stmt {
        Stmt::Return(Some(expr)) => infer_expr_type(tables, scope, expr),
        Stmt::Return(None) => NumType::Int,
        Stmt::If { body, orelse, .. } => {
            collect_return_type(tables, scope, body).join(collect_return_type(tables, scope, orelse))
        }
        Stmt::While { body, .. } | Stmt::For { body, .. } => collect_return_type(tables, scope, body),
        _ => NumType::Int,
    }
}

/// Phase 2: joins every call's argument types into the callee's parameter
/// types. A single pass suffices -- the lattice has height 1, so no
/// argument type can ever need to widen a parameter more than once.
fn refine_call_sites(tables: &mut SymbolTables, program: &Program) {
    let mut calls = Vec::new();
    collect_calls_stmts(None, &program.top_level, &mut calls);
    for func in &program.functions {
        collect_calls_stmts(Some(func.name.as_str()), &func.body, &mut calls);
    }

    for (scope, callee, args) in calls {
        if !tables.is_known_function(&callee) {
            continue;
        }
        let param_names: Vec<String> = tables
            .params_in_order(&callee)
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        for (i, arg) in args.iter().enumerate() {
            let Some(param_name) = param_names.get(i) else { continue };
            let arg_ty = infer_expr_type(tables, scope.as_deref(), arg);
            let current = tables.param_type(&callee, param_name);
            tables.set_param_type(&callee, param_name, current.join(arg_ty));
        }
    }
}

type CallSite = (Option<String>, String, Vec<Expr>);

fn collect_calls_stmts(scope: Option<&str>, stmts: &[Stmt], out: &mut Vec<CallSite>) {
    for stmt in stmts {
        collect_calls_stmt(scope, stmt, out);
    }
}

fn collect_calls_stmt(scope: Option<&str>, stmt: &Stmt, out: &mut Vec<CallSite>) {
    match stmt {
        Stmt::Assign { targets, value } => {
            collect_calls_expr(scope, value, out);
            for target in targets {
                if let Target::Subscript { container, index } = target {
                    collect_calls_expr(scope, container, out);
                    collect_calls_expr(scope, index, out);
                }
            }
        }
        Stmt::AugAssign { target, value, .. } => {
            collect_calls_expr(scope, value, out);
            if let Target::Subscript { container, index } = target {
                collect_calls_expr(scope, container, out);
                collect_calls_expr(scope, index, out);
            }
        }
        Stmt::Expr(expr) => collect_calls_expr(scope, expr, out),
        Stmt::Return(Some(expr)) => collect_calls_expr(scope, expr, out),
        Stmt::Return(None) | Stmt::Pass | Stmt::Break | Stmt::Continue => {}
        Stmt::If { test, body, orelse } => {
            collect_calls_expr(scope, test, out);
            collect_calls_stmts(scope, body, out);
            collect_calls_stmts(scope, orelse, out);
        }
        Stmt::While { test, body } => {
            collect_calls_expr(scope, test, out);
            collect_calls_stmts(scope, body, out);
        }
        Stmt::For { iter, body, .. } => {
            collect_calls_expr(scope, iter, out);
            collect_calls_stmts(scope, body, out);
        }
    }
}

fn collect_calls_expr(scope: Option<&str>, expr: &Expr, out: &mut Vec<CallSite>) {
    match expr {
        Expr::Literal(_) | Expr::Name(_) => {}
        Expr::BinOp { left, right, .. } => {
            collect_calls_expr(scope, left, out);
            collect_calls_expr(scope, right, out);
        }
        Expr::UnaryOp { operand, .. } => collect_calls_expr(scope, operand, out),
        Expr::Compare { operands, .. } => {
            for operand in operands {
                collect_calls_expr(scope, operand, out);
            }
        }
        Expr::BoolOp { values, .. } => {
            for value in values {
                collect_calls_expr(scope, value, out);
            }
        }
        Expr::IfExp { test, body, orelse } => {
            collect_calls_expr(scope, test, out);
            collect_calls_expr(scope, body, out);
            collect_calls_expr(scope, orelse, out);
        }
        Expr::Call { callee, args } => {
            for arg in args {
                collect_calls_expr(scope, arg, out);
            }
            out.push((scope.map(str::to_string), callee.clone(), args.clone()));
        }
        Expr::Subscript { container, index } => {
            collect_calls_expr(scope, container, out);
            collect_calls_expr(scope, index, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use numl_core::ast::{Expr, FunctionDef, Literal, Param, Program, Stmt, Target};
    use numl_core::ops::{BinOp, CmpOp};

    fn lit_int(v: i64) -> Expr {
        Expr::Literal(Literal::Int(v))
    }
    fn lit_float(v: f64) -> Expr {
        Expr::Literal(Literal::Float(v))
    }

    #[test]
    fn truediv_always_float_floordiv_always_int() {
        let tables = SymbolTables::new();
        let truediv = Expr::BinOp { op: BinOp::TrueDiv, left: Box::new(lit_int(1)), right: Box::new(lit_int(2)) };
        let floordiv = Expr::BinOp { op: BinOp::FloorDiv, left: Box::new(lit_float(1.0)), right: Box::new(lit_float(2.0)) };
        assert_eq!(infer_expr_type(&tables, None, &truediv), NumType::Float);
        assert_eq!(infer_expr_type(&tables, None, &floordiv), NumType::Int);
    }

    #[test]
    fn add_joins_operand_types() {
        let tables = SymbolTables::new();
        let add = Expr::BinOp { op: BinOp::Add, left: Box::new(lit_int(1)), right: Box::new(lit_float(2.0)) };
        assert_eq!(infer_expr_type(&tables, None, &add), NumType::Float);
    }

    #[test]
    fn comparison_and_bool_op_are_int() {
        let tables = SymbolTables::new();
        let cmp = Expr::Compare { operands: vec![lit_float(1.0), lit_float(2.0)], ops: vec![CmpOp::Lt] };
        assert_eq!(infer_expr_type(&tables, None, &cmp), NumType::Int);
    }

    #[test]
    fn subscript_type_is_container_type() {
        let mut tables = SymbolTables::new();
        tables.set(None, "buf", NumType::Float);
        let sub = Expr::Subscript { container: Box::new(Expr::Name("buf".into())), index: Box::new(lit_int(0)) };
        assert_eq!(infer_expr_type(&tables, None, &sub), NumType::Float);
    }

    #[test]
    fn unknown_callee_defaults_to_int() {
        let tables = SymbolTables::new();
        let call = Expr::Call { callee: "mystery".into(), args: vec![] };
        assert_eq!(infer_expr_type(&tables, None, &call), NumType::Int);
    }

    #[test]
    fn return_type_is_join_of_int_and_every_return() {
        let program = Program {
            functions: vec![FunctionDef {
                name: "maybe_float".into(),
                params: vec![Param::new("flag")],
                body: vec![Stmt::If {
                    test: Expr::Name("flag".into()),
                    body: vec![Stmt::Return(Some(lit_float(1.5)))],
                    orelse: vec![Stmt::Return(Some(lit_int(0)))],
                }],
            }],
            top_level: vec![],
        };
        let tables = run(&program);
        assert_eq!(tables.return_type("maybe_float"), NumType::Float);
    }

    #[test]
    fn annotated_param_seeds_to_annotation_not_int() {
        let program = Program {
            functions: vec![FunctionDef {
                name: "scale".into(),
                params: vec![Param::annotated("factor", NumType::Float), Param::new("n")],
                body: vec![Stmt::Return(Some(Expr::Name("n".into())))],
            }],
            top_level: vec![],
        };
        let tables = run(&program);
        assert_eq!(tables.param_type("scale", "factor"), NumType::Float);
        assert_eq!(tables.param_type("scale", "n"), NumType::Int);
    }

    #[test]
    fn call_site_refinement_widens_parameter_from_argument_type() {
        // def add_one(x): return x + 1
        // y = add_one(2.5)
        let program = Program {
            functions: vec![FunctionDef {
                name: "add_one".into(),
                params: vec![Param::new("x")],
                body: vec![Stmt::Return(Some(Expr::BinOp {
                    op: BinOp::Add,
                    left: Box::new(Expr::Name("x".into())),
                    right: Box::new(lit_int(1)),
                }))],
            }],
            top_level: vec![Stmt::Assign {
                targets: vec![Target::Name("y".into())],
                value: Expr::Call { callee: "add_one".into(), args: vec![lit_float(2.5)] },
            }],
        };
        let tables = run(&program);
        assert_eq!(tables.param_type("add_one", "x"), NumType::Float);
    }

    #[test]
    fn refinement_never_narrows_a_float_annotated_param() {
        let program = Program {
            functions: vec![FunctionDef {
                name: "scale".into(),
                params: vec![Param::annotated("factor", NumType::Float)],
                body: vec![Stmt::Return(Some(Expr::Name("factor".into())))],
            }],
            top_level: vec![Stmt::Expr(Expr::Call {
                callee: "scale".into(),
                args: vec![lit_int(2)],
            })],
        };
        let tables = run(&program);
        // An INT argument joined against a FLOAT-annotated parameter stays FLOAT.
        assert_eq!(tables.param_type("scale", "factor"), NumType::Float);
    }

    #[test]
    fn subscript_write_promotes_parameter_to_float() {
        // def k(buf, tid): buf[tid] = 1.25
        let program = Program {
            functions: vec![FunctionDef {
                name: "k".into(),
                params: vec![Param::new("buf"), Param::new("tid")],
                body: vec![Stmt::Assign {
                    targets: vec![Target::Subscript {
                        container: Box::new(Expr::Name("buf".into())),
                        index: Box::new(Expr::Name("tid".into())),
                    }],
                    value: lit_float(1.25),
                }],
            }],
            top_level: vec![],
        };
        let tables = run(&program);
        // A subscript-target store still widens its container's own type:
        // `buf[tid] = 1.25` joins `buf`'s current type with FLOAT.
        assert_eq!(tables.param_type("k", "buf"), NumType::Float);
    }

    #[test]
    fn for_loop_variable_is_always_int() {
        let program = Program {
            functions: vec![],
            top_level: vec![Stmt::For {
                var: "i".into(),
                iter: Expr::Call { callee: "range".into(), args: vec![lit_float(10.0)] },
                body: vec![],
            }],
        };
        let tables = run(&program);
        assert_eq!(tables.lookup(None, "i"), NumType::Int);
    }

    proptest::proptest! {
        #[test]
        fn refinement_only_ever_widens_a_plain_param(arg_is_float: bool) {
            let arg = if arg_is_float { lit_float(1.0) } else { lit_int(1) };
            let program = Program {
                functions: vec![FunctionDef {
                    name: "f".into(),
                    params: vec![Param::new("x")],
                    body: vec![Stmt::Return(Some(Expr::Name("x".into())))],
                }],
                top_level: vec![Stmt::Expr(Expr::Call { callee: "f".into(), args: vec![arg] })],
            };
            let before = NumType::Int; // seeded type before refinement
            let tables = run(&program);
            let after = tables.param_type("f", "x");
            prop_assert!(before <= after);
        }
    }
}
