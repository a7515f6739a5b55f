//! A small shared AST walker. Used wherever a backend needs to scan an
//! entire body for the presence of some expression shape without writing
//! the recursion out again: the C-like backend's math-header rule (is there
//! a `**` anywhere in the module?) and the GPU backend's parameter
//! classifier (which parameters are used as subscript bases, and which are
//! compared against `tid`?) are both single passes over this walker.

use numl_core::ast::{Expr, Stmt, Target};

pub fn walk_stmts<F: FnMut(&Expr)>(stmts: &[Stmt], f: &mut F) {
    for stmt in stmts {
        walk_stmt(stmt, f);
    }
}

pub fn walk_stmt<F: FnMut(&Expr)>(stmt: &Stmt, f: &mut F) {
    match stmt {
        Stmt::Assign { targets, value } => {
            walk_expr(value, f);
            for target in targets {
                walk_target(target, f);
            }
        }
        Stmt::AugAssign { target, value, .. } => {
            walk_expr(value, f);
            walk_target(target, f);
        }
        Stmt::Expr(expr) => walk_expr(expr, f),
        Stmt::If { test, body, orelse } => {
            walk_expr(test, f);
            walk_stmts(body, f);
            walk_stmts(orelse, f);
        }
        Stmt::While { test, body } => {
            walk_expr(test, f);
            walk_stmts(body, f);
        }
        Stmt::For { iter, body, .. } => {
            walk_expr(iter, f);
            walk_stmts(body, f);
        }
        Stmt::Return(Some(expr)) => walk_expr(expr, f),
        Stmt::Return(None) | Stmt::Pass | Stmt::Break | Stmt::Continue => {}
    }
}

/// Mirrors `ast.walk` visiting a Store-context `Subscript` node: a subscript
/// assignment target is surfaced to `f` as an `Expr::Subscript` (not just its
/// container/index children), so a write-only buffer parameter is still
/// recognized wherever a caller scans for subscript bases.
fn walk_target<F: FnMut(&Expr)>(target: &Target, f: &mut F) {
    if let Target::Subscript { container, index } = target {
        let node = Expr::Subscript { container: container.clone(), index: index.clone() };
        walk_expr(&node, f);
    }
}

pub fn walk_expr<F: FnMut(&Expr)>(expr: &Expr, f: &mut F) {
    f(expr);
    match expr {
        Expr::Literal(_) | Expr::Name(_) => {}
        Expr::BinOp { left, right, .. } => {
            walk_expr(left, f);
            walk_expr(right, f);
        }
        Expr::UnaryOp { operand, .. } => walk_expr(operand, f),
        Expr::Compare { operands, .. } => {
            for operand in operands {
                walk_expr(operand, f);
            }
        }
        Expr::BoolOp { values, .. } => {
            for value in values {
                walk_expr(value, f);
            }
        }
        Expr::IfExp { test, body, orelse } => {
            walk_expr(test, f);
            walk_expr(body, f);
            walk_expr(orelse, f);
        }
        Expr::Call { args, .. } => {
            for arg in args {
                walk_expr(arg, f);
            }
        }
        Expr::Subscript { container, index } => {
            walk_expr(container, f);
            walk_expr(index, f);
        }
    }
}
