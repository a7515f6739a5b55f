//! The shared emitter: statement and expression lowering common to both
//! backends. Everything backend-specific (integer/float spelling, `pow`,
//! floor-division, `print`/call policy) is delegated to a [`crate::backend::Backend`]
//! implementation; this module owns control-flow flattening, declaration
//! bookkeeping and the fixed operator-symbol tables.

use std::collections::HashSet;

use numl_core::ast::{Expr, Literal, Stmt, Target};
use numl_core::ops::{BinOp, UnaryOp};
use numl_core::symtab::SymbolTables;
use numl_core::types::NumType;

use crate::backend::Backend;
use crate::error::CodegenError;

/// Walks a [`numl_core::ast::Program`] and accumulates an ordered line buffer of
/// target source text. One instance per compilation; mutated only during
/// emission, discarded afterward.
pub struct Emitter<'a, B: Backend> {
    pub backend: B,
    pub tables: &'a SymbolTables,
    lines: Vec<String>,
    indent: usize,
    /// Per-scope declared-names sets. The language has no nested function
    /// definitions, so a stack is never more than two deep (module, then
    /// whichever function is currently being emitted).
    declared_stack: Vec<HashSet<String>>,
    scope: Option<String>,
}

impl<'a, B: Backend> Emitter<'a, B> {
    pub fn new(backend: B, tables: &'a SymbolTables) -> Self {
        Emitter {
            backend,
            tables,
            lines: Vec::new(),
            indent: 0,
            declared_stack: vec![HashSet::new()],
            scope: None,
        }
    }

    pub fn into_source(self) -> String {
        let mut source = self.lines.join("\n");
        source.push('\n');
        source
    }

    pub fn current_scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Infers the type of `expr` against the already-fully-inferred tables.
    pub fn type_of(&self, expr: &Expr) -> NumType {
        numl_check::infer_expr_type(self.tables, self.scope.as_deref(), expr)
    }

    pub fn write_line(&mut self, text: impl Into<String>) {
        let indent = "    ".repeat(self.indent);
        self.lines.push(format!("{}{}", indent, text.into()));
    }

    pub fn blank_line(&mut self) {
        self.lines.push(String::new());
    }

    fn is_declared(&self, name: &str) -> bool {
        self.declared_stack.last().map(|s| s.contains(name)).unwrap_or(false)
    }

    pub fn mark_declared(&mut self, name: impl Into<String>) {
        if let Some(set) = self.declared_stack.last_mut() {
            set.insert(name.into());
        }
    }

    /// Enters a function body: pushes a fresh declared-names set seeded with
    /// the parameter names (already declared by the signature) and switches
    /// the active scope for table lookups.
    pub fn push_function_scope(&mut self, function: &str, params: impl IntoIterator<Item = String>) {
        self.declared_stack.push(params.into_iter().collect());
        self.scope = Some(function.to_string());
    }

    /// Restores the caller's (module) scope.
    pub fn pop_function_scope(&mut self) {
        self.declared_stack.pop();
        self.scope = None;
    }

    pub fn indent_in(&mut self) {
        self.indent += 1;
    }

    pub fn indent_out(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub fn emit_stmts(&mut self, stmts: &[Stmt]) -> Result<(), CodegenError> {
        for stmt in stmts {
            self.emit_stmt(stmt)?;
        }
        Ok(())
    }

    pub fn emit_stmt(&mut self, stmt: &Stmt) -> Result<(), CodegenError> {
        match stmt {
            Stmt::Assign { targets, value } => self.emit_assign(targets, value),
            Stmt::AugAssign { target, op, value } => self.emit_aug_assign(target, *op, value),
            Stmt::Expr(expr) => {
                let src = self.emit_expr(expr)?;
                self.write_line(format!("{};", src));
                Ok(())
            }
            Stmt::If { test, body, orelse } => self.emit_if(test, body, orelse),
            Stmt::While { test, body } => self.emit_while(test, body),
            Stmt::For { var, iter, body } => self.emit_for(var, iter, body),
            Stmt::Return(expr) => self.emit_return(expr.as_ref()),
            Stmt::Pass => {
                // Carried over from the pre-distillation original: `pass`
                // lowers to a comment rather than being elided, so emitted
                // output is statement-for-line stable.
                self.write_line("// pass");
                Ok(())
            }
            Stmt::Break => {
                self.write_line("break;");
                Ok(())
            }
            Stmt::Continue => {
                self.write_line("continue;");
                Ok(())
            }
        }
    }

    fn emit_assign(&mut self, targets: &[Target], value: &Expr) -> Result<(), CodegenError> {
        let src = self.emit_expr(value)?;
        for target in targets {
            match target {
                Target::Name(name) => {
                    if self.is_declared(name) {
                        self.write_line(format!("{} = {};", name, src));
                    } else {
                        let ty = self.tables.lookup(self.current_scope(), name);
                        let ty_spelling = if ty.is_float() { self.backend.float_ty() } else { self.backend.int_ty() };
                        self.write_line(format!("{} {} = {};", ty_spelling, name, src));
                        self.mark_declared(name.clone());
                    }
                }
                Target::Subscript { container, index } => {
                    let c = self.emit_expr(container)?;
                    let i = self.emit_expr(index)?;
                    self.write_line(format!("{}[{}] = {};", c, i, src));
                }
            }
        }
        Ok(())
    }

    fn emit_aug_assign(&mut self, target: &Target, op: BinOp, value: &Expr) -> Result<(), CodegenError> {
        match target {
            Target::Name(name) => {
                let name_expr = Expr::Name(name.clone());
                let combined = self.emit_binop(op, &name_expr, value)?;
                self.write_line(format!("{} = {};", name, combined));
                Ok(())
            }
            Target::Subscript { container, index } => {
                let c = self.emit_expr(container)?;
                let i = self.emit_expr(index)?;
                let current = format!("{}[{}]", c, i);
                let current_ty = self.type_of(&Expr::Subscript { container: container.clone(), index: index.clone() });
                let rhs = self.emit_expr(value)?;
                let rhs_ty = self.type_of(value);
                let combined = self.lower_binop_text(op, &current, &rhs, current_ty, rhs_ty);
                self.write_line(format!("{}[{}] = {};", c, i, combined));
                Ok(())
            }
        }
    }

    fn emit_if(&mut self, test: &Expr, body: &[Stmt], orelse: &[Stmt]) -> Result<(), CodegenError> {
        let mut branches: Vec<(&Expr, &[Stmt])> = vec![(test, body)];
        let mut final_else: &[Stmt] = orelse;
        while let [Stmt::If { test, body, orelse }] = final_else {
            branches.push((test, body));
            final_else = orelse;
        }

        for (i, (branch_test, branch_body)) in branches.iter().enumerate() {
            let cond = self.emit_expr(branch_test)?;
            if i == 0 {
                self.write_line(format!("if ({}) {{", cond));
            } else {
                self.write_line(format!("}} else if ({}) {{", cond));
            }
            self.indent_in();
            self.emit_stmts(branch_body)?;
            self.indent_out();
        }

        if final_else.is_empty() {
            self.write_line("}");
        } else {
            self.write_line("} else {");
            self.indent_in();
            self.emit_stmts(final_else)?;
            self.indent_out();
            self.write_line("}");
        }
        Ok(())
    }

    fn emit_while(&mut self, test: &Expr, body: &[Stmt]) -> Result<(), CodegenError> {
        let cond = self.emit_expr(test)?;
        self.write_line(format!("while ({}) {{", cond));
        self.indent_in();
        self.emit_stmts(body)?;
        self.indent_out();
        self.write_line("}");
        Ok(())
    }

    fn emit_for(&mut self, var: &str, iter: &Expr, body: &[Stmt]) -> Result<(), CodegenError> {
        let Expr::Call { callee, args } = iter else {
            tracing::warn!(iterator = ?iter, "for-loop over a non-call iterator is unsupported");
            self.write_line("/* unsupported iterator */");
            return Ok(());
        };
        if callee != "range" {
            tracing::warn!(callee, "for-loop over a non-range iterator is unsupported");
            self.write_line(format!("/* unsupported iterator: {} */", callee));
            return Ok(());
        }

        let zero = Expr::Literal(Literal::Int(0));
        let one = Expr::Literal(Literal::Int(1));
        let (start, end, step): (&Expr, &Expr, &Expr) = match args.len() {
            1 => (&zero, &args[0], &one),
            2 => (&args[0], &args[1], &one),
            3 => (&args[0], &args[1], &args[2]),
            _ => {
                tracing::warn!(arity = args.len(), "range() called with an unsupported arity");
                self.write_line("/* unsupported iterator: range */");
                return Ok(());
            }
        };

        let start_src = self.emit_expr(start)?;
        let end_src = self.emit_expr(end)?;
        let step_src = self.emit_expr(step)?;
        let cmp = if is_literally_negative(step) { ">" } else { "<" };
        let loop_ty = self.backend.loop_index_ty();

        self.write_line(format!(
            "for ({} {} = {}; {} {} {}; {} += {}) {{",
            loop_ty, var, start_src, var, cmp, end_src, var, step_src
        ));
        self.mark_declared(var.to_string());
        self.indent_in();
        self.emit_stmts(body)?;
        self.indent_out();
        self.write_line("}");
        Ok(())
    }

    fn emit_return(&mut self, expr: Option<&Expr>) -> Result<(), CodegenError> {
        match expr {
            Some(e) => {
                let src = self.emit_expr(e)?;
                self.write_line(format!("return {};", src));
            }
            None => self.write_line("return;"),
        }
        Ok(())
    }

    pub fn emit_expr(&mut self, expr: &Expr) -> Result<String, CodegenError> {
        match expr {
            Expr::Literal(lit) => Ok(emit_literal(lit)),
            Expr::Name(name) => Ok(name.clone()),
            Expr::BinOp { op, left, right } => self.emit_binop(*op, left, right),
            Expr::UnaryOp { op, operand } => self.emit_unary(*op, operand),
            Expr::Compare { operands, ops } => self.emit_compare(operands, ops),
            Expr::BoolOp { op, values } => self.emit_bool_op(*op, values),
            Expr::IfExp { test, body, orelse } => {
                let t = self.emit_expr(test)?;
                let b = self.emit_expr(body)?;
                let o = self.emit_expr(orelse)?;
                Ok(format!("({} ? {} : {})", t, b, o))
            }
            Expr::Call { callee, args } => {
                let backend = self.backend;
                backend.lower_call(self, callee, args)
            }
            Expr::Subscript { container, index } => {
                let c = self.emit_expr(container)?;
                let i = self.emit_expr(index)?;
                Ok(format!("{}[{}]", c, i))
            }
        }
    }

    fn emit_binop(&mut self, op: BinOp, left: &Expr, right: &Expr) -> Result<String, CodegenError> {
        let l_src = self.emit_expr(left)?;
        let r_src = self.emit_expr(right)?;
        let l_ty = self.type_of(left);
        let r_ty = self.type_of(right);
        Ok(self.lower_binop_text(op, &l_src, &r_src, l_ty, r_ty))
    }

    /// Applies operator lowering once both operand source texts and types are
    /// known -- shared by ordinary binary expressions and augmented
    /// assignment (which rebuilds `x = x <op> e`/`c[i] = c[i] <op> e`).
    fn lower_binop_text(&self, op: BinOp, l_src: &str, r_src: &str, l_ty: NumType, r_ty: NumType) -> String {
        match op {
            BinOp::Pow => self.backend.lower_pow(l_src, r_src, l_ty, r_ty),
            BinOp::FloorDiv => self.backend.lower_floordiv(l_src, r_src, l_ty, r_ty),
            _ => {
                let symbol = op.default_symbol();
                if symbol == "?" {
                    tracing::warn!(?op, "operator has no entry in the backend's lowering table");
                }
                format!("({} {} {})", l_src, symbol, r_src)
            }
        }
    }

    fn emit_unary(&mut self, op: UnaryOp, operand: &Expr) -> Result<String, CodegenError> {
        let src = self.emit_expr(operand)?;
        Ok(match op {
            UnaryOp::Neg => format!("(-{})", src),
            UnaryOp::Pos => format!("(+{})", src),
            UnaryOp::Not => format!("(!{})", src),
        })
    }

    /// A chain `x op1 y op2 z ...` lowers to a single parenthesized
    /// juxtaposition of operand/operator tokens, preserving source order
    /// rather than expanding to a conjunction of pairwise comparisons (see
    /// DESIGN.md for why the strengthening the spec permits is not adopted).
    fn emit_compare(&mut self, operands: &[Expr], ops: &[numl_core::ops::CmpOp]) -> Result<String, CodegenError> {
        let mut parts = Vec::with_capacity(operands.len() + ops.len());
        parts.push(self.emit_expr(&operands[0])?);
        for (op, operand) in ops.iter().zip(&operands[1..]) {
            parts.push(op.symbol().to_string());
            parts.push(self.emit_expr(operand)?);
        }
        Ok(format!("({})", parts.join(" ")))
    }

    fn emit_bool_op(&mut self, op: numl_core::ops::LogicOp, values: &[Expr]) -> Result<String, CodegenError> {
        let symbol = match op {
            numl_core::ops::LogicOp::And => "&&",
            numl_core::ops::LogicOp::Or => "||",
        };
        let mut parts = Vec::with_capacity(values.len());
        for value in values {
            parts.push(self.emit_expr(value)?);
        }
        Ok(format!("({})", parts.join(&format!(" {} ", symbol))))
    }
}

/// A plain `name(arg0, arg1, ...)` call -- the default lowering both
/// backends fall back to once they've intercepted their own special-cased
/// callees (`print`).
pub fn default_call<B: Backend>(em: &mut Emitter<'_, B>, callee: &str, args: &[Expr]) -> Result<String, CodegenError> {
    let mut parts = Vec::with_capacity(args.len());
    for arg in args {
        parts.push(em.emit_expr(arg)?);
    }
    Ok(format!("{}({})", callee, parts.join(", ")))
}

fn emit_literal(lit: &Literal) -> String {
    match lit {
        Literal::Int(v) => v.to_string(),
        Literal::Float(v) => format_float(*v),
        Literal::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        Literal::Str(s) => format!("\"{}\"", escape_c_string(s)),
    }
}

fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        v.to_string()
    }
}

pub fn escape_c_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// "a negative integer constant or the unary-negation of a constant" --
/// the exact rule §4.4 gives for choosing `>` over `<` as the range
/// comparison operator.
fn is_literally_negative(expr: &Expr) -> bool {
    match expr {
        Expr::Literal(Literal::Int(v)) => *v < 0,
        Expr::Literal(Literal::Float(v)) => *v < 0.0,
        Expr::UnaryOp { op: UnaryOp::Neg, operand } => matches!(**operand, Expr::Literal(_)),
        _ => false,
    }
}
