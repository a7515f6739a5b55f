//! The C-like backend: 64-bit integers, IEEE-754 double, `printf`-based
//! output. Forward-declares every function, defines each one, then emits
//! the entry point whose body holds all module-level statements.

use numl_core::ast::{Expr, FunctionDef, Literal, Program};
use numl_core::ops::BinOp;
use numl_core::symtab::SymbolTables;
use numl_core::types::NumType;

use crate::backend::Backend;
use crate::emitter::{default_call, escape_c_string, Emitter};
use crate::error::CodegenError;
use crate::options::CompileOptions;
use crate::walk;

#[derive(Debug, Clone, Copy)]
pub struct CBackend;

impl Backend for CBackend {
    fn int_ty(&self) -> &'static str {
        "long long"
    }

    fn float_ty(&self) -> &'static str {
        "double"
    }

    fn lower_pow(&self, l_src: &str, r_src: &str, l_ty: NumType, r_ty: NumType) -> String {
        if l_ty.is_int() && r_ty.is_int() {
            format!("(long long)pow((double){}, (double){})", l_src, r_src)
        } else {
            format!("pow((double){}, (double){})", l_src, r_src)
        }
    }

    fn lower_floordiv(&self, l_src: &str, r_src: &str, l_ty: NumType, r_ty: NumType) -> String {
        if l_ty.is_float() || r_ty.is_float() {
            format!("(long long)((double){} / (double){})", l_src, r_src)
        } else {
            format!("({} / {})", l_src, r_src)
        }
    }

    fn lower_call(&self, em: &mut Emitter<'_, Self>, callee: &str, args: &[Expr]) -> Result<String, CodegenError> {
        if callee == "print" {
            return lower_print(em, args);
        }
        default_call(em, callee, args)
    }
}

/// `print(args...)` -> a single `printf` call. Format specifier per
/// argument: `%s` for a string literal, `%f` for `FLOAT`, `%lld` for `INT`.
/// A literal integer argument (but not an integer-*typed* sub-expression --
/// see the spec's Open Questions on this asymmetry) is additionally cast to
/// `(long long)` to match the `%lld` width.
fn lower_print(em: &mut Emitter<'_, CBackend>, args: &[Expr]) -> Result<String, CodegenError> {
    if args.is_empty() {
        return Ok(r#"printf("\n")"#.to_string());
    }

    let mut specifiers = Vec::with_capacity(args.len());
    let mut rendered = Vec::with_capacity(args.len());
    for arg in args {
        if let Expr::Literal(Literal::Str(s)) = arg {
            specifiers.push("%s");
            rendered.push(format!("\"{}\"", escape_c_string(s)));
            continue;
        }
        let ty = em.type_of(arg);
        let mut src = em.emit_expr(arg)?;
        if ty.is_float() {
            specifiers.push("%f");
        } else {
            specifiers.push("%lld");
            if matches!(arg, Expr::Literal(Literal::Int(_))) {
                src = format!("(long long){}", src);
            }
        }
        rendered.push(src);
    }

    let format_string = format!("{}\\n", specifiers.join(" "));
    Ok(format!("printf(\"{}\", {})", format_string, rendered.join(", ")))
}

/// The top-level driver: prelude, forward declarations, definitions, entry
/// point. This is the "top-level driver" piece of the backend descriptor
/// from Design Notes §9 -- different enough from the GPU backend's
/// helpers-then-kernels split that it is a free function here rather than a
/// `Backend` trait method.
pub fn emit_program(program: &Program, tables: &SymbolTables, options: &CompileOptions) -> Result<String, CodegenError> {
    let mut em = Emitter::new(CBackend, tables);

    em.write_line("#include <stdio.h>");
    if program_contains_pow(program) {
        em.write_line("#include <math.h>");
    }
    em.blank_line();

    for func in &program.functions {
        em.write_line(format!("{};", function_signature(tables, &func.name)));
    }
    if !program.functions.is_empty() {
        em.blank_line();
    }

    for func in &program.functions {
        emit_function(&mut em, func)?;
        em.blank_line();
    }

    let entry_name = options.entry_function.as_deref().unwrap_or("main");
    em.write_line(format!("int {}() {{", entry_name));
    em.indent_in();
    em.emit_stmts(&program.top_level)?;
    em.write_line("return 0;");
    em.indent_out();
    em.write_line("}");

    Ok(em.into_source())
}

fn emit_function(em: &mut Emitter<'_, CBackend>, func: &FunctionDef) -> Result<(), CodegenError> {
    em.write_line(format!("{} {{", function_signature(em.tables, &func.name)));
    em.indent_in();
    let param_names: Vec<String> = func.params.iter().map(|p| p.name.clone()).collect();
    em.push_function_scope(&func.name, param_names);
    em.emit_stmts(&func.body)?;
    em.pop_function_scope();
    em.indent_out();
    em.write_line("}");
    Ok(())
}

fn function_signature(tables: &SymbolTables, name: &str) -> String {
    let return_spelling = if tables.return_type(name).is_float() { "double" } else { "long long" };
    let params = tables.params_in_order(name);
    let params_src = if params.is_empty() {
        "void".to_string()
    } else {
        params
            .iter()
            .map(|(param_name, ty)| {
                let spelling = if ty.is_float() { "double" } else { "long long" };
                format!("{} {}", spelling, param_name)
            })
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("{} {}({})", return_spelling, name, params_src)
}

fn program_contains_pow(program: &Program) -> bool {
    let mut found = false;
    let mut check = |expr: &Expr| {
        if let Expr::BinOp { op: BinOp::Pow, .. } = expr {
            found = true;
        }
    };
    walk::walk_stmts(&program.top_level, &mut check);
    for func in &program.functions {
        walk::walk_stmts(&func.body, &mut check);
    }
    found
}
