//! The GPU kernel backend: 32-bit integers, IEEE-754 float, kernel-launch
//! conventions and buffer-binding attributes. Adds a parameter
//! classification pre-pass (§4.6) that recovers buffer/scalar/thread-id
//! roles from an otherwise untyped parameter list.

use std::collections::HashSet;

use numl_core::ast::{Expr, FunctionDef, Program};
use numl_core::symtab::SymbolTables;
use numl_core::types::NumType;

use crate::backend::Backend;
use crate::emitter::{default_call, Emitter};
use crate::error::CodegenError;
use crate::options::CompileOptions;
use crate::walk;

#[derive(Debug, Clone, Copy)]
pub struct GpuBackend;

impl Backend for GpuBackend {
    fn int_ty(&self) -> &'static str {
        "int"
    }

    fn float_ty(&self) -> &'static str {
        "float"
    }

    fn lower_pow(&self, l_src: &str, r_src: &str, _l_ty: NumType, _r_ty: NumType) -> String {
        format!("pow((float){}, (float){})", l_src, r_src)
    }

    fn lower_floordiv(&self, l_src: &str, r_src: &str, l_ty: NumType, r_ty: NumType) -> String {
        if l_ty.is_float() || r_ty.is_float() {
            format!("(int)((float){} / (float){})", l_src, r_src)
        } else {
            format!("({} / {})", l_src, r_src)
        }
    }

    fn lower_call(&self, em: &mut Emitter<'_, Self>, callee: &str, args: &[Expr]) -> Result<String, CodegenError> {
        if callee == "print" {
            return Err(CodegenError::BackendRejection("print".to_string()));
        }
        default_call(em, callee, args)
    }
}

/// The role a non-`tid` kernel parameter is classified into, in priority
/// order (see §4.6). `BufferPointer` carries whether its element type is
/// `float` (the parameter's own inferred type is `FLOAT`) or `int`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamRole {
    BufferPointer { float_element: bool },
    ScalarFloatRef,
    ScalarUnsignedRef,
    ScalarIntRef,
}

pub fn is_kernel(func: &FunctionDef) -> bool {
    func.params.iter().any(|p| p.name == "tid")
}

/// Classifies every non-`tid` parameter of `func` in a single pass over its
/// body, in declaration order.
///
/// A buffer parameter's element type is read straight off `tables`: a
/// subscript store through a plain-name container (`buf[i] = 1.25`) already
/// widens that name's own type in [`numl_check::inference`] (subscripting
/// returns the container's own type in the lattice -- see §9), so by the
/// time this classifier runs, `tables.param_type` already reflects any
/// float write the kernel body made through the parameter.
pub fn classify_params(func: &FunctionDef, tables: &SymbolTables) -> Vec<(String, ParamRole)> {
    let mut subscript_bases: HashSet<String> = HashSet::new();
    let mut tid_neighbours: HashSet<String> = HashSet::new();

    let mut collect = |expr: &Expr| {
        if let Expr::Subscript { container, .. } = expr {
            if let Expr::Name(name) = container.as_ref() {
                subscript_bases.insert(name.clone());
            }
        }
        if let Expr::Compare { operands, .. } = expr {
            let names_tid = operands.iter().any(|o| matches!(o, Expr::Name(n) if n == "tid"));
            if names_tid {
                for operand in operands {
                    if let Expr::Name(name) = operand {
                        if name != "tid" {
                            tid_neighbours.insert(name.clone());
                        }
                    }
                }
            }
        }
    };
    walk::walk_stmts(&func.body, &mut collect);

    func.params
        .iter()
        .filter(|p| p.name != "tid")
        .map(|p| {
            let ty = tables.param_type(&func.name, &p.name);
            let role = if subscript_bases.contains(&p.name) {
                ParamRole::BufferPointer { float_element: ty.is_float() }
            } else if ty.is_float() {
                ParamRole::ScalarFloatRef
            } else if tid_neighbours.contains(&p.name) {
                ParamRole::ScalarUnsignedRef
            } else {
                ParamRole::ScalarIntRef
            };
            (p.name.clone(), role)
        })
        .collect()
}

fn kernel_signature(tables: &SymbolTables, func: &FunctionDef) -> String {
    let roles = classify_params(func, tables);
    let mut role_by_name: std::collections::HashMap<&str, ParamRole> =
        roles.iter().map(|(name, role)| (name.as_str(), *role)).collect();

    let mut binding = 0u32;
    let mut parts = Vec::with_capacity(func.params.len());
    for param in &func.params {
        if param.name == "tid" {
            parts.push("uint tid [[thread_position_in_grid]]".to_string());
            continue;
        }
        let role = role_by_name.remove(param.name.as_str()).expect("every non-tid param is classified");
        let idx = binding;
        binding += 1;
        let piece = match role {
            ParamRole::BufferPointer { float_element } => {
                let elem_ty = if float_element { "float" } else { "int" };
                format!("device {}* {} [[buffer({})]]", elem_ty, param.name, idx)
            }
            ParamRole::ScalarFloatRef => format!("constant float& {} [[buffer({})]]", param.name, idx),
            ParamRole::ScalarUnsignedRef => format!("constant uint& {} [[buffer({})]]", param.name, idx),
            ParamRole::ScalarIntRef => format!("constant int& {} [[buffer({})]]", param.name, idx),
        };
        parts.push(piece);
    }
    format!("kernel void {}({})", func.name, parts.join(", "))
}

fn helper_signature(tables: &SymbolTables, func: &FunctionDef) -> String {
    let return_spelling = if tables.return_type(&func.name).is_float() { "float" } else { "int" };
    let params_src = func
        .params
        .iter()
        .map(|p| {
            let ty = tables.param_type(&func.name, &p.name);
            let spelling = if ty.is_float() { "float" } else { "int" };
            format!("{} {}", spelling, p.name)
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} {}({})", return_spelling, func.name, params_src)
}

fn emit_function_body(em: &mut Emitter<'_, GpuBackend>, signature: String, func: &FunctionDef) -> Result<(), CodegenError> {
    em.write_line(format!("{} {{", signature));
    em.indent_in();
    let param_names: Vec<String> = func.params.iter().map(|p| p.name.clone()).collect();
    em.push_function_scope(&func.name, param_names);
    em.emit_stmts(&func.body)?;
    em.pop_function_scope();
    em.indent_out();
    em.write_line("}");
    Ok(())
}

/// Top-level driver: prelude, helpers, then kernels. Unlike the C-like
/// backend there is no implicit module entry point -- a GPU module's
/// top-level statements (if any are present in the AST) have no kernel
/// counterpart to run them in, so they are not emitted (see DESIGN.md).
pub fn emit_program(program: &Program, tables: &SymbolTables, _options: &CompileOptions) -> Result<String, CodegenError> {
    let mut em = Emitter::new(GpuBackend, tables);
    em.write_line("#include <metal_stdlib>");
    em.write_line("using namespace metal;");
    em.blank_line();

    let (kernels, helpers): (Vec<&FunctionDef>, Vec<&FunctionDef>) = program.functions.iter().partition(|f| is_kernel(f));

    for &func in &helpers {
        let sig = helper_signature(tables, func);
        emit_function_body(&mut em, sig, func)?;
        em.blank_line();
    }
    for &func in &kernels {
        let sig = kernel_signature(tables, func);
        emit_function_body(&mut em, sig, func)?;
        em.blank_line();
    }

    Ok(em.into_source())
}
