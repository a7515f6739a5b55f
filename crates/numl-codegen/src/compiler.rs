//! The pipeline entry point: inference, call-site refinement (both done by
//! [`numl_check::inference::run`]) followed by emission against whichever
//! backend [`CompileOptions`] selects. Mirrors the teacher's top-level
//! `compile`/`compile_to_ir` split -- a thin function that only sequences
//! passes and logs around them, with all real work living in the pass
//! modules themselves.

use numl_core::ast::Program;

use crate::c_backend;
use crate::error::CodegenError;
use crate::gpu_backend;
use crate::options::{BackendKind, CompileOptions};

/// Runs the full pipeline over `program` and returns the generated source
/// text for the backend `options` selects.
///
/// # Errors
/// Returns [`CodegenError::BackendRejection`] if the program contains a
/// construct the selected backend forbids outright (GPU `print`). Other
/// [`CodegenError`] variants are recovered from internally and never
/// observed here -- they only ever reach a `tracing::warn!` call site.
pub fn compile(program: &Program, options: &CompileOptions) -> Result<String, CodegenError> {
    let span = tracing::info_span!("compile", backend = ?options.backend);
    let _enter = span.enter();

    let tables = {
        let _infer_span = tracing::info_span!("infer").entered();
        numl_check::inference::run(program)
    };
    tracing::debug!(functions = program.functions.len(), "inference complete");

    let _emit_span = tracing::info_span!("emit").entered();
    match options.backend {
        BackendKind::CLike => c_backend::emit_program(program, &tables, options),
        BackendKind::Gpu => gpu_backend::emit_program(program, &tables, options),
    }
}
