//! Compilation configuration: which backend to target and the small set of
//! backend-agnostic knobs the emitter consults along the way.

use serde::{Deserialize, Serialize};

/// Selects which textual target the emitter lowers a [`numl_core::ast::Program`] to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendKind {
    /// 64-bit integers, IEEE-754 double, `printf`-based output.
    CLike,
    /// 32-bit integers, IEEE-754 float, kernel/helper split.
    Gpu,
}

impl Default for BackendKind {
    fn default() -> Self {
        BackendKind::CLike
    }
}

/// Options controlling a single compilation. One instance per call to
/// [`crate::compile`]; carries no state across compilations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileOptions {
    pub backend: BackendKind,

    /// Overrides the name of the C-like backend's implicit entry point
    /// (which otherwise wraps the module's top-level statements in
    /// `int main()`). Has no effect on the GPU backend, which has no
    /// implicit entry point -- every kernel is its own entry point.
    pub entry_function: Option<String>,
}
