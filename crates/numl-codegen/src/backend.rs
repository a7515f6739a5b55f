//! The backend descriptor: the small set of operations the two targets
//! override, per Design Notes §9 ("model this as a backend descriptor ...
//! rather than deep inheritance"). Everything else -- control-flow
//! flattening, declaration bookkeeping, expression emission -- lives once in
//! [`crate::emitter::Emitter`] and is shared by both implementations.

use numl_core::ast::Expr;
use numl_core::types::NumType;

use crate::emitter::Emitter;
use crate::error::CodegenError;

/// Backends are stateless descriptors (no heap data, `Copy`), so an
/// `Emitter` can hold one by value and hand out copies to call back into
/// itself without fighting the borrow checker over a long-lived reference.
pub trait Backend: Copy {
    fn int_ty(&self) -> &'static str;
    fn float_ty(&self) -> &'static str;

    /// The spelling used for a `for`-range loop's counter. Both targets use
    /// their integer spelling; kept overridable because Design Notes §9
    /// names it as part of the descriptor's surface.
    fn loop_index_ty(&self) -> &'static str {
        self.int_ty()
    }

    /// `L ** R`. Always backend-overridden -- there is no shared default
    /// (the shared symbol table maps `Pow` to `"?"`, a deliberate
    /// unreachable placeholder).
    fn lower_pow(&self, l_src: &str, r_src: &str, l_ty: NumType, r_ty: NumType) -> String;

    /// `L // R`. The shared default is `(L / R)`; both targets override it
    /// to cast through their floating spelling when either operand is
    /// `FLOAT`.
    fn lower_floordiv(&self, l_src: &str, r_src: &str, l_ty: NumType, r_ty: NumType) -> String;

    /// Lowers a call expression. Both backends intercept `print` (the
    /// C-like backend routes it to a formatted write; the GPU backend
    /// rejects it outright) and fall back to [`crate::emitter::default_call`]
    /// for everything else.
    fn lower_call(&self, em: &mut Emitter<'_, Self>, callee: &str, args: &[Expr]) -> Result<String, CodegenError>
    where
        Self: Sized;
}
