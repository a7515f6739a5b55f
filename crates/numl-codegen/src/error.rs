//! The emitter's error taxonomy.
//!
//! Only [`CodegenError::BackendRejection`] is ever returned from [`crate::compile`]
//! -- it is the one fatal category, raised for a construct a specific backend
//! forbids outright (GPU `print`). `UnsupportedStatement`, `UnsupportedExpression`
//! and `UnknownOperator` are non-fatal: the emitter recovers locally by writing
//! a sentinel comment or placeholder into the generated source and continuing,
//! logging a `tracing::warn!` at the point of occurrence rather than
//! surfacing a `Result::Err`. The variants still exist here so the taxonomy is
//! one type, not three ad hoc string formats scattered across the emitter.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodegenError {
    /// A statement shape the emitter cannot lower (e.g. `for` over anything
    /// but `range(...)`). Recovered locally with a sentinel comment.
    #[error("unsupported statement: {0}")]
    UnsupportedStatement(String),

    /// An expression kind outside the data model. Recovered locally with a
    /// sentinel placeholder.
    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),

    /// A construct that is syntactically valid but forbidden by the target
    /// backend. Fatal -- aborts the whole compilation.
    #[error("backend rejected construct: {0}")]
    BackendRejection(String),

    /// An operator symbol missing from the backend's lowering table. Emitted
    /// as a literal `?` in the generated source; a latent-bug indicator, not
    /// a hard abort.
    #[error("unknown operator: {0:?}")]
    UnknownOperator(String),
}
