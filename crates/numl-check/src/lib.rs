//! The type-inference pass: recovers the `{INT, FLOAT}` lattice for every
//! variable, parameter, return value and subscriptable buffer in a program.
//!
//! Two phases, run once each (the lattice has height 1, so a single
//! refinement pass always reaches a fixpoint -- see [`inference::run`]):
//!
//! 1. a bottom-up expression/statement walk that seeds an initial
//!    assignment of types ([`inference::infer_program`]);
//! 2. a call-site refinement pass that joins argument types back into
//!    callee parameter types ([`inference::refine_call_sites`]).
//!
//! Both phases are total: every lookup of an unknown name or callee
//! defaults to `INT`, so there is nothing here that can fail and no error
//! type is exported by this crate.

pub mod inference;

pub use inference::{infer_expr_type, run};
