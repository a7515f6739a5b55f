//! The two-point numeric type lattice.
//!
//! Every value in the source language is either an integer or a floating
//! point number. There is no third point: booleans, subscript results, and
//! call results all resolve to one of these two before they ever reach a
//! backend. Widening is one-directional and the lattice has height 1, so a
//! single join pass is always enough to reach a fixpoint.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in the `{INT, FLOAT}` lattice, ordered `Int <= Float`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NumType {
    Int,
    Float,
}

impl NumType {
    /// Least upper bound: `Float` absorbs `Int`, `Int` joined with `Int`
    /// stays `Int`.
    pub fn join(self, other: NumType) -> NumType {
        match (self, other) {
            (NumType::Float, _) | (_, NumType::Float) => NumType::Float,
            (NumType::Int, NumType::Int) => NumType::Int,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, NumType::Float)
    }

    pub fn is_int(self) -> bool {
        matches!(self, NumType::Int)
    }
}

impl Default for NumType {
    /// Names default to `Int` when no other information is available.
    fn default() -> Self {
        NumType::Int
    }
}

impl fmt::Display for NumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumType::Int => write!(f, "INT"),
            NumType::Float => write!(f, "FLOAT"),
        }
    }
}
