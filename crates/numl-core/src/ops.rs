//! Operator vocabulary shared by the AST and every backend.
//!
//! Grouped into small sub-enums the way the source language itself groups
//! them: binary arithmetic, unary arithmetic, comparison, and short-circuit
//! logic. None of these carry type information -- type is a property of
//! operands, recovered by the inference pass, never of the operator.

use serde::{Deserialize, Serialize};

/// Binary arithmetic operators, in source order of precedence-agnostic
/// lowering. `TrueDiv` always produces `FLOAT`; `FloorDiv` always produces
/// `INT`; the rest join their operand types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    /// `/` -- always widens the result to `FLOAT`.
    TrueDiv,
    /// `//` -- always narrows the result to `INT`.
    FloorDiv,
    Mod,
    Pow,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinOp {
    /// The fixed symbol table the shared emitter uses for every operator
    /// except `Pow` (always backend-overridden) and `FloorDiv` (backend may
    /// override when either operand is `FLOAT`).
    pub fn default_symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::TrueDiv => "/",
            BinOp::FloorDiv => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "?",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
        }
    }
}

/// Unary arithmetic/logic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
}

/// Comparison operators usable as links in a chained comparison
/// (`a < b < c`, N+1 operands and N operators).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

/// Short-circuit boolean operators (`and`/`or`), applied across two or more
/// operands left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicOp {
    And,
    Or,
}
