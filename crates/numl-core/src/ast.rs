//! The AST the core consumes.
//!
//! This is a plain recursive tree, not a flat graph with edges: the source
//! language has no control-flow joins that need an SSA-style representation,
//! so there is nothing for a graph/arena indirection to buy us. A front end
//! (out of scope here) is expected to hand in a [`Program`] built this way,
//! typically deserialized from whatever the parser emits.

use serde::{Deserialize, Serialize};

use crate::types::NumType;

/// A literal value. Strings only ever appear as `print` arguments; there is
/// no string type in the numeric lattice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

/// An expression node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Literal),
    Name(String),
    BinOp {
        op: crate::ops::BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    UnaryOp {
        op: crate::ops::UnaryOp,
        operand: Box<Expr>,
    },
    /// A chained comparison: `operands.len() == ops.len() + 1`.
    Compare {
        operands: Vec<Expr>,
        ops: Vec<crate::ops::CmpOp>,
    },
    /// Short-circuit `and`/`or` across two or more operands.
    BoolOp {
        op: crate::ops::LogicOp,
        values: Vec<Expr>,
    },
    /// `a if cond else b`.
    IfExp {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },
    Call {
        callee: String,
        args: Vec<Expr>,
    },
    Subscript {
        container: Box<Expr>,
        index: Box<Expr>,
    },
}

/// An assignment or subscript target. Only `Name` targets declare a new
/// variable on first use; `Subscript` targets are always a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Target {
    Name(String),
    Subscript { container: Box<Expr>, index: Box<Expr> },
}

/// A statement node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// `a = b = <value>` -- one or more simple-name or subscript targets.
    Assign {
        targets: Vec<Target>,
        value: Expr,
    },
    AugAssign {
        target: Target,
        op: crate::ops::BinOp,
        value: Expr,
    },
    Expr(Expr),
    If {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    While {
        test: Expr,
        body: Vec<Stmt>,
    },
    /// `for <var> in <iter>: <body>`. `iter` is only supported when it is a
    /// `range(...)` call; any other iterable lowers to an unsupported-iterator
    /// sentinel at emission time.
    For {
        var: String,
        iter: Expr,
        body: Vec<Stmt>,
    },
    Return(Option<Expr>),
    Pass,
    Break,
    Continue,
}

/// A single function parameter, with an optional source-level type
/// annotation. An annotated parameter seeds its inferred type directly
/// instead of the `INT` default; it can still only widen further, never
/// narrow, so the monotonicity invariant is unaffected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub annotation: Option<NumType>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Param { name: name.into(), annotation: None }
    }

    pub fn annotated(name: impl Into<String>, ty: NumType) -> Self {
        Param { name: name.into(), annotation: Some(ty) }
    }
}

/// A top-level function definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
}

/// A whole compilation unit: top-level function definitions plus the
/// module-level statements that run outside of any function (the C-like
/// backend's entry point body).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub functions: Vec<FunctionDef>,
    pub top_level: Vec<Stmt>,
}
