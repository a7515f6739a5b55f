//! The AST, operator vocabulary, symbol tables and numeric type lattice
//! shared by every pass of the compiler. Nothing in this crate performs
//! inference or emission -- it is pure data, owned per-compilation, with
//! no global mutable state (see [`symtab::SymbolTables`]).

pub mod ast;
pub mod ops;
pub mod symtab;
pub mod types;

pub use ast::{Expr, FunctionDef, Literal, Param, Program, Stmt, Target};
pub use ops::{BinOp, CmpOp, LogicOp, UnaryOp};
pub use symtab::{FunctionScope, SymbolTables};
pub use types::NumType;
