//! rill_binder: name resolution and type checking.
//!
//! Turns the parser's syntax tree into a bound tree where every
//! expression carries its resolved type and every name points at a
//! symbol. The bound tree is what the evaluator runs.

pub mod binder;
pub mod bound;
pub mod builtins;
pub mod operators;
pub mod scope;
pub mod symbol;

pub use binder::bind;
pub use bound::{
    BoundBlock, BoundDefer, BoundExpr, BoundExprKind, BoundFunction, BoundIf, BoundProgram,
    BoundRecord, BoundStmt, BoundVariable, BoundWhile, Constant,
};
pub use builtins::Builtins;
pub use operators::{BinaryOperator, UnaryOperator};
pub use symbol::{Symbol, SymbolId, SymbolKind};
