//! rill_evaluator: a tree-walking interpreter for bound programs.
//!
//! Evaluation assumes a program that bound without diagnostics. The one
//! user-visible failure mode is an uncaught panic, surfaced as
//! [`RuntimePanic`].

pub mod environment;
pub mod evaluator;
pub mod value;

pub use environment::Environment;
pub use evaluator::{evaluate, Completion, Evaluator, RuntimePanic};
pub use value::{equals, BuiltinFn, Value};
