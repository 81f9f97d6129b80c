//! rill_types: The type algebra.
//!
//! Types are immutable and shared behind `Rc`. Structural comparison is
//! used everywhere except records, which are nominal. The two sentinel
//! types never reach the user: `Error` absorbs in both directions to
//! suppress cascading diagnostics, and `Nothing` is the bottom type of
//! never-returning expressions.

mod store;
mod ty;

pub use store::TypeStore;
pub use ty::{RecordType, Type, TypeRef};
