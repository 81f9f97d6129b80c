//! rill_core: Shared primitives for the rill toolchain.
//!
//! Currently this is source-text location tracking: spans measured in
//! character offsets and the line map used to render them as
//! line/column pairs in diagnostics.

pub mod text;
