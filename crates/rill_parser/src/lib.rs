//! rill_parser: Recursive-descent parser.
//!
//! Consumes the scanner's token stream and produces the untyped syntax
//! tree. Parsing never fails: unexpected tokens are reported once per
//! error burst, a placeholder token or expression is fabricated, and the
//! parser keeps going so the binder can still run over the rest of the
//! file.

mod parser;

pub use parser::{parse, Parser};
