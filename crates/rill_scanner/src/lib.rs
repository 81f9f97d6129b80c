//! rill_scanner: The character-level lexer.
//!
//! Converts source text into a stream of tokens the parser consumes.
//! Trivia (whitespace, line breaks, comments) is skipped between tokens;
//! whether a line break occurred is recorded on the following token since
//! the grammar has same-line rules for postfix operators and `return`.

mod scanner;

pub use scanner::{tokenize, Scanner};
