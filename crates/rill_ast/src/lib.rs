//! rill_ast: Tokens and the untyped syntax tree.
//!
//! The scanner produces [`token::Token`]s, the parser assembles them into
//! the [`tree`] nodes consumed by the binder. Nodes are plain owned enums;
//! the tree is built once and consumed once.

pub mod token;
pub mod tree;

pub use token::{Token, TokenKind, TokenValue};
