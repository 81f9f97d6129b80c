//! Token kinds and the token type produced by the scanner.

use rill_core::text::TextSpan;
use std::fmt;

/// Every kind of token the scanner can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Punctuation
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    Comma,
    Colon,
    Semicolon,
    Dot,
    Question,
    Pipe,
    Ampersand,
    Equal,
    Bang,
    Less,
    Greater,
    Plus,
    Minus,
    Star,
    Slash,
    AmpersandAmpersand,
    PipePipe,
    EqualEqual,
    BangEqual,
    LessEqual,
    GreaterEqual,
    Arrow,

    // Keywords
    As,
    Break,
    Continue,
    Def,
    Defer,
    Do,
    Else,
    False,
    Fun,
    If,
    Let,
    New,
    None,
    Panic,
    Record,
    Return,
    SelfKeyword,
    True,
    Try,
    While,

    // Literals and identifiers
    Int,
    Long,
    Float,
    Double,
    String,
    Char,
    Identifier,

    EndOfFile,
}

impl TokenKind {
    /// The keyword kind for an identifier-shaped word, if any.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        Some(match text {
            "as" => TokenKind::As,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "def" => TokenKind::Def,
            "defer" => TokenKind::Defer,
            "do" => TokenKind::Do,
            "else" => TokenKind::Else,
            "false" => TokenKind::False,
            "fun" => TokenKind::Fun,
            "if" => TokenKind::If,
            "let" => TokenKind::Let,
            "new" => TokenKind::New,
            "none" => TokenKind::None,
            "panic" => TokenKind::Panic,
            "record" => TokenKind::Record,
            "return" => TokenKind::Return,
            "self" => TokenKind::SelfKeyword,
            "true" => TokenKind::True,
            "try" => TokenKind::Try,
            "while" => TokenKind::While,
            _ => return Option::None,
        })
    }

    /// Whether a token of this kind can start an expression. Used by the
    /// parser to decide if `return` on the same line carries a value.
    pub fn can_start_expression(self) -> bool {
        matches!(
            self,
            TokenKind::OpenParen
                | TokenKind::OpenBracket
                | TokenKind::OpenBrace
                | TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Bang
                | TokenKind::False
                | TokenKind::True
                | TokenKind::Fun
                | TokenKind::New
                | TokenKind::None
                | TokenKind::Panic
                | TokenKind::Return
                | TokenKind::SelfKeyword
                | TokenKind::Try
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Int
                | TokenKind::Long
                | TokenKind::Float
                | TokenKind::Double
                | TokenKind::String
                | TokenKind::Char
                | TokenKind::Identifier
        )
    }

    /// The human-readable description used in `expected '...'` diagnostics.
    pub fn description(self) -> &'static str {
        match self {
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::OpenBracket => "[",
            TokenKind::CloseBracket => "]",
            TokenKind::OpenBrace => "{",
            TokenKind::CloseBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Dot => ".",
            TokenKind::Question => "?",
            TokenKind::Pipe => "|",
            TokenKind::Ampersand => "&",
            TokenKind::Equal => "=",
            TokenKind::Bang => "!",
            TokenKind::Less => "<",
            TokenKind::Greater => ">",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::AmpersandAmpersand => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::EqualEqual => "==",
            TokenKind::BangEqual => "!=",
            TokenKind::LessEqual => "<=",
            TokenKind::GreaterEqual => ">=",
            TokenKind::Arrow => "->",
            TokenKind::As => "as",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Def => "def",
            TokenKind::Defer => "defer",
            TokenKind::Do => "do",
            TokenKind::Else => "else",
            TokenKind::False => "false",
            TokenKind::Fun => "fun",
            TokenKind::If => "if",
            TokenKind::Let => "let",
            TokenKind::New => "new",
            TokenKind::None => "none",
            TokenKind::Panic => "panic",
            TokenKind::Record => "record",
            TokenKind::Return => "return",
            TokenKind::SelfKeyword => "self",
            TokenKind::True => "true",
            TokenKind::Try => "try",
            TokenKind::While => "while",
            TokenKind::Int => "int literal",
            TokenKind::Long => "long literal",
            TokenKind::Float => "float literal",
            TokenKind::Double => "double literal",
            TokenKind::String => "string literal",
            TokenKind::Char => "char literal",
            TokenKind::Identifier => "identifier",
            TokenKind::EndOfFile => "end of file",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A literal value decoded by the scanner. Numeric tokens that fail range
/// checks fall back to zero after the scanner has reported the error.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    None,
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Char(char),
}

/// A single token with its source text and span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The raw source text of the token.
    pub text: String,
    /// The decoded literal value, if this is a literal token.
    pub value: TokenValue,
    pub span: TextSpan,
    /// Whether a line break separates this token from the previous one.
    pub line_break_before: bool,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: TextSpan) -> Self {
        Self {
            kind,
            text: text.into(),
            value: TokenValue::None,
            span,
            line_break_before: false,
        }
    }

    /// A fabricated token used by parser error recovery.
    pub fn missing(kind: TokenKind, span: TextSpan) -> Self {
        Self {
            kind,
            text: String::new(),
            value: TokenValue::None,
            span: TextSpan::empty(span.start),
            line_break_before: false,
        }
    }
}
