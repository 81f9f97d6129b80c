//! The scanner implementation.

use rill_ast::token::{Token, TokenKind, TokenValue};
use rill_core::text::{TextPos, TextSpan};
use rill_diagnostics::{messages, DiagnosticCollection};

/// The scanner converts source text into tokens.
pub struct Scanner {
    /// The source text being scanned.
    text: Vec<char>,
    /// Current position in the text.
    pos: usize,
    /// Start of the current token (after leading trivia).
    token_start: usize,
    /// Whether a line break was seen in the trivia before the current token.
    line_break_before: bool,
    /// Accumulated diagnostics.
    diagnostics: DiagnosticCollection,
}

/// Tokenize a whole source text. Returns the token list (always terminated
/// by an end-of-file token) and any lexical diagnostics.
pub fn tokenize(source: &str) -> (Vec<Token>, DiagnosticCollection) {
    let mut scanner = Scanner::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = scanner.scan();
        let done = token.kind == TokenKind::EndOfFile;
        tokens.push(token);
        if done {
            break;
        }
    }
    (tokens, scanner.take_diagnostics())
}

impl Scanner {
    /// Create a new scanner for the given source text.
    pub fn new(text: &str) -> Self {
        Self {
            text: text.chars().collect(),
            pos: 0,
            token_start: 0,
            line_break_before: false,
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Take the accumulated diagnostics, leaving an empty collection.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    #[inline]
    fn is_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    #[inline]
    fn current(&self) -> char {
        self.text[self.pos]
    }

    #[inline]
    fn peek(&self, offset: usize) -> Option<char> {
        self.text.get(self.pos + offset).copied()
    }

    fn span_from(&self, start: usize) -> TextSpan {
        TextSpan::from_bounds(start as TextPos, self.pos as TextPos)
    }

    fn token_span(&self) -> TextSpan {
        self.span_from(self.token_start)
    }

    fn token_text(&self) -> String {
        self.text[self.token_start..self.pos].iter().collect()
    }

    /// Scan the next token.
    pub fn scan(&mut self) -> Token {
        self.line_break_before = false;
        loop {
            self.skip_trivia();
            self.token_start = self.pos;
            if self.is_eof() {
                return self.make(TokenKind::EndOfFile);
            }
            let ch = self.current();
            self.pos += 1;
            let kind = match ch {
                '(' => TokenKind::OpenParen,
                ')' => TokenKind::CloseParen,
                '[' => TokenKind::OpenBracket,
                ']' => TokenKind::CloseBracket,
                '{' => TokenKind::OpenBrace,
                '}' => TokenKind::CloseBrace,
                ',' => TokenKind::Comma,
                ':' => TokenKind::Colon,
                ';' => TokenKind::Semicolon,
                '.' => TokenKind::Dot,
                '?' => TokenKind::Question,
                '+' => TokenKind::Plus,
                '*' => TokenKind::Star,
                '/' => TokenKind::Slash,
                '-' => {
                    if self.try_consume('>') {
                        TokenKind::Arrow
                    } else {
                        TokenKind::Minus
                    }
                }
                '&' => {
                    if self.try_consume('&') {
                        TokenKind::AmpersandAmpersand
                    } else {
                        TokenKind::Ampersand
                    }
                }
                '|' => {
                    if self.try_consume('|') {
                        TokenKind::PipePipe
                    } else {
                        TokenKind::Pipe
                    }
                }
                '=' => {
                    if self.try_consume('=') {
                        TokenKind::EqualEqual
                    } else {
                        TokenKind::Equal
                    }
                }
                '!' => {
                    if self.try_consume('=') {
                        TokenKind::BangEqual
                    } else {
                        TokenKind::Bang
                    }
                }
                '<' => {
                    if self.try_consume('=') {
                        TokenKind::LessEqual
                    } else {
                        TokenKind::Less
                    }
                }
                '>' => {
                    if self.try_consume('=') {
                        TokenKind::GreaterEqual
                    } else {
                        TokenKind::Greater
                    }
                }
                '"' => return self.scan_string(),
                '\'' => return self.scan_char(),
                _ if ch.is_ascii_digit() => return self.scan_number(),
                _ if is_identifier_start(ch) => return self.scan_identifier(),
                _ => {
                    self.diagnostics.report(
                        self.token_span(),
                        &messages::ILLEGAL_CHARACTER,
                        &[&ch.to_string()],
                    );
                    continue;
                }
            };
            return self.make(kind);
        }
    }

    fn make(&self, kind: TokenKind) -> Token {
        let mut token = Token::new(kind, self.token_text(), self.token_span());
        token.line_break_before = self.line_break_before;
        token
    }

    fn make_literal(&self, kind: TokenKind, value: TokenValue) -> Token {
        let mut token = self.make(kind);
        token.value = value;
        token
    }

    fn try_consume(&mut self, expected: char) -> bool {
        if !self.is_eof() && self.current() == expected {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_trivia(&mut self) {
        while !self.is_eof() {
            let ch = self.current();
            if ch == '\n' {
                self.line_break_before = true;
                self.pos += 1;
            } else if ch.is_whitespace() {
                self.pos += 1;
            } else if ch == '/' && self.peek(1) == Some('/') {
                while !self.is_eof() && self.current() != '\n' {
                    self.pos += 1;
                }
            } else if ch == '/' && self.peek(1) == Some('*') {
                self.skip_block_comment();
            } else {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) {
        let start = self.pos;
        self.pos += 2;
        loop {
            if self.is_eof() {
                self.diagnostics.report(
                    self.span_from(start),
                    &messages::UNTERMINATED_BLOCK_COMMENT,
                    &[],
                );
                return;
            }
            if self.current() == '\n' {
                self.line_break_before = true;
            }
            if self.current() == '*' && self.peek(1) == Some('/') {
                self.pos += 2;
                return;
            }
            self.pos += 1;
        }
    }

    /// Scan a numeric literal: Int by default, `l`/`L` suffix makes a Long
    /// (only from the integer state), `f`/`F` makes a Float, a `.` followed
    /// by a digit makes a Double. Out-of-range literals are reported and
    /// fall back to zero.
    fn scan_number(&mut self) -> Token {
        while !self.is_eof() && self.current().is_ascii_digit() {
            self.pos += 1;
        }
        let mut is_double = false;
        if !self.is_eof()
            && self.current() == '.'
            && self.peek(1).is_some_and(|c| c.is_ascii_digit())
        {
            is_double = true;
            self.pos += 1;
            while !self.is_eof() && self.current().is_ascii_digit() {
                self.pos += 1;
            }
        }
        if !is_double && !self.is_eof() && matches!(self.current(), 'l' | 'L') {
            self.pos += 1;
            let digits: String = self.text[self.token_start..self.pos - 1].iter().collect();
            let value = self.parse_or_zero(digits.parse::<i64>().ok());
            return self.make_literal(TokenKind::Long, TokenValue::Long(value));
        }
        if !self.is_eof() && matches!(self.current(), 'f' | 'F') {
            self.pos += 1;
            let digits: String = self.text[self.token_start..self.pos - 1].iter().collect();
            let value = self.parse_or_zero(parse_finite_f32(&digits));
            return self.make_literal(TokenKind::Float, TokenValue::Float(value));
        }
        if is_double {
            let digits = self.token_text();
            let value = self.parse_or_zero(parse_finite_f64(&digits));
            self.make_literal(TokenKind::Double, TokenValue::Double(value))
        } else {
            let digits = self.token_text();
            let value = self.parse_or_zero(digits.parse::<i32>().ok());
            self.make_literal(TokenKind::Int, TokenValue::Int(value))
        }
    }

    fn parse_or_zero<T: Default>(&mut self, parsed: Option<T>) -> T {
        match parsed {
            Some(value) => value,
            None => {
                self.diagnostics.report(
                    self.token_span(),
                    &messages::INVALID_LITERAL,
                    &[&self.token_text()],
                );
                T::default()
            }
        }
    }

    fn scan_string(&mut self) -> Token {
        let mut value = String::new();
        loop {
            if self.is_eof() || self.current() == '\n' {
                self.diagnostics.report(
                    self.token_span(),
                    &messages::UNTERMINATED_STRING_LITERAL,
                    &[],
                );
                break;
            }
            let ch = self.current();
            self.pos += 1;
            match ch {
                '"' => break,
                '\\' => {
                    if let Some(escaped) = self.scan_escape() {
                        value.push(escaped);
                    }
                }
                _ => value.push(ch),
            }
        }
        self.make_literal(TokenKind::String, TokenValue::String(value))
    }

    fn scan_char(&mut self) -> Token {
        let mut chars: Vec<char> = Vec::new();
        let mut terminated = false;
        loop {
            if self.is_eof() || self.current() == '\n' {
                break;
            }
            let ch = self.current();
            self.pos += 1;
            match ch {
                '\'' => {
                    terminated = true;
                    break;
                }
                '\\' => {
                    if let Some(escaped) = self.scan_escape() {
                        chars.push(escaped);
                    }
                }
                _ => chars.push(ch),
            }
        }
        if !terminated {
            self.diagnostics.report(
                self.token_span(),
                &messages::UNTERMINATED_CHARACTER_LITERAL,
                &[],
            );
        } else if chars.is_empty() {
            self.diagnostics
                .report(self.token_span(), &messages::EMPTY_CHARACTER_LITERAL, &[]);
        } else if chars.len() > 1 {
            self.diagnostics.report(
                self.token_span(),
                &messages::TOO_MANY_CHARACTERS_IN_CHARACTER_LITERAL,
                &[],
            );
        }
        let value = chars.first().copied().unwrap_or('\u{0000}');
        self.make_literal(TokenKind::Char, TokenValue::Char(value))
    }

    /// Scan the character after a `\`. Returns None when the escape is
    /// illegal (reported) or the text ends.
    fn scan_escape(&mut self) -> Option<char> {
        if self.is_eof() {
            return None;
        }
        let start = self.pos - 1;
        let ch = self.current();
        self.pos += 1;
        match ch {
            '"' => Some('"'),
            '\'' => Some('\''),
            '\\' => Some('\\'),
            't' => Some('\t'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            'b' => Some('\u{0008}'),
            '0' => Some('\u{0000}'),
            'u' => {
                let mut code = 0u32;
                for _ in 0..4 {
                    let digit = self
                        .peek(0)
                        .and_then(|c| c.to_digit(16))
                        .or_else(|| {
                            self.diagnostics.report(
                                self.span_from(start),
                                &messages::ILLEGAL_ESCAPE,
                                &[&format!("\\{}", ch)],
                            );
                            None
                        })?;
                    code = code * 16 + digit;
                    self.pos += 1;
                }
                char::from_u32(code)
            }
            _ => {
                self.diagnostics.report(
                    self.span_from(start),
                    &messages::ILLEGAL_ESCAPE,
                    &[&format!("\\{}", ch)],
                );
                None
            }
        }
    }

    fn scan_identifier(&mut self) -> Token {
        while !self.is_eof() && is_identifier_part(self.current()) {
            self.pos += 1;
        }
        let text = self.token_text();
        match TokenKind::keyword(&text) {
            Some(keyword) => self.make(keyword),
            None => self.make(TokenKind::Identifier),
        }
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_identifier_part(ch: char) -> bool {
    is_identifier_start(ch) || ch.is_ascii_digit()
}

fn parse_finite_f32(text: &str) -> Option<f32> {
    text.parse::<f32>().ok().filter(|v| v.is_finite())
}

fn parse_finite_f64(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let (tokens, diagnostics) = tokenize(source);
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics);
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            kinds("-> && || == != <= >= = !"),
            vec![
                TokenKind::Arrow,
                TokenKind::AmpersandAmpersand,
                TokenKind::PipePipe,
                TokenKind::EqualEqual,
                TokenKind::BangEqual,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::Equal,
                TokenKind::Bang,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_number_literals() {
        let (tokens, diagnostics) = tokenize("1 42L 2.5 3f 1.25f");
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[0].value, TokenValue::Int(1));
        assert_eq!(tokens[1].value, TokenValue::Long(42));
        assert_eq!(tokens[2].value, TokenValue::Double(2.5));
        assert_eq!(tokens[3].value, TokenValue::Float(3.0));
        assert_eq!(tokens[4].value, TokenValue::Float(1.25));
    }

    #[test]
    fn test_long_suffix_not_after_double() {
        // "1.5l" is a double followed by an identifier.
        let (tokens, _) = tokenize("1.5l");
        assert_eq!(tokens[0].kind, TokenKind::Double);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].text, "l");
    }

    #[test]
    fn test_int_overflow_reports_invalid_literal() {
        let (tokens, diagnostics) = tokenize("99999999999999999999");
        assert_eq!(tokens[0].value, TokenValue::Int(0));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics.diagnostics()[0].message_text,
            "Invalid literal '99999999999999999999'"
        );
    }

    #[test]
    fn test_string_escapes() {
        let (tokens, diagnostics) = tokenize(r#""a\tb\nA""#);
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[0].value, TokenValue::String("a\tb\nA".to_string()));
    }

    #[test]
    fn test_unterminated_string() {
        let (tokens, diagnostics) = tokenize("\"abc\nlet");
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(
            diagnostics.diagnostics()[0].message_text,
            "Unterminated string literal"
        );
        assert_eq!(tokens[1].kind, TokenKind::Let);
    }

    #[test]
    fn test_char_literals() {
        let (tokens, diagnostics) = tokenize(r"'a' '\n'");
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[0].value, TokenValue::Char('a'));
        assert_eq!(tokens[1].value, TokenValue::Char('\n'));

        let (_, diagnostics) = tokenize("''");
        assert_eq!(diagnostics.diagnostics()[0].message_text, "Empty character literal");

        let (_, diagnostics) = tokenize("'ab'");
        assert_eq!(
            diagnostics.diagnostics()[0].message_text,
            "Too many characters in a character literal"
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("fun record let def self none _x $y"),
            vec![
                TokenKind::Fun,
                TokenKind::Record,
                TokenKind::Let,
                TokenKind::Def,
                TokenKind::SelfKeyword,
                TokenKind::None,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_comments_are_trivia() {
        assert_eq!(
            kinds("let // comment\n/* block\ncomment */ x"),
            vec![TokenKind::Let, TokenKind::Identifier, TokenKind::EndOfFile]
        );
    }

    #[test]
    fn test_unterminated_block_comment() {
        let (_, diagnostics) = tokenize("/* never closed");
        assert_eq!(
            diagnostics.diagnostics()[0].message_text,
            "Unterminated block comment"
        );
    }

    #[test]
    fn test_line_break_flag() {
        let (tokens, _) = tokenize("a\nb c");
        assert!(!tokens[0].line_break_before);
        assert!(tokens[1].line_break_before);
        assert!(!tokens[2].line_break_before);
    }

    #[test]
    fn test_illegal_character_is_skipped() {
        let (tokens, diagnostics) = tokenize("a # b");
        assert_eq!(tokens.len(), 3); // a, b, eof
        assert_eq!(
            diagnostics.diagnostics()[0].message_text,
            "Illegal character '#'"
        );
    }
}
