//! rill_diagnostics: Diagnostic messages and error reporting infrastructure.
//!
//! Every static error the toolchain can produce is declared here as a
//! message template. Diagnostics carry the span they point at; rendering
//! to the `(line:col, line:col) message.` form happens against a
//! [`LineMap`] so the scanner, parser and binder never deal with
//! line/column bookkeeping themselves.
//!
//! There is a single severity: every diagnostic is a hard error that
//! prevents evaluation.

use rill_core::text::{LineMap, TextSpan};
use std::fmt;

/// A diagnostic message template with a stable code.
/// May contain `{0}`, `{1}`, etc. placeholders.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// The diagnostic error code (e.g. 1002, 2304).
    pub code: u32,
    /// The message template string.
    pub message: &'static str,
}

/// A realized diagnostic with location information and resolved message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The source text span this diagnostic points at.
    pub span: TextSpan,
    /// The resolved message text.
    pub message_text: String,
    /// The diagnostic error code.
    pub code: u32,
}

impl Diagnostic {
    /// Create a new diagnostic at a span.
    pub fn with_span(span: TextSpan, message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            span,
            message_text: format_message(message.message, args),
            code: message.code,
        }
    }

    /// Render as `(startLine:startCol, endLine:endCol) message.`.
    pub fn format(&self, line_map: &LineMap) -> String {
        let start = line_map.position_of(self.span.start);
        let end = line_map.position_of(self.span.end());
        format!("({}, {}) {}.", start, end, self.message_text)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.span, self.message_text)
    }
}

/// Format a message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// A collection of diagnostics accumulated during compilation.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn report(&mut self, span: TextSpan, message: &DiagnosticMessage, args: &[&str]) {
        self.add(Diagnostic::with_span(span, message, args));
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Sort diagnostics by source position.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by_key(|d| d.span.start);
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, $msg:expr) => {
            DiagnosticMessage {
                code: $code,
                message: $msg,
            }
        };
    }

    // ========================================================================
    // Scanner errors (1000-1099)
    // ========================================================================
    pub const ILLEGAL_CHARACTER: DiagnosticMessage = diag!(1001, "Illegal character '{0}'");
    pub const INVALID_LITERAL: DiagnosticMessage = diag!(1002, "Invalid literal '{0}'");
    pub const UNTERMINATED_STRING_LITERAL: DiagnosticMessage =
        diag!(1003, "Unterminated string literal");
    pub const ILLEGAL_ESCAPE: DiagnosticMessage = diag!(1004, "Illegal escape: {0}");
    pub const EMPTY_CHARACTER_LITERAL: DiagnosticMessage = diag!(1005, "Empty character literal");
    pub const TOO_MANY_CHARACTERS_IN_CHARACTER_LITERAL: DiagnosticMessage =
        diag!(1006, "Too many characters in a character literal");
    pub const UNTERMINATED_CHARACTER_LITERAL: DiagnosticMessage =
        diag!(1007, "Unterminated character literal");
    pub const UNTERMINATED_BLOCK_COMMENT: DiagnosticMessage =
        diag!(1008, "Unterminated block comment");

    // ========================================================================
    // Parser errors (1100-1199)
    // ========================================================================
    pub const UNEXPECTED_TOKEN: DiagnosticMessage = diag!(1101, "Unexpected '{0}', expected '{1}'");

    // ========================================================================
    // Binder errors (2000-2099)
    // ========================================================================
    pub const INVALID_UNARY_OPERATION: DiagnosticMessage =
        diag!(2001, "The '{0}' operator cannot be applied to '{1}'");
    pub const INVALID_BINARY_OPERATION: DiagnosticMessage =
        diag!(2002, "The '{0}' operator cannot be applied to '{1}' and '{2}'");
    pub const INVALID_STATEMENT: DiagnosticMessage = diag!(2003, "This isn't a valid statement");
    pub const UNKNOWN_SYMBOL: DiagnosticMessage = diag!(2004, "Unknown symbol '{0}'");
    pub const ALREADY_EXISTENT_SYMBOL: DiagnosticMessage =
        diag!(2005, "Already existent symbol '{0}'");
    pub const WRONG_ASSIGNMENT: DiagnosticMessage =
        diag!(2006, "You can't assign a value of type '{0}' to '{1}'");
    pub const FINAL_SYMBOL: DiagnosticMessage =
        diag!(2007, "'{0}' is final and it cannot be modified");
    pub const INVALID_ASSIGNMENT_TARGET: DiagnosticMessage =
        diag!(2008, "This isn't a valid assignment target");
    pub const INVALID_CONDITION: DiagnosticMessage =
        diag!(2009, "A condition must be of type 'boolean'");
    pub const JUMP_THROUGH_FUNCTION: DiagnosticMessage =
        diag!(2010, "'{0}' cannot transfer control out of a 'function' statement");
    pub const JUMP_THROUGH_DEFER: DiagnosticMessage =
        diag!(2011, "'{0}' cannot transfer control out of a 'defer' statement");
    pub const OUT_OF_LOOP_JUMP: DiagnosticMessage =
        diag!(2012, "'{0}' must be in a 'while' or 'do..while' statement");
    pub const ALREADY_USED_PARAMETER_NAME: DiagnosticMessage =
        diag!(2013, "There already is a parameter named '{0}'");
    pub const ALREADY_USED_FIELD_NAME: DiagnosticMessage =
        diag!(2014, "There already is a field named '{0}'");
    pub const UNDEFINED_TYPE: DiagnosticMessage = diag!(2015, "Undefined type '{0}'");
    pub const INVALID_CALLING_TARGET: DiagnosticMessage =
        diag!(2016, "This isn't a valid calling target");
    pub const INVALID_INDEXED_TARGET: DiagnosticMessage =
        diag!(2017, "This isn't an indexed target");
    pub const UNEXPECTED_ARGUMENTS_SIZE: DiagnosticMessage =
        diag!(2018, "Unexpected arguments size: expected: '{0}', actual: '{1}'");
    pub const UNEXPECTED_ARGUMENT_TYPE: DiagnosticMessage =
        diag!(2019, "Unexpected argument type: expected: '{0}', actual: '{1}'");
    pub const UNREACHED_STATEMENT: DiagnosticMessage = diag!(2020, "Unreached statement");
    pub const WRONG_RETURN_VALUE_TYPE: DiagnosticMessage =
        diag!(2021, "A value of type '{0}' cannot be return by a function of type '{1}'");
    pub const MISSING_RETURN_VALUE: DiagnosticMessage =
        diag!(2022, "This return expression must provide a value of type '{0}'");
    pub const REQUIRED_RETURN_VALUE: DiagnosticMessage =
        diag!(2023, "This function require a return expression of type '{0}'");
    pub const INVALID_PANIC_MESSAGE_TYPE: DiagnosticMessage =
        diag!(2024, "Panic's message must be of type 'string'");
    pub const SELF_REFERENCE_NOT_FOUND: DiagnosticMessage =
        diag!(2025, "There is no 'self' reference available in this scope");
    pub const WRONG_INDEX_TYPE: DiagnosticMessage =
        diag!(2026, "This index type must be of type '{0}'");
    pub const WRONG_TUPLE_INDEX_FORMAT: DiagnosticMessage =
        diag!(2027, "A tuple index must be a constant int literal");
    pub const INDEX_OUT_OF_BOUNDS: DiagnosticMessage = diag!(2028, "This index is out of bounds");
    pub const CANNOT_INFER_TYPE: DiagnosticMessage =
        diag!(2029, "Cannot infer type for this expression, it must be specified it explicitly");
    pub const UNEXPECTED_VALUE_TYPE: DiagnosticMessage =
        diag!(2030, "Expected value of type '{0}', but got a value of type '{1}'");
    pub const IMPOSSIBLE_CAST: DiagnosticMessage = diag!(2031, "This cast can never succeed");
    pub const OVERLOAD_RESOLUTION_AMBIGUITY: DiagnosticMessage =
        diag!(2032, "Overload resolution ambiguity. All these functions match:{0}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        let text = format_message("Unexpected '{0}', expected '{1}'", &["+", "identifier"]);
        assert_eq!(text, "Unexpected '+', expected 'identifier'");
    }

    #[test]
    fn test_diagnostic_render() {
        let source = "let a = 1\nlet a = 2";
        let map = LineMap::new(source);
        let diag = Diagnostic::with_span(
            TextSpan::from_bounds(14, 15),
            &messages::ALREADY_EXISTENT_SYMBOL,
            &["a"],
        );
        assert_eq!(diag.format(&map), "(2:5, 2:6) Already existent symbol 'a'.");
    }

    #[test]
    fn test_collection_sort() {
        let mut collection = DiagnosticCollection::new();
        collection.report(TextSpan::new(10, 1), &messages::UNREACHED_STATEMENT, &[]);
        collection.report(TextSpan::new(2, 1), &messages::INVALID_STATEMENT, &[]);
        collection.sort();
        assert_eq!(collection.diagnostics()[0].span.start, 2);
        assert_eq!(collection.len(), 2);
    }
}
