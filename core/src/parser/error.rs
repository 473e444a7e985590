use crate::api::{Diagnostic, ErrorCode};
use crate::parser::Span;

/// Lexical or syntax error. Parsing stops at the first one.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

/// Specific kinds of parse errors
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// No token starts with this character
    UnexpectedCharacter { found: char },
    /// Integer literal does not fit in 64 bits
    InvalidNumber { text: String },
    /// Malformed IP or MAC address literal
    InvalidAddress { text: String },
    /// Bad escape sequence inside a string literal
    InvalidEscape { message: String },
    UnterminatedString,
    /// Unexpected token
    UnexpectedToken { expected: String, found: String },
    /// Unclosed delimiter
    UnclosedDelimiter { delimiter: char },
    /// Maximum nesting depth exceeded
    MaxDepthExceeded { max_depth: usize },
    /// Input ended in the middle of an expression
    UnexpectedEnd { expected: String },
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn code(&self) -> ErrorCode {
        match self.kind {
            ParseErrorKind::UnexpectedCharacter { .. }
            | ParseErrorKind::InvalidNumber { .. }
            | ParseErrorKind::InvalidAddress { .. }
            | ParseErrorKind::InvalidEscape { .. }
            | ParseErrorKind::UnterminatedString => ErrorCode::Lexical,
            _ => ErrorCode::Syntax,
        }
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (message, id, help): (String, &'static str, Option<&str>) = match &self.kind {
            ParseErrorKind::UnexpectedCharacter { found } => {
                (format!("Unexpected character '{}'", found), "L001", None)
            }
            ParseErrorKind::InvalidNumber { text } => (
                format!("Invalid number literal '{}'", text),
                "L002",
                Some("Integer literals must fit in 64 bits"),
            ),
            ParseErrorKind::InvalidAddress { text } => (
                format!("Invalid address literal '{}'", text),
                "L003",
                Some("Check the address and prefix length"),
            ),
            ParseErrorKind::InvalidEscape { message } => {
                (format!("Invalid string literal: {}", message), "L004", None)
            }
            ParseErrorKind::UnterminatedString => (
                "Unterminated string literal".to_string(),
                "L004",
                Some("Add the missing closing quote"),
            ),
            ParseErrorKind::UnexpectedToken { expected, found } => (
                format!("Expected {}, found {}", expected, found),
                "P001",
                None,
            ),
            ParseErrorKind::UnclosedDelimiter { delimiter } => (
                format!("Unclosed delimiter '{}'", delimiter),
                "P002",
                Some("Add the missing closing delimiter"),
            ),
            ParseErrorKind::MaxDepthExceeded { max_depth } => (
                format!(
                    "Expression nesting depth exceeds maximum of {} levels",
                    max_depth
                ),
                "P003",
                Some("Reduce nesting or simplify the expression"),
            ),
            ParseErrorKind::UnexpectedEnd { expected } => (
                format!("Expected {}, found end of input", expected),
                "P004",
                None,
            ),
        };

        let diagnostic = Diagnostic::error(self.code(), id, message, Some(self.span.clone()));
        match help {
            Some(help) => diagnostic.with_help(help),
            None => diagnostic,
        }
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.to_diagnostic())
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_to_diagnostic() {
        let error = ParseError::new(
            ParseErrorKind::UnexpectedToken {
                expected: "expression".to_string(),
                found: "','".to_string(),
            },
            Span(10..20),
        );

        let diagnostic = error.to_diagnostic();
        assert_eq!(diagnostic.code, ErrorCode::Syntax);
        assert!(diagnostic.message.contains("Expected expression"));
        assert!(diagnostic.message.contains("found ','"));
        assert_eq!(diagnostic.id, "P001");
        assert_eq!(diagnostic.span, Some(Span(10..20)));
    }

    #[test]
    fn test_lexical_errors_have_lexical_code() {
        let error = ParseError::new(ParseErrorKind::UnterminatedString, Span(3..7));
        assert_eq!(error.code(), ErrorCode::Lexical);
        assert_eq!(error.to_diagnostic().id, "L004");
    }
}
