//! Public error types for the filter API.
//!
//! Internal phase errors (`ParseError`, `TypeError`, ...) are converted to
//! `Diagnostic`s at the API boundary. Evaluation failures are reported per
//! call through `EvalError` and never invalidate the compiled filter.

use core::fmt;

use crate::api::Diagnostics;
use crate::parser::Span;

/// Public error type for compilation.
#[derive(Debug)]
pub enum Error {
    /// One or more phases rejected the expression.
    ///
    /// `diagnostics` is in detection order; `source` is the expression text
    /// the spans refer to.
    Compilation {
        diagnostics: Diagnostics,
        source: String,
    },
}

impl Error {
    pub fn diagnostics(&self) -> &Diagnostics {
        match self {
            Error::Compilation { diagnostics, .. } => diagnostics,
        }
    }

    pub fn source_text(&self) -> &str {
        match self {
            Error::Compilation { source, .. } => source,
        }
    }

    /// The code of the first error diagnostic.
    pub fn code(&self) -> Option<ErrorCode> {
        self.diagnostics()
            .iter()
            .find(|d| d.severity == Severity::Error)
            .map(|d| d.code)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Compilation { diagnostics, .. } => {
                let error_count = diagnostics
                    .iter()
                    .filter(|d| d.severity == Severity::Error)
                    .count();
                write!(f, "Compilation failed with {} error(s)", error_count)?;
                if let Some(first) = diagnostics.iter().next() {
                    write!(f, ": {}", first.message)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for Error {}

/// Error taxonomy shared by every compilation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Lexical,
    Syntax,
    UnknownField,
    UnknownConstant,
    TypeMismatch,
    CastAmbiguity,
    ListHeterogeneity,
    Allocation,
    Evaluation,
    /// Warning: the filter folded to a constant.
    ConstantFilter,
}

impl ErrorCode {
    pub fn name(self) -> &'static str {
        match self {
            ErrorCode::Lexical => "lexical error",
            ErrorCode::Syntax => "syntax error",
            ErrorCode::UnknownField => "unknown field",
            ErrorCode::UnknownConstant => "unknown constant",
            ErrorCode::TypeMismatch => "type mismatch",
            ErrorCode::CastAmbiguity => "ambiguous implicit cast",
            ErrorCode::ListHeterogeneity => "heterogeneous list",
            ErrorCode::Allocation => "allocation failure",
            ErrorCode::Evaluation => "evaluation error",
            ErrorCode::ConstantFilter => "constant filter",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A diagnostic message (error, warning, or info) with source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,

    /// Taxonomy class of the problem.
    pub code: ErrorCode,

    /// Stable identifier (e.g., "E001") for documentation lookup.
    pub id: &'static str,

    /// Primary diagnostic message.
    pub message: String,

    /// Source location of the primary issue; allocation failures have none.
    pub span: Option<Span>,

    /// Help text suggesting how to fix the issue.
    pub help: Vec<String>,
}

impl Diagnostic {
    pub fn error(code: ErrorCode, id: &'static str, message: String, span: Option<Span>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            id,
            message,
            span,
            help: Vec::new(),
        }
    }

    pub fn warning(code: ErrorCode, id: &'static str, message: String, span: Option<Span>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, id, message, span)
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {} [{}]", self.severity, self.message, self.id)?;
        for help_msg in &self.help {
            write!(f, "\nhelp: {}", help_msg)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Compilation cannot succeed.
    Error,
    /// Suspicious filter that still compiles.
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// 1-based line and column range of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub first_line: usize,
    pub first_column: usize,
    pub last_line: usize,
    pub last_column: usize,
}

impl Location {
    /// Converts a byte span into line:column positions in `source`.
    ///
    /// Columns count characters; `last_column` is inclusive, so an empty
    /// span at the end of input points just past the last character.
    pub fn from_span(source: &str, span: &Span) -> Self {
        let start = span.0.start.min(source.len());
        let end = span.0.end.min(source.len()).max(start);
        let (first_line, first_column) = line_col(source, start);
        let (last_line, last_column) = if end > start {
            let last_char = source[..end]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(start);
            line_col(source, last_char)
        } else {
            (first_line, first_column)
        };
        Self {
            first_line,
            first_column,
            last_line,
            last_column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.first_line, self.first_column)?;
        if (self.last_line, self.last_column) != (self.first_line, self.first_column) {
            write!(f, "-{}:{}", self.last_line, self.last_column)?;
        }
        Ok(())
    }
}

fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut offset = offset;
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_single_line() {
        let loc = Location::from_span("port == 80", &Span::new(8, 10));
        assert_eq!(
            loc,
            Location {
                first_line: 1,
                first_column: 9,
                last_line: 1,
                last_column: 10,
            }
        );
        assert_eq!(loc.to_string(), "1:9-1:10");
    }

    #[test]
    fn test_location_multi_line() {
        let source = "port == 80\nand proto == 6";
        let loc = Location::from_span(source, &Span::new(15, 20));
        assert_eq!(loc.first_line, 2);
        assert_eq!(loc.first_column, 5);
        assert_eq!(loc.last_line, 2);
        assert_eq!(loc.last_column, 9);
    }

    #[test]
    fn test_location_empty_span_at_end() {
        let loc = Location::from_span("a ==", &Span::new(4, 4));
        assert_eq!(loc.to_string(), "1:5");
    }

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic::error(
            ErrorCode::UnknownField,
            "E001",
            "Unknown field 'prot'".to_string(),
            Some(Span::new(0, 4)),
        )
        .with_help("Check the field name");
        assert_eq!(
            diagnostic.to_string(),
            "error: Unknown field 'prot' [E001]\nhelp: Check the field name"
        );
    }
}
