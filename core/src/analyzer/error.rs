use crate::api::{Diagnostic, ErrorCode};
use crate::parser::Span;
use crate::types::Type;

/// Type resolution error. The resolver keeps going after one of these, so a
/// compilation may report several.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub span: Span,
}

impl core::fmt::Display for TypeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.to_diagnostic())
    }
}

impl std::error::Error for TypeError {}

/// Specific kinds of type errors
#[derive(Debug, Clone, PartialEq)]
pub enum TypeErrorKind {
    /// Identifier is neither a field nor a constant
    UnknownField { name: String },
    /// Identifier compared against a field is not a known constant
    UnknownConstant { name: String },
    /// No registered operation accepts these operand types
    NoOperation { op: String, operands: Vec<Type> },
    /// Operand of a logical context has no conversion to bool
    NotBoolean { found: Type, context: &'static str },
    /// Several implicit conversions make the operation applicable
    CastAmbiguity {
        op: String,
        operands: Vec<Type>,
        candidates: Vec<String>,
    },
    /// List elements cannot be brought to a common type
    ListHeterogeneity { expected: Type, found: Type },
    /// List literal with no elements
    EmptyList,
    /// List literal containing a list
    NestedList,
    /// Constant lookup returned a value that does not match its type
    ConstantTypeMismatch { name: String, declared: Type },
}

fn describe_operands(operands: &[Type]) -> String {
    operands
        .iter()
        .map(Type::to_string)
        .collect::<Vec<_>>()
        .join(" and ")
}

impl TypeError {
    pub fn new(kind: TypeErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn code(&self) -> ErrorCode {
        match self.kind {
            TypeErrorKind::UnknownField { .. } => ErrorCode::UnknownField,
            TypeErrorKind::UnknownConstant { .. } => ErrorCode::UnknownConstant,
            TypeErrorKind::CastAmbiguity { .. } => ErrorCode::CastAmbiguity,
            TypeErrorKind::ListHeterogeneity { .. } => ErrorCode::ListHeterogeneity,
            TypeErrorKind::NoOperation { .. }
            | TypeErrorKind::NotBoolean { .. }
            | TypeErrorKind::EmptyList
            | TypeErrorKind::NestedList
            | TypeErrorKind::ConstantTypeMismatch { .. } => ErrorCode::TypeMismatch,
        }
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (message, id, help): (String, &'static str, Option<String>) = match &self.kind {
            TypeErrorKind::UnknownField { name } => (
                format!("Unknown field '{}'", name),
                "E001",
                Some("Check the field name against the record schema".to_string()),
            ),
            TypeErrorKind::UnknownConstant { name } => (
                format!("Unknown constant '{}'", name),
                "E002",
                Some("Use a literal or a constant known to the schema".to_string()),
            ),
            TypeErrorKind::NoOperation { op, operands } => (
                format!(
                    "Operator '{}' cannot be applied to {}",
                    op,
                    describe_operands(operands)
                ),
                "E003",
                None,
            ),
            TypeErrorKind::NotBoolean { found, context } => (
                format!("Expected bool {}, found {}", context, found),
                "E004",
                Some(format!("{} has no truth value", found)),
            ),
            TypeErrorKind::CastAmbiguity {
                op,
                operands,
                candidates,
            } => (
                format!(
                    "Ambiguous implicit conversion for operator '{}' on {}",
                    op,
                    describe_operands(operands)
                ),
                "E005",
                Some(format!("Candidates: {}", candidates.join("; "))),
            ),
            TypeErrorKind::ListHeterogeneity { expected, found } => (
                format!(
                    "List elements must share one type: expected {}, found {}",
                    expected, found
                ),
                "E006",
                None,
            ),
            TypeErrorKind::EmptyList => (
                "Empty list has no element type".to_string(),
                "E007",
                None,
            ),
            TypeErrorKind::NestedList => (
                "Lists cannot contain lists".to_string(),
                "E008",
                None,
            ),
            TypeErrorKind::ConstantTypeMismatch { name, declared } => (
                format!(
                    "Constant '{}' is declared as {} but its value is not",
                    name, declared
                ),
                "E009",
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_operation_message_names_operator_and_types() {
        let error = TypeError::new(
            TypeErrorKind::NoOperation {
                op: "+".to_string(),
                operands: vec![Type::STR, Type::INT],
            },
            Span(0..9),
        );
        let diagnostic = error.to_diagnostic();
        assert_eq!(diagnostic.code, ErrorCode::TypeMismatch);
        assert_eq!(diagnostic.id, "E003");
        assert_eq!(
            diagnostic.message,
            "Operator '+' cannot be applied to string and int"
        );
    }

    #[test]
    fn test_unknown_field_diagnostic() {
        let error = TypeError::new(
            TypeErrorKind::UnknownField {
                name: "prot".to_string(),
            },
            Span(0..4),
        );
        let diagnostic = error.to_diagnostic();
        assert_eq!(diagnostic.code, ErrorCode::UnknownField);
        assert_eq!(diagnostic.span, Some(Span(0..4)));
        assert_eq!(diagnostic.help.len(), 1);
    }
}
