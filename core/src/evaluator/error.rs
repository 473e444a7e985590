//! Runtime evaluation errors.
//!
//! Type mismatches, unknown names and malformed lists are rejected at
//! compile time. What remains are data-dependent failures: arithmetic on
//! particular values, conversions that do not fit, and records that do not
//! carry a referenced field.

use thiserror::Error;

use crate::parser::Span;
use crate::types::Type;

/// Failure of a single bound operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// Integer division by zero.
    #[error("Division by zero")]
    DivisionByZero,

    /// int → uint conversion of a negative value.
    #[error("Cannot convert negative value {value} to uint")]
    NegativeToUnsigned { value: i64 },

    /// A bound operation received operands of another type than it was
    /// registered for. Only reachable through a misbehaving registry.
    #[error("Operator '{op}' received unexpected operands ({operands})")]
    OperandMismatch { op: &'static str, operands: String },
}

/// Error aborting one `Filter::evaluate` call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The data accessor reported the field as absent.
    #[error("Field '{name}' is missing from the record")]
    MissingField { name: String },

    /// The data accessor returned a value that does not match the field's
    /// declared type.
    #[error("Field '{name}' has declared type {expected} but the record holds {found}")]
    FieldTypeMismatch {
        name: String,
        expected: Type,
        found: String,
    },

    /// A bound operation failed.
    #[error("{error}")]
    Runtime { error: RuntimeError, span: Span },
}

impl EvalError {
    pub fn runtime_error(&self) -> Option<&RuntimeError> {
        match self {
            EvalError::Runtime { error, .. } => Some(error),
            _ => None,
        }
    }
}
