//! Eval-tree construction errors.

use crate::api::{Diagnostic, ErrorCode};

/// Errors that can occur while building the evaluation tree.
///
/// Type-related errors are caught by the resolver before lowering; what is
/// left is running out of memory on very large filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Reserving room for `requested` child nodes failed.
    Allocation { requested: usize },
}

impl core::fmt::Display for CompileError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CompileError::Allocation { requested } => {
                write!(f, "Out of memory reserving {} evaluation nodes", requested)
            }
        }
    }
}

impl std::error::Error for CompileError {}

impl CompileError {
    /// Convert to a Diagnostic for API boundary.
    ///
    /// Allocation failures have no single source location.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(ErrorCode::Allocation, "A001", self.to_string(), None)
    }
}
