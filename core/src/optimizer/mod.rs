//! Constant folding over the typed AST.
//!
//! Subtrees that reference no field are evaluated once, at compile time,
//! through the operations they were bound to and replaced by a literal of
//! the same type. Logical connectives with a constant operand are reduced
//! without looking at the other side:
//!
//! - `false and X` → `false`, `true or X` → `true`
//! - `true and X` → `X`, `false or X` → `X`
//!
//! with the constant on either side.

#[cfg(test)]
mod optimizer_test;

use core::fmt;

use crate::analyzer::{ExprInner, TypedExpr};
use crate::api::{Diagnostic, ErrorCode};
use crate::evaluator::RuntimeError;
use crate::parser::{BoolOp, Span};
use crate::types::Type;
use crate::values::Value;

/// A constant subtree whose operation failed, e.g. `1 / 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct FoldError {
    pub error: RuntimeError,
    pub span: Span,
}

impl FoldError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(
            ErrorCode::Evaluation,
            "E010",
            format!("Constant expression cannot be evaluated: {}", self.error),
            Some(self.span.clone()),
        )
    }
}

impl fmt::Display for FoldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_diagnostic())
    }
}

impl std::error::Error for FoldError {}

/// Folds `expr` bottom-up. Every failing constant subtree is reported.
pub fn optimize(expr: TypedExpr) -> Result<TypedExpr, Vec<FoldError>> {
    let before = expr.node_count();
    let mut folder = Folder { errors: Vec::new() };
    let folded = folder.fold(expr);
    tracing::debug!(
        before,
        after = folded.node_count(),
        errors = folder.errors.len(),
        "Constant folding finished"
    );
    if folder.errors.is_empty() {
        Ok(folded)
    } else {
        Err(folder.errors)
    }
}

struct Folder {
    errors: Vec<FoldError>,
}

impl Folder {
    fn fold(&mut self, expr: TypedExpr) -> TypedExpr {
        let TypedExpr { ty, inner, span } = expr;
        match inner {
            ExprInner::Literal(_) | ExprInner::Field { .. } => TypedExpr::new(ty, inner, span),
            ExprInner::Unary { op, func, operand } => {
                let operand = self.fold(*operand);
                let folded = operand.as_literal().map(func);
                self.settle(folded, ty, span, || ExprInner::Unary {
                    op,
                    func,
                    operand: Box::new(operand),
                })
            }
            ExprInner::ImplicitCast { func, inner } => {
                let inner = self.fold(*inner);
                let folded = inner.as_literal().map(func);
                self.settle(folded, ty, span, || ExprInner::ImplicitCast {
                    func,
                    inner: Box::new(inner),
                })
            }
            ExprInner::Binary {
                op,
                func,
                left,
                right,
            } => {
                let left = self.fold(*left);
                let right = self.fold(*right);
                let folded = match (left.as_literal(), right.as_literal()) {
                    (Some(l), Some(r)) => Some(func(l, r)),
                    _ => None,
                };
                self.settle(folded, ty, span, || ExprInner::Binary {
                    op,
                    func,
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
            ExprInner::Logical { op, left, right } => {
                let absorbing = matches!(op, BoolOp::Or);
                let mark = self.errors.len();
                let left = self.fold(*left);
                if left.as_bool_literal() == Some(absorbing) {
                    return TypedExpr::literal(Value::Bool(absorbing), Type::BOOL, span);
                }
                let right = self.fold(*right);
                if right.as_bool_literal() == Some(absorbing) {
                    // The left side is dropped along with what failed in it.
                    self.errors.truncate(mark);
                }
                simplify_logical(op, left, right, span)
            }
            ExprInner::List(elements) => {
                let elements: Vec<TypedExpr> =
                    elements.into_iter().map(|e| self.fold(e)).collect();
                let values: Option<Vec<Value>> = elements
                    .iter()
                    .map(|e| e.as_literal().cloned())
                    .collect();
                match values {
                    Some(values) => TypedExpr::literal(Value::List(values), ty, span),
                    None => TypedExpr::new(ty, ExprInner::List(elements), span),
                }
            }
        }
    }

    /// Replaces the node by the folded value, or keeps it when it could
    /// not be folded. A failed fold is recorded and the node kept.
    fn settle(
        &mut self,
        folded: Option<Result<Value, RuntimeError>>,
        ty: Type,
        span: Span,
        rebuild: impl FnOnce() -> ExprInner,
    ) -> TypedExpr {
        match folded {
            Some(Ok(value)) => TypedExpr::literal(value, ty, span),
            Some(Err(error)) => {
                tracing::debug!(%error, "Constant subtree failed to fold");
                self.errors.push(FoldError {
                    error,
                    span: span.clone(),
                });
                TypedExpr::new(ty, rebuild(), span)
            }
            None => TypedExpr::new(ty, rebuild(), span),
        }
    }
}

fn simplify_logical(op: BoolOp, left: TypedExpr, right: TypedExpr, span: Span) -> TypedExpr {
    let absorbing = matches!(op, BoolOp::Or);
    match (left.as_bool_literal(), right.as_bool_literal()) {
        (Some(value), _) | (_, Some(value)) if value == absorbing => {
            TypedExpr::literal(Value::Bool(absorbing), Type::BOOL, span)
        }
        // The constant side is the identity element; the other side remains.
        (Some(_), _) => right,
        (_, Some(_)) => left,
        (None, None) => TypedExpr::new(
            Type::BOOL,
            ExprInner::Logical {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        ),
    }
}
