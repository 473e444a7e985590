//! Core evaluation logic.

use std::borrow::Cow;

use crate::api::{DataAccessorFn, MissingFieldPolicy};
use crate::compiler::EvalNode;
use crate::evaluator::{EvalError, RuntimeError};
use crate::parser::Span;
use crate::values::Value;

/// Why the walk of a subtree stopped early.
enum Interrupt {
    /// A field was absent under `MissingFieldPolicy::False`; resolved to
    /// `false` by the nearest boolean-producing ancestor.
    Missing,
    Failed(EvalError),
}

type Eval<'n> = Result<Cow<'n, Value>, Interrupt>;

/// Per-call evaluator. Holds no state beyond what one `evaluate` needs;
/// every value it produces lives in its call frames.
pub struct Evaluator<'e, 'cb, C: ?Sized, R: ?Sized> {
    accessor: &'e DataAccessorFn<'cb, C, R>,
    record: &'e R,
    context: &'e C,
    missing_field: MissingFieldPolicy,
}

impl<'e, 'cb, C: ?Sized, R: ?Sized> Evaluator<'e, 'cb, C, R> {
    pub fn new(
        accessor: &'e DataAccessorFn<'cb, C, R>,
        record: &'e R,
        context: &'e C,
        missing_field: MissingFieldPolicy,
    ) -> Self {
        Self {
            accessor,
            record,
            context,
            missing_field,
        }
    }

    /// Evaluate the tree rooted at `root` to a boolean.
    pub fn eval(&self, root: &EvalNode) -> Result<bool, EvalError> {
        match self.truth(root, &Span::new(0, 0)) {
            Ok(result) => Ok(result),
            Err(Interrupt::Missing) => Ok(false),
            Err(Interrupt::Failed(error)) => Err(error),
        }
    }

    fn eval_node<'n>(&self, node: &'n EvalNode) -> Eval<'n> {
        match node {
            EvalNode::Literal(value) => Ok(Cow::Borrowed(value)),
            EvalNode::Field { descriptor, name } => {
                let Some(value) = (self.accessor)(descriptor, self.record, self.context) else {
                    tracing::trace!(field = %name, "Field missing from record");
                    return match self.missing_field {
                        MissingFieldPolicy::Error => {
                            Err(Interrupt::Failed(EvalError::MissingField { name: name.clone() }))
                        }
                        MissingFieldPolicy::False => Err(Interrupt::Missing),
                    };
                };
                if !value.conforms_to(descriptor.ty) {
                    return Err(Interrupt::Failed(EvalError::FieldTypeMismatch {
                        name: name.clone(),
                        expected: descriptor.ty,
                        found: describe(&value),
                    }));
                }
                Ok(Cow::Owned(value))
            }
            EvalNode::Unary {
                func,
                child,
                yields_bool,
                span,
            } => {
                let operand = match self.eval_node(child) {
                    Ok(operand) => operand,
                    Err(interrupt) => return self.settle(interrupt, *yields_bool),
                };
                apply(func(&*operand), span)
            }
            EvalNode::Binary {
                func,
                left,
                right,
                yields_bool,
                span,
            } => {
                let operands = self
                    .eval_node(left)
                    .and_then(|l| self.eval_node(right).map(|r| (l, r)));
                let (left, right) = match operands {
                    Ok(operands) => operands,
                    Err(interrupt) => return self.settle(interrupt, *yields_bool),
                };
                apply(func(&*left, &*right), span)
            }
            EvalNode::And { left, right, span } => {
                let result = self.operand_truth(left, span)? && self.operand_truth(right, span)?;
                Ok(Cow::Owned(Value::Bool(result)))
            }
            EvalNode::Or { left, right, span } => {
                let result = self.operand_truth(left, span)? || self.operand_truth(right, span)?;
                Ok(Cow::Owned(Value::Bool(result)))
            }
            EvalNode::List(children) => {
                let mut items = Vec::with_capacity(children.len());
                for child in children {
                    items.push(self.eval_node(child)?.into_owned());
                }
                Ok(Cow::Owned(Value::List(items)))
            }
        }
    }

    /// Operand of a logical connective; an absent field counts as `false`.
    fn operand_truth(&self, node: &EvalNode, span: &Span) -> Result<bool, Interrupt> {
        match self.truth(node, span) {
            Err(Interrupt::Missing) => Ok(false),
            other => other,
        }
    }

    fn truth(&self, node: &EvalNode, span: &Span) -> Result<bool, Interrupt> {
        let value = self.eval_node(node)?;
        value.as_bool().ok_or_else(|| {
            Interrupt::Failed(EvalError::Runtime {
                error: RuntimeError::OperandMismatch {
                    op: "bool",
                    operands: describe(&value),
                },
                span: span.clone(),
            })
        })
    }

    /// An operation whose operand was interrupted: boolean-producing
    /// operations absorb a missing field as `false`.
    fn settle<'n>(&self, interrupt: Interrupt, yields_bool: bool) -> Eval<'n> {
        match interrupt {
            Interrupt::Missing if yields_bool => Ok(Cow::Owned(Value::Bool(false))),
            other => Err(other),
        }
    }
}

fn apply<'n>(result: Result<Value, RuntimeError>, span: &Span) -> Eval<'n> {
    result.map(Cow::Owned).map_err(|error| {
        Interrupt::Failed(EvalError::Runtime {
            error,
            span: span.clone(),
        })
    })
}

fn describe(value: &Value) -> String {
    match value.ty() {
        Some(ty) => ty.to_string(),
        None => "empty list".to_string(),
    }
}
