use crate::analyzer::{ExprInner, TypedExpr};
use crate::api::FieldDescriptor;
use crate::compiler::CompileError;
use crate::parser::{BoolOp, Span};
use crate::registry::{BinaryFn, UnaryFn};
use crate::types::Type;
use crate::values::Value;

/// Node of the evaluation tree walked once per record.
#[derive(Debug, Clone)]
pub enum EvalNode {
    Literal(Value),
    Field {
        descriptor: FieldDescriptor,
        name: String,
    },
    /// Unary operator or conversion.
    Unary {
        func: UnaryFn,
        child: Box<EvalNode>,
        yields_bool: bool,
        span: Span,
    },
    Binary {
        func: BinaryFn,
        left: Box<EvalNode>,
        right: Box<EvalNode>,
        yields_bool: bool,
        span: Span,
    },
    And {
        left: Box<EvalNode>,
        right: Box<EvalNode>,
        span: Span,
    },
    Or {
        left: Box<EvalNode>,
        right: Box<EvalNode>,
        span: Span,
    },
    List(Vec<EvalNode>),
}

impl EvalNode {
    pub fn node_count(&self) -> usize {
        1 + match self {
            EvalNode::Literal(_) | EvalNode::Field { .. } => 0,
            EvalNode::Unary { child, .. } => child.node_count(),
            EvalNode::Binary { left, right, .. }
            | EvalNode::And { left, right, .. }
            | EvalNode::Or { left, right, .. } => left.node_count() + right.node_count(),
            EvalNode::List(children) => children.iter().map(EvalNode::node_count).sum(),
        }
    }
}

/// Lowers a resolved (and possibly folded) expression.
pub fn lower(expr: &TypedExpr) -> Result<EvalNode, CompileError> {
    let yields_bool = expr.ty == Type::BOOL;
    let node = match &expr.inner {
        ExprInner::Literal(value) => EvalNode::Literal(value.clone()),
        ExprInner::Field { name, descriptor } => EvalNode::Field {
            descriptor: *descriptor,
            name: name.clone(),
        },
        ExprInner::Unary { func, operand, .. } => EvalNode::Unary {
            func: *func,
            child: Box::new(lower(operand)?),
            yields_bool,
            span: expr.span.clone(),
        },
        ExprInner::ImplicitCast { func, inner } => EvalNode::Unary {
            func: *func,
            child: Box::new(lower(inner)?),
            yields_bool,
            span: expr.span.clone(),
        },
        ExprInner::Binary {
            func, left, right, ..
        } => EvalNode::Binary {
            func: *func,
            left: Box::new(lower(left)?),
            right: Box::new(lower(right)?),
            yields_bool,
            span: expr.span.clone(),
        },
        ExprInner::Logical { op, left, right } => {
            let left = Box::new(lower(left)?);
            let right = Box::new(lower(right)?);
            let span = expr.span.clone();
            match op {
                BoolOp::And => EvalNode::And { left, right, span },
                BoolOp::Or => EvalNode::Or { left, right, span },
            }
        }
        ExprInner::List(elements) => {
            let mut children = Vec::new();
            children
                .try_reserve_exact(elements.len())
                .map_err(|_| CompileError::Allocation {
                    requested: elements.len(),
                })?;
            for element in elements {
                children.push(lower(element)?);
            }
            EvalNode::List(children)
        }
    };
    Ok(node)
}
