use core::fmt;

use crate::api::FieldDescriptor;
use crate::parser::{BoolOp, Operator, Span};
use crate::registry::{BinaryFn, UnaryFn};
use crate::types::Type;
use crate::values::Value;

/// A resolved expression node. The type is fixed when the node is built.
#[derive(Debug, Clone)]
pub struct TypedExpr {
    pub ty: Type,
    pub inner: ExprInner,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ExprInner {
    Literal(Value),
    Field {
        name: String,
        descriptor: FieldDescriptor,
    },
    Unary {
        op: Operator,
        func: UnaryFn,
        operand: Box<TypedExpr>,
    },
    Binary {
        op: Operator,
        func: BinaryFn,
        left: Box<TypedExpr>,
        right: Box<TypedExpr>,
    },
    Logical {
        op: BoolOp,
        left: Box<TypedExpr>,
        right: Box<TypedExpr>,
    },
    List(Vec<TypedExpr>),
    /// Compiler-inserted conversion to `ty`.
    ImplicitCast {
        func: UnaryFn,
        inner: Box<TypedExpr>,
    },
}

impl TypedExpr {
    pub fn new(ty: Type, inner: ExprInner, span: Span) -> Self {
        Self { ty, inner, span }
    }

    pub fn literal(value: Value, ty: Type, span: Span) -> Self {
        Self::new(ty, ExprInner::Literal(value), span)
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match &self.inner {
            ExprInner::Literal(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool_literal(&self) -> Option<bool> {
        self.as_literal().and_then(Value::as_bool)
    }

    pub fn is_field(&self) -> bool {
        matches!(self.inner, ExprInner::Field { .. })
    }

    /// Whether any field is referenced below this node.
    pub fn references_fields(&self) -> bool {
        match &self.inner {
            ExprInner::Literal(_) => false,
            ExprInner::Field { .. } => true,
            ExprInner::Unary { operand, .. } => operand.references_fields(),
            ExprInner::ImplicitCast { inner, .. } => inner.references_fields(),
            ExprInner::Binary { left, right, .. } | ExprInner::Logical { left, right, .. } => {
                left.references_fields() || right.references_fields()
            }
            ExprInner::List(elements) => elements.iter().any(TypedExpr::references_fields),
        }
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        1 + match &self.inner {
            ExprInner::Literal(_) | ExprInner::Field { .. } => 0,
            ExprInner::Unary { operand, .. } => operand.node_count(),
            ExprInner::ImplicitCast { inner, .. } => inner.node_count(),
            ExprInner::Binary { left, right, .. } | ExprInner::Logical { left, right, .. } => {
                left.node_count() + right.node_count()
            }
            ExprInner::List(elements) => elements.iter().map(TypedExpr::node_count).sum(),
        }
    }
}

// S-expression form; implicit casts show their target type, e.g.
// `(== (as float port) 80.5)`.
impl fmt::Display for TypedExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            ExprInner::Literal(value) => write!(f, "{}", value),
            ExprInner::Field { name, .. } => f.write_str(name),
            ExprInner::Unary { op, operand, .. } => write!(f, "({} {})", op, operand),
            ExprInner::Binary {
                op, left, right, ..
            } => write!(f, "({} {} {})", op, left, right),
            ExprInner::Logical { op, left, right } => write!(f, "({} {} {})", op, left, right),
            ExprInner::List(elements) => {
                f.write_str("[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                f.write_str("]")
            }
            ExprInner::ImplicitCast { inner, .. } => write!(f, "(as {} {})", self.ty, inner),
        }
    }
}
