//! Type resolution: untyped `Expr` → `TypedExpr`.
//!
//! Resolution is bottom-up. Identifiers are resolved through the field and
//! constant lookups, operators through the registry, with at most one
//! implicit widening per operand. Errors are accumulated; a node whose
//! child failed is dropped silently so each problem is reported once.

use crate::analyzer::typed_expr::{ExprInner, TypedExpr};
use crate::analyzer::{TypeError, TypeErrorKind};
use crate::api::{Constant, FieldDescriptor};
use crate::parser::{BoolOp, Expr, ExprKind, Literal, Operator, Span, UnaryOp};
use crate::registry::{BinaryOperation, Cast, Registry, UnaryOperation};
use crate::types::{ScalarType, Type};
use crate::values::Value;

/// Name resolution for identifiers appearing in a filter.
pub trait Lookup {
    fn field(&self, name: &str) -> Option<FieldDescriptor>;
    fn constant(&self, name: &str) -> Option<Constant>;
}

/// Resolve `expr` and coerce its result to bool.
pub fn analyze(
    expr: &Expr,
    lookup: &dyn Lookup,
    registry: &Registry,
) -> Result<TypedExpr, Vec<TypeError>> {
    let mut analyzer = Analyzer {
        lookup,
        registry,
        errors: Vec::new(),
    };
    let typed = analyzer
        .resolve(expr)
        .and_then(|typed| analyzer.coerce_bool(typed, "as filter result"));

    tracing::debug!(errors = analyzer.errors.len(), "Type resolution finished");
    match typed {
        Some(typed) if analyzer.errors.is_empty() => Ok(typed),
        _ => Err(analyzer.errors),
    }
}

struct Analyzer<'a> {
    lookup: &'a dyn Lookup,
    registry: &'a Registry,
    errors: Vec<TypeError>,
}

/// One way of making a binary operation applicable.
struct Candidate {
    left: Option<Cast>,
    right: Option<Cast>,
    operation: BinaryOperation,
}

impl<'a> Analyzer<'a> {
    fn resolve(&mut self, expr: &Expr) -> Option<TypedExpr> {
        let span = expr.span.clone();
        match &expr.kind {
            ExprKind::Literal(literal) => {
                let ty = Type::Scalar(literal_type(literal));
                Some(TypedExpr::literal(Value::from(literal.clone()), ty, span))
            }
            ExprKind::Ident(name) => {
                let field = self.lookup.field(name);
                self.resolve_ident(name, field, &span, false)
            }
            ExprKind::Unary {
                op: UnaryOp::Neg,
                expr: operand,
            } => {
                let operand = self.resolve(operand)?;
                self.bind_unary(Operator::Neg, operand, span)
            }
            ExprKind::Unary {
                op: UnaryOp::Not,
                expr: operand,
            } => {
                let operand = self.resolve(operand)?;
                let operand = self.coerce_bool(operand, "as operand of 'not'")?;
                self.bind_unary(Operator::Not, operand, span)
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.resolve(left);
                let right = self.resolve(right);
                self.bind_binary(Operator::from(*op), left?, right?, span)
            }
            ExprKind::Comparison { op, left, right } => {
                let left_field = self.field_of(left);
                let right_field = self.field_of(right);
                let resolved_left = self.resolve_operand(left, left_field, right_field.is_some());
                let resolved_right = self.resolve_operand(right, right_field, left_field.is_some());
                self.bind_binary(Operator::from(*op), resolved_left?, resolved_right?, span)
            }
            ExprKind::Boolean { op, left, right } => {
                let context = match op {
                    BoolOp::And => "as operand of 'and'",
                    BoolOp::Or => "as operand of 'or'",
                };
                let left = self
                    .resolve(left)
                    .and_then(|left| self.coerce_bool(left, context));
                let right = self
                    .resolve(right)
                    .and_then(|right| self.coerce_bool(right, context));
                Some(TypedExpr::new(
                    Type::BOOL,
                    ExprInner::Logical {
                        op: *op,
                        left: Box::new(left?),
                        right: Box::new(right?),
                    },
                    span,
                ))
            }
            ExprKind::List(elements) => self.resolve_list(elements, span),
        }
    }

    /// Comparison operands: an unresolvable identifier compared against a
    /// field is reported as an unknown constant rather than an unknown field.
    fn resolve_operand(
        &mut self,
        expr: &Expr,
        field: Option<FieldDescriptor>,
        sibling_is_field: bool,
    ) -> Option<TypedExpr> {
        match &expr.kind {
            ExprKind::Ident(name) => self.resolve_ident(name, field, &expr.span, sibling_is_field),
            _ => self.resolve(expr),
        }
    }

    /// The field an identifier operand names, looked up once per comparison.
    fn field_of(&self, expr: &Expr) -> Option<FieldDescriptor> {
        expr.as_ident().and_then(|name| self.lookup.field(name))
    }

    /// `field` is the result of looking `name` up as a field.
    fn resolve_ident(
        &mut self,
        name: &str,
        field: Option<FieldDescriptor>,
        span: &Span,
        constant_expected: bool,
    ) -> Option<TypedExpr> {
        if let Some(descriptor) = field {
            return Some(TypedExpr::new(
                descriptor.ty,
                ExprInner::Field {
                    name: name.to_string(),
                    descriptor,
                },
                span.clone(),
            ));
        }

        if let Some(Constant { value, ty }) = self.lookup.constant(name) {
            if !value.conforms_to(ty) {
                self.error(
                    TypeErrorKind::ConstantTypeMismatch {
                        name: name.to_string(),
                        declared: ty,
                    },
                    span.clone(),
                );
                return None;
            }
            return Some(TypedExpr::literal(value, ty, span.clone()));
        }

        let name = name.to_string();
        let kind = if constant_expected {
            TypeErrorKind::UnknownConstant { name }
        } else {
            TypeErrorKind::UnknownField { name }
        };
        self.error(kind, span.clone());
        None
    }

    fn bind_unary(&mut self, op: Operator, operand: TypedExpr, span: Span) -> Option<TypedExpr> {
        let registry = self.registry;
        if let Some(operation) = registry.unary(op, operand.ty) {
            return Some(unary_node(*operation, operand, span));
        }

        let candidates: Vec<(Cast, UnaryOperation)> = registry
            .widenings(operand.ty)
            .filter_map(|cast| registry.unary(op, cast.to).map(|u| (*cast, *u)))
            .collect();
        match candidates.as_slice() {
            [] => {
                self.error(
                    TypeErrorKind::NoOperation {
                        op: op.symbol().to_string(),
                        operands: vec![operand.ty],
                    },
                    span,
                );
                None
            }
            [(cast, operation)] => {
                let operand = self.cast(operand, cast);
                Some(unary_node(*operation, operand, span))
            }
            _ => {
                self.error(
                    TypeErrorKind::CastAmbiguity {
                        op: op.symbol().to_string(),
                        operands: vec![operand.ty],
                        candidates: candidates
                            .iter()
                            .map(|(_, u)| format!("{} {}", op, u.operand))
                            .collect(),
                    },
                    span,
                );
                None
            }
        }
    }

    fn bind_binary(
        &mut self,
        op: Operator,
        left: TypedExpr,
        right: TypedExpr,
        span: Span,
    ) -> Option<TypedExpr> {
        let registry = self.registry;
        if let Some(operation) = registry.binary(op, left.ty, right.ty) {
            return Some(binary_node(*operation, left, right, span));
        }

        // One widening on either side.
        let mut candidates = Vec::new();
        for cast in registry.widenings(left.ty) {
            if let Some(operation) = registry.binary(op, cast.to, right.ty) {
                candidates.push(Candidate {
                    left: Some(*cast),
                    right: None,
                    operation: *operation,
                });
            }
        }
        for cast in registry.widenings(right.ty) {
            if let Some(operation) = registry.binary(op, left.ty, cast.to) {
                candidates.push(Candidate {
                    left: None,
                    right: Some(*cast),
                    operation: *operation,
                });
            }
        }

        // One widening on each side.
        if candidates.is_empty() {
            for left_cast in registry.widenings(left.ty) {
                for right_cast in registry.widenings(right.ty) {
                    if let Some(operation) = registry.binary(op, left_cast.to, right_cast.to) {
                        candidates.push(Candidate {
                            left: Some(*left_cast),
                            right: Some(*right_cast),
                            operation: *operation,
                        });
                    }
                }
            }
        }

        let operands = vec![left.ty, right.ty];
        match candidates.len() {
            0 => {
                self.error(
                    TypeErrorKind::NoOperation {
                        op: op.symbol().to_string(),
                        operands,
                    },
                    span,
                );
                None
            }
            1 => {
                let Candidate {
                    left: left_cast,
                    right: right_cast,
                    operation,
                } = candidates.remove(0);
                let left = match left_cast {
                    Some(cast) => self.cast(left, &cast),
                    None => left,
                };
                let right = match right_cast {
                    Some(cast) => self.cast(right, &cast),
                    None => right,
                };
                Some(binary_node(operation, left, right, span))
            }
            _ => {
                let candidates = candidates
                    .iter()
                    .map(|c| format!("{} {} {}", c.operation.left, op, c.operation.right))
                    .collect();
                self.error(
                    TypeErrorKind::CastAmbiguity {
                        op: op.symbol().to_string(),
                        operands,
                        candidates,
                    },
                    span,
                );
                None
            }
        }
    }

    fn resolve_list(&mut self, elements: &[Expr], span: Span) -> Option<TypedExpr> {
        if elements.is_empty() {
            self.error(TypeErrorKind::EmptyList, span);
            return None;
        }

        let mut resolved = Vec::with_capacity(elements.len());
        let mut failed = false;
        for element in elements {
            match self.resolve(element) {
                Some(typed) if typed.ty.is_list() => {
                    self.error(TypeErrorKind::NestedList, typed.span.clone());
                    failed = true;
                }
                Some(typed) => resolved.push(typed),
                None => failed = true,
            }
        }
        if failed {
            return None;
        }

        let target = self.common_element_type(&resolved, &span)?;
        let registry = self.registry;
        let mut unified = Vec::with_capacity(resolved.len());
        for element in resolved {
            if element.ty == target {
                unified.push(element);
                continue;
            }
            match registry.widenings(element.ty).find(|c| c.to == target) {
                Some(cast) => unified.push(self.cast(element, cast)),
                None => {
                    self.error(
                        TypeErrorKind::ListHeterogeneity {
                            expected: target,
                            found: element.ty,
                        },
                        element.span.clone(),
                    );
                    return None;
                }
            }
        }

        Some(TypedExpr::new(
            Type::List(target.element()),
            ExprInner::List(unified),
            span,
        ))
    }

    /// The element type every other element widens to.
    fn common_element_type(&mut self, elements: &[TypedExpr], span: &Span) -> Option<Type> {
        let mut distinct: Vec<Type> = Vec::new();
        for element in elements {
            if !distinct.contains(&element.ty) {
                distinct.push(element.ty);
            }
        }
        if let [only] = distinct.as_slice() {
            return Some(*only);
        }

        let registry = self.registry;
        let targets: Vec<Type> = distinct
            .iter()
            .copied()
            .filter(|&target| {
                distinct
                    .iter()
                    .all(|&ty| ty == target || registry.widenings(ty).any(|c| c.to == target))
            })
            .collect();

        match targets.as_slice() {
            [target] => Some(*target),
            [] => {
                let first = distinct[0];
                let offending = elements.iter().find(|e| e.ty != first);
                let (found, at) = match offending {
                    Some(e) => (e.ty, e.span.clone()),
                    None => (first, span.clone()),
                };
                self.error(
                    TypeErrorKind::ListHeterogeneity {
                        expected: first,
                        found,
                    },
                    at,
                );
                None
            }
            _ => {
                self.error(
                    TypeErrorKind::CastAmbiguity {
                        op: "list".to_string(),
                        operands: distinct,
                        candidates: targets.iter().map(|t| format!("list<{}>", t)).collect(),
                    },
                    span.clone(),
                );
                None
            }
        }
    }

    fn coerce_bool(&mut self, expr: TypedExpr, context: &'static str) -> Option<TypedExpr> {
        if expr.ty == Type::BOOL {
            return Some(expr);
        }
        let registry = self.registry;
        match registry.truthiness(expr.ty) {
            Some(cast) => Some(self.cast(expr, cast)),
            None => {
                self.error(
                    TypeErrorKind::NotBoolean {
                        found: expr.ty,
                        context,
                    },
                    expr.span.clone(),
                );
                None
            }
        }
    }

    fn cast(&self, expr: TypedExpr, cast: &Cast) -> TypedExpr {
        tracing::trace!(from = %cast.from, to = %cast.to, kind = ?cast.kind, "Inserting implicit cast");
        let span = expr.span.clone();
        TypedExpr::new(
            cast.to,
            ExprInner::ImplicitCast {
                func: cast.func,
                inner: Box::new(expr),
            },
            span,
        )
    }

    fn error(&mut self, kind: TypeErrorKind, span: Span) {
        self.errors.push(TypeError::new(kind, span));
    }
}

fn unary_node(operation: UnaryOperation, operand: TypedExpr, span: Span) -> TypedExpr {
    TypedExpr::new(
        operation.result,
        ExprInner::Unary {
            op: operation.op,
            func: operation.func,
            operand: Box::new(operand),
        },
        span,
    )
}

fn binary_node(
    operation: BinaryOperation,
    left: TypedExpr,
    right: TypedExpr,
    span: Span,
) -> TypedExpr {
    TypedExpr::new(
        operation.result,
        ExprInner::Binary {
            op: operation.op,
            func: operation.func,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    )
}

fn literal_type(literal: &Literal) -> ScalarType {
    match literal {
        Literal::Bool(_) => ScalarType::Bool,
        Literal::Int(_) => ScalarType::Int,
        Literal::UInt(_) => ScalarType::UInt,
        Literal::Float(_) => ScalarType::Float,
        Literal::Str(_) => ScalarType::Str,
        Literal::Ip(_) => ScalarType::IpAddr,
        Literal::Mac(_) => ScalarType::MacAddr,
    }
}
