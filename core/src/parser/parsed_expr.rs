use core::fmt;

use crate::parser::{BinaryOp, BoolOp, ComparisonOp, Span, UnaryOp};
use crate::values::{IpPrefix, MacAddr, Value};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Untyped syntax tree node produced by the parser.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Boolean {
        op: BoolOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Comparison {
        op: ComparisonOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    List(Vec<Expr>),
    Literal(Literal),
    Ident(String),
}

#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Ip(IpPrefix),
    Mac(MacAddr),
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn literal(literal: Literal, span: Span) -> Self {
        Self::new(ExprKind::Literal(literal), span)
    }

    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Bool(b) => Value::Bool(b),
            Literal::Int(i) => Value::Int(i),
            Literal::UInt(u) => Value::UInt(u),
            Literal::Float(f) => Value::Float(f),
            Literal::Str(s) => Value::Str(s),
            Literal::Ip(ip) => Value::IpAddr(ip),
            Literal::Mac(mac) => Value::MacAddr(mac),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::parser::Operator::from(*self).fmt(f)
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::parser::Operator::from(*self).fmt(f)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::parser::Operator::from(*self).fmt(f)
    }
}

// S-expression form, e.g. `(and (== port 80) (in proto [6, 17]))`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Binary { op, left, right } => write!(f, "({} {} {})", op, left, right),
            ExprKind::Boolean { op, left, right } => write!(f, "({} {} {})", op, left, right),
            ExprKind::Comparison { op, left, right } => {
                write!(f, "({} {} {})", op, left, right)
            }
            ExprKind::Unary { op, expr } => write!(f, "({} {})", op, expr),
            ExprKind::List(elements) => {
                f.write_str("[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                f.write_str("]")
            }
            ExprKind::Literal(literal) => write!(f, "{}", Value::from(literal.clone())),
            ExprKind::Ident(name) => f.write_str(name),
        }
    }
}
