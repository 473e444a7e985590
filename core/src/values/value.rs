use core::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::syntax::string_literal::{QuoteStyle, escape_string};
use crate::types::{ScalarType, Type};
use crate::values::{IpPrefix, MacAddr};

/// A runtime value. Exactly one variant is live at a time.
///
/// Heap-owning variants (`Str`, `List`) are released by `Drop`; values
/// produced during an evaluation are owned by that evaluation's call frames.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    IpAddr(IpPrefix),
    MacAddr(MacAddr),
    /// Homogeneous list of scalars.
    List(Vec<Value>),
}

impl Value {
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            Value::Bool(_) => Some(ScalarType::Bool),
            Value::Int(_) => Some(ScalarType::Int),
            Value::UInt(_) => Some(ScalarType::UInt),
            Value::Float(_) => Some(ScalarType::Float),
            Value::Str(_) => Some(ScalarType::Str),
            Value::IpAddr(_) => Some(ScalarType::IpAddr),
            Value::MacAddr(_) => Some(ScalarType::MacAddr),
            Value::List(_) => None,
        }
    }

    /// The type of this value, or `None` for an empty list (whose element
    /// type cannot be recovered from the value alone).
    pub fn ty(&self) -> Option<Type> {
        match self {
            Value::List(items) => items
                .first()
                .and_then(Value::scalar_type)
                .map(Type::List),
            scalar => scalar.scalar_type().map(Type::Scalar),
        }
    }

    /// Whether this value may stand for `ty`: same scalar type, or a list
    /// whose elements all have the element type.
    pub fn conforms_to(&self, ty: Type) -> bool {
        match (self, ty) {
            (Value::List(items), Type::List(element)) => items
                .iter()
                .all(|item| item.scalar_type() == Some(element)),
            (Value::List(_), Type::Scalar(_)) => false,
            (scalar, Type::Scalar(s)) => scalar.scalar_type() == Some(s),
            (_, Type::List(_)) => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::UInt(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Parses a single literal using the filter scanner, e.g. `80u`,
    /// `"http"`, `10.0.0.0/8` or `[1, 2, 3]`.
    pub fn parse_literal(text: &str) -> Result<Value, crate::parser::ParseError> {
        crate::parser::parse_literal(text)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::UInt(u) => write!(f, "{}u", u),
            Value::Float(x) => format_float(f, *x),
            Value::Str(s) => escape_string(f, s, QuoteStyle::PreferDouble),
            Value::IpAddr(ip) => write!(f, "{}", ip),
            Value::MacAddr(mac) => write!(f, "{}", mac),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

fn format_float(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_nan() {
        write!(f, "nan")
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            write!(f, "inf")
        } else {
            write!(f, "-inf")
        }
    } else {
        let s = value.to_string();
        if s.contains('.') || s.contains('e') || s.contains('E') {
            write!(f, "{}", s)
        } else {
            write!(f, "{}.0", s)
        }
    }
}
