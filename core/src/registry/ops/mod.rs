//! Built-in operation tables, one module per scalar type.
//!
//! Each module exposes a static `OPERATIONS` slice covering its operators,
//! its list membership test, its conversions and the truthiness of both the
//! scalar and the list form.

use crate::evaluator::RuntimeError;
use crate::registry::OperationDef;
use crate::values::Value;

/// Defines a `BinaryFn` over two value variants. Any other operand shape is
/// reported as `RuntimeError::OperandMismatch`.
macro_rules! binary_fn {
    ($name:ident, $op:expr, |$a:ident: $l:ident, $b:ident: $r:ident| $body:expr) => {
        fn $name(
            left: &crate::values::Value,
            right: &crate::values::Value,
        ) -> Result<crate::values::Value, crate::evaluator::RuntimeError> {
            match (left, right) {
                (crate::values::Value::$l($a), crate::values::Value::$r($b)) => $body,
                _ => Err(crate::registry::ops::operand_mismatch($op, &[left, right])),
            }
        }
    };
}

/// Defines a `UnaryFn` over one value variant.
macro_rules! unary_fn {
    ($name:ident, $op:expr, |$a:ident: $v:ident| $body:expr) => {
        fn $name(
            value: &crate::values::Value,
        ) -> Result<crate::values::Value, crate::evaluator::RuntimeError> {
            match value {
                crate::values::Value::$v($a) => $body,
                _ => Err(crate::registry::ops::operand_mismatch($op, &[value])),
            }
        }
    };
}

/// Defines the six ordering comparisons for a pair of variants, given an
/// expression producing a `core::cmp::Ordering`.
macro_rules! ordering_fns {
    (
        [$eq:ident, $ne:ident, $lt:ident, $gt:ident, $le:ident, $ge:ident],
        |$a:ident: $l:ident, $b:ident: $r:ident| $cmp:expr
    ) => {
        binary_fn!($eq, "==", |$a: $l, $b: $r| Ok(crate::values::Value::Bool($cmp.is_eq())));
        binary_fn!($ne, "!=", |$a: $l, $b: $r| Ok(crate::values::Value::Bool($cmp.is_ne())));
        binary_fn!($lt, "<", |$a: $l, $b: $r| Ok(crate::values::Value::Bool($cmp.is_lt())));
        binary_fn!($gt, ">", |$a: $l, $b: $r| Ok(crate::values::Value::Bool($cmp.is_gt())));
        binary_fn!($le, "<=", |$a: $l, $b: $r| Ok(crate::values::Value::Bool($cmp.is_le())));
        binary_fn!($ge, ">=", |$a: $l, $b: $r| Ok(crate::values::Value::Bool($cmp.is_ge())));
    };
}

pub mod boolean;
pub mod float;
pub mod int;
pub mod ip;
pub mod mac;
pub mod string;
pub mod uint;

/// Tables making up `Registry::standard()`, in registration order.
pub static STANDARD_TABLES: &[&[OperationDef]] = &[
    int::OPERATIONS,
    uint::OPERATIONS,
    float::OPERATIONS,
    boolean::OPERATIONS,
    string::OPERATIONS,
    ip::OPERATIONS,
    mac::OPERATIONS,
];

/// Tolerance of float equality and float list membership.
pub const FLOAT_EPSILON: f64 = 0.001;

pub(crate) fn operand_mismatch(op: &'static str, operands: &[&Value]) -> RuntimeError {
    let operands = operands
        .iter()
        .map(|v| match v.ty() {
            Some(ty) => ty.to_string(),
            None => "list".to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ");
    RuntimeError::OperandMismatch { op, operands }
}

/// Membership of `needle` in `items` under `eq`.
pub(crate) fn list_contains(
    items: &[Value],
    mut eq: impl FnMut(&Value) -> bool,
) -> Result<Value, RuntimeError> {
    Ok(Value::Bool(items.iter().any(|item| eq(item))))
}

/// Applies an element conversion to every element of a list.
pub(crate) fn map_list(
    items: &[Value],
    convert: fn(&Value) -> Result<Value, RuntimeError>,
) -> Result<Value, RuntimeError> {
    items
        .iter()
        .map(convert)
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
}

pub(crate) fn non_empty_list(value: &Value) -> Result<Value, RuntimeError> {
    match value {
        Value::List(items) => Ok(Value::Bool(!items.is_empty())),
        _ => Err(operand_mismatch("truthiness", &[value])),
    }
}
