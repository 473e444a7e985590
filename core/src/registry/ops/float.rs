//! Floating-point operations.
//!
//! Equality is approximate: two floats are equal when they differ by less
//! than `FLOAT_EPSILON`. Ordering comparisons are plain IEEE comparisons, so
//! `a <= b` may be false while `a == b` is true.

use crate::parser::Operator;
use crate::registry::OperationDef;
use crate::registry::ops::{FLOAT_EPSILON, list_contains, non_empty_list};
use crate::types::{ScalarType, Type};
use crate::values::Value;

const LIST: Type = Type::list_of(ScalarType::Float);

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < FLOAT_EPSILON
}

binary_fn!(add, "+", |a: Float, b: Float| Ok(Value::Float(a + b)));
binary_fn!(sub, "-", |a: Float, b: Float| Ok(Value::Float(a - b)));
binary_fn!(mul, "*", |a: Float, b: Float| Ok(Value::Float(a * b)));
binary_fn!(div, "/", |a: Float, b: Float| Ok(Value::Float(a / b)));
unary_fn!(neg, "-", |a: Float| Ok(Value::Float(-a)));

binary_fn!(eq, "==", |a: Float, b: Float| Ok(Value::Bool(approx_eq(*a, *b))));
binary_fn!(ne, "!=", |a: Float, b: Float| Ok(Value::Bool(!approx_eq(*a, *b))));
binary_fn!(lt, "<", |a: Float, b: Float| Ok(Value::Bool(a < b)));
binary_fn!(gt, ">", |a: Float, b: Float| Ok(Value::Bool(a > b)));
binary_fn!(le, "<=", |a: Float, b: Float| Ok(Value::Bool(a <= b)));
binary_fn!(ge, ">=", |a: Float, b: Float| Ok(Value::Bool(a >= b)));

/// Membership matches with the same tolerance as `==`, not exactly.
binary_fn!(in_list, "in", |a: Float, items: List| list_contains(items, |item| {
    matches!(item, Value::Float(b) if approx_eq(*a, *b))
}));

unary_fn!(truthy, "truthiness", |a: Float| Ok(Value::Bool(*a != 0.0)));

pub static OPERATIONS: &[OperationDef] = &[
    OperationDef::binary(Operator::Add, Type::FLOAT, Type::FLOAT, Type::FLOAT, add),
    OperationDef::binary(Operator::Sub, Type::FLOAT, Type::FLOAT, Type::FLOAT, sub),
    OperationDef::binary(Operator::Mul, Type::FLOAT, Type::FLOAT, Type::FLOAT, mul),
    OperationDef::binary(Operator::Div, Type::FLOAT, Type::FLOAT, Type::FLOAT, div),
    OperationDef::unary(Operator::Neg, Type::FLOAT, Type::FLOAT, neg),
    OperationDef::binary(Operator::Eq, Type::FLOAT, Type::FLOAT, Type::BOOL, eq),
    OperationDef::binary(Operator::Neq, Type::FLOAT, Type::FLOAT, Type::BOOL, ne),
    OperationDef::binary(Operator::Lt, Type::FLOAT, Type::FLOAT, Type::BOOL, lt),
    OperationDef::binary(Operator::Gt, Type::FLOAT, Type::FLOAT, Type::BOOL, gt),
    OperationDef::binary(Operator::Le, Type::FLOAT, Type::FLOAT, Type::BOOL, le),
    OperationDef::binary(Operator::Ge, Type::FLOAT, Type::FLOAT, Type::BOOL, ge),
    OperationDef::binary(Operator::In, Type::FLOAT, LIST, Type::BOOL, in_list),
    OperationDef::truthiness(Type::FLOAT, truthy),
    OperationDef::truthiness(LIST, non_empty_list),
];
