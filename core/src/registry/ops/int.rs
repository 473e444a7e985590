//! Signed integer operations.
//!
//! Arithmetic wraps on overflow. Comparisons and membership against `uint`
//! are exact in both operand orders, so mixed-sign operands never go through
//! a lossy conversion.

use crate::evaluator::RuntimeError;
use crate::parser::Operator;
use crate::registry::OperationDef;
use crate::registry::ops::{list_contains, map_list, non_empty_list};
use crate::types::{ScalarType, Type};
use crate::values::Value;

const LIST: Type = Type::list_of(ScalarType::Int);
const UINT_LIST: Type = Type::list_of(ScalarType::UInt);
const FLOAT_LIST: Type = Type::list_of(ScalarType::Float);

binary_fn!(add, "+", |a: Int, b: Int| Ok(Value::Int(a.wrapping_add(*b))));
binary_fn!(sub, "-", |a: Int, b: Int| Ok(Value::Int(a.wrapping_sub(*b))));
binary_fn!(mul, "*", |a: Int, b: Int| Ok(Value::Int(a.wrapping_mul(*b))));
binary_fn!(div, "/", |a: Int, b: Int| {
    if *b == 0 {
        Err(RuntimeError::DivisionByZero)
    } else {
        Ok(Value::Int(a.wrapping_div(*b)))
    }
});
unary_fn!(neg, "-", |a: Int| Ok(Value::Int(a.wrapping_neg())));

ordering_fns!([eq, ne, lt, gt, le, ge], |a: Int, b: Int| a.cmp(b));
ordering_fns!(
    [eq_uint, ne_uint, lt_uint, gt_uint, le_uint, ge_uint],
    |a: Int, b: UInt| i128::from(*a).cmp(&i128::from(*b))
);
ordering_fns!(
    [uint_eq, uint_ne, uint_lt, uint_gt, uint_le, uint_ge],
    |a: UInt, b: Int| i128::from(*a).cmp(&i128::from(*b))
);

binary_fn!(in_list, "in", |a: Int, items: List| list_contains(items, |item| {
    matches!(item, Value::Int(b) if b == a)
}));
binary_fn!(in_uint_list, "in", |a: Int, items: List| list_contains(items, |item| {
    matches!(item, Value::UInt(b) if i128::from(*a) == i128::from(*b))
}));
binary_fn!(uint_in_list, "in", |a: UInt, items: List| list_contains(items, |item| {
    matches!(item, Value::Int(b) if i128::from(*a) == i128::from(*b))
}));

unary_fn!(to_float, "float", |a: Int| Ok(Value::Float(*a as f64)));
unary_fn!(to_uint, "uint", |a: Int| {
    u64::try_from(*a)
        .map(Value::UInt)
        .map_err(|_| RuntimeError::NegativeToUnsigned { value: *a })
});
unary_fn!(list_to_float, "float", |items: List| map_list(items, to_float));
unary_fn!(list_to_uint, "uint", |items: List| map_list(items, to_uint));
unary_fn!(truthy, "truthiness", |a: Int| Ok(Value::Bool(*a != 0)));

pub static OPERATIONS: &[OperationDef] = &[
    OperationDef::binary(Operator::Add, Type::INT, Type::INT, Type::INT, add),
    OperationDef::binary(Operator::Sub, Type::INT, Type::INT, Type::INT, sub),
    OperationDef::binary(Operator::Mul, Type::INT, Type::INT, Type::INT, mul),
    OperationDef::binary(Operator::Div, Type::INT, Type::INT, Type::INT, div),
    OperationDef::unary(Operator::Neg, Type::INT, Type::INT, neg),
    OperationDef::binary(Operator::Eq, Type::INT, Type::INT, Type::BOOL, eq),
    OperationDef::binary(Operator::Neq, Type::INT, Type::INT, Type::BOOL, ne),
    OperationDef::binary(Operator::Lt, Type::INT, Type::INT, Type::BOOL, lt),
    OperationDef::binary(Operator::Gt, Type::INT, Type::INT, Type::BOOL, gt),
    OperationDef::binary(Operator::Le, Type::INT, Type::INT, Type::BOOL, le),
    OperationDef::binary(Operator::Ge, Type::INT, Type::INT, Type::BOOL, ge),
    OperationDef::binary(Operator::Eq, Type::INT, Type::UINT, Type::BOOL, eq_uint),
    OperationDef::binary(Operator::Neq, Type::INT, Type::UINT, Type::BOOL, ne_uint),
    OperationDef::binary(Operator::Lt, Type::INT, Type::UINT, Type::BOOL, lt_uint),
    OperationDef::binary(Operator::Gt, Type::INT, Type::UINT, Type::BOOL, gt_uint),
    OperationDef::binary(Operator::Le, Type::INT, Type::UINT, Type::BOOL, le_uint),
    OperationDef::binary(Operator::Ge, Type::INT, Type::UINT, Type::BOOL, ge_uint),
    OperationDef::binary(Operator::Eq, Type::UINT, Type::INT, Type::BOOL, uint_eq),
    OperationDef::binary(Operator::Neq, Type::UINT, Type::INT, Type::BOOL, uint_ne),
    OperationDef::binary(Operator::Lt, Type::UINT, Type::INT, Type::BOOL, uint_lt),
    OperationDef::binary(Operator::Gt, Type::UINT, Type::INT, Type::BOOL, uint_gt),
    OperationDef::binary(Operator::Le, Type::UINT, Type::INT, Type::BOOL, uint_le),
    OperationDef::binary(Operator::Ge, Type::UINT, Type::INT, Type::BOOL, uint_ge),
    OperationDef::binary(Operator::In, Type::INT, LIST, Type::BOOL, in_list),
    OperationDef::binary(Operator::In, Type::INT, UINT_LIST, Type::BOOL, in_uint_list),
    OperationDef::binary(Operator::In, Type::UINT, LIST, Type::BOOL, uint_in_list),
    OperationDef::widening(Type::INT, Type::FLOAT, to_float),
    OperationDef::widening(Type::INT, Type::UINT, to_uint),
    OperationDef::widening(LIST, FLOAT_LIST, list_to_float),
    OperationDef::widening(LIST, UINT_LIST, list_to_uint),
    OperationDef::truthiness(Type::INT, truthy),
    OperationDef::truthiness(LIST, non_empty_list),
];
