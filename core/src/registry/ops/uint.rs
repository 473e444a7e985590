//! Unsigned integer operations. Mixed int/uint comparisons and membership
//! live with the signed table.

use crate::evaluator::RuntimeError;
use crate::parser::Operator;
use crate::registry::OperationDef;
use crate::registry::ops::{list_contains, map_list, non_empty_list};
use crate::types::{ScalarType, Type};
use crate::values::Value;

const LIST: Type = Type::list_of(ScalarType::UInt);
const FLOAT_LIST: Type = Type::list_of(ScalarType::Float);

binary_fn!(add, "+", |a: UInt, b: UInt| Ok(Value::UInt(a.wrapping_add(*b))));
binary_fn!(sub, "-", |a: UInt, b: UInt| Ok(Value::UInt(a.wrapping_sub(*b))));
binary_fn!(mul, "*", |a: UInt, b: UInt| Ok(Value::UInt(a.wrapping_mul(*b))));
binary_fn!(div, "/", |a: UInt, b: UInt| {
    a.checked_div(*b)
        .map(Value::UInt)
        .ok_or(RuntimeError::DivisionByZero)
});

ordering_fns!([eq, ne, lt, gt, le, ge], |a: UInt, b: UInt| a.cmp(b));

binary_fn!(in_list, "in", |a: UInt, items: List| list_contains(items, |item| {
    matches!(item, Value::UInt(b) if b == a)
}));

unary_fn!(to_float, "float", |a: UInt| Ok(Value::Float(*a as f64)));
unary_fn!(list_to_float, "float", |items: List| map_list(items, to_float));
unary_fn!(truthy, "truthiness", |a: UInt| Ok(Value::Bool(*a != 0)));

pub static OPERATIONS: &[OperationDef] = &[
    OperationDef::binary(Operator::Add, Type::UINT, Type::UINT, Type::UINT, add),
    OperationDef::binary(Operator::Sub, Type::UINT, Type::UINT, Type::UINT, sub),
    OperationDef::binary(Operator::Mul, Type::UINT, Type::UINT, Type::UINT, mul),
    OperationDef::binary(Operator::Div, Type::UINT, Type::UINT, Type::UINT, div),
    OperationDef::binary(Operator::Eq, Type::UINT, Type::UINT, Type::BOOL, eq),
    OperationDef::binary(Operator::Neq, Type::UINT, Type::UINT, Type::BOOL, ne),
    OperationDef::binary(Operator::Lt, Type::UINT, Type::UINT, Type::BOOL, lt),
    OperationDef::binary(Operator::Gt, Type::UINT, Type::UINT, Type::BOOL, gt),
    OperationDef::binary(Operator::Le, Type::UINT, Type::UINT, Type::BOOL, le),
    OperationDef::binary(Operator::Ge, Type::UINT, Type::UINT, Type::BOOL, ge),
    OperationDef::binary(Operator::In, Type::UINT, LIST, Type::BOOL, in_list),
    OperationDef::widening(Type::UINT, Type::FLOAT, to_float),
    OperationDef::widening(LIST, FLOAT_LIST, list_to_float),
    OperationDef::truthiness(Type::UINT, truthy),
    OperationDef::truthiness(LIST, non_empty_list),
];
