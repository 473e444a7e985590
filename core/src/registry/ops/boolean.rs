//! Boolean operations. `and`/`or` are not here: they short-circuit and are
//! evaluated directly by the evaluator.

use crate::parser::Operator;
use crate::registry::OperationDef;
use crate::registry::ops::{list_contains, non_empty_list};
use crate::types::{ScalarType, Type};
use crate::values::Value;

const LIST: Type = Type::list_of(ScalarType::Bool);

binary_fn!(eq, "==", |a: Bool, b: Bool| Ok(Value::Bool(a == b)));
binary_fn!(ne, "!=", |a: Bool, b: Bool| Ok(Value::Bool(a != b)));
unary_fn!(not, "not", |a: Bool| Ok(Value::Bool(!a)));

binary_fn!(in_list, "in", |a: Bool, items: List| list_contains(items, |item| {
    matches!(item, Value::Bool(b) if b == a)
}));

pub static OPERATIONS: &[OperationDef] = &[
    OperationDef::binary(Operator::Eq, Type::BOOL, Type::BOOL, Type::BOOL, eq),
    OperationDef::binary(Operator::Neq, Type::BOOL, Type::BOOL, Type::BOOL, ne),
    OperationDef::unary(Operator::Not, Type::BOOL, Type::BOOL, not),
    OperationDef::binary(Operator::In, Type::BOOL, LIST, Type::BOOL, in_list),
    OperationDef::truthiness(LIST, non_empty_list),
];
