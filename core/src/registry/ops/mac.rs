//! MAC address operations.

use crate::parser::Operator;
use crate::registry::OperationDef;
use crate::registry::ops::{list_contains, non_empty_list};
use crate::types::{ScalarType, Type};
use crate::values::Value;

const LIST: Type = Type::list_of(ScalarType::MacAddr);

binary_fn!(eq, "==", |a: MacAddr, b: MacAddr| Ok(Value::Bool(a == b)));
binary_fn!(ne, "!=", |a: MacAddr, b: MacAddr| Ok(Value::Bool(a != b)));

binary_fn!(in_list, "in", |a: MacAddr, items: List| list_contains(items, |item| {
    matches!(item, Value::MacAddr(b) if b == a)
}));

pub static OPERATIONS: &[OperationDef] = &[
    OperationDef::binary(Operator::Eq, Type::MAC_ADDR, Type::MAC_ADDR, Type::BOOL, eq),
    OperationDef::binary(Operator::Neq, Type::MAC_ADDR, Type::MAC_ADDR, Type::BOOL, ne),
    OperationDef::binary(Operator::In, Type::MAC_ADDR, LIST, Type::BOOL, in_list),
    OperationDef::truthiness(LIST, non_empty_list),
];
