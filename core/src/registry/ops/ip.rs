//! IP address operations.
//!
//! Addresses carry a prefix length. Equality compares the two addresses
//! under the shorter of the two prefixes, so a host address equals every
//! network that contains it: `10.1.2.3 == 10.0.0.0/8` holds.

use crate::parser::Operator;
use crate::registry::OperationDef;
use crate::registry::ops::{list_contains, non_empty_list};
use crate::types::{ScalarType, Type};
use crate::values::Value;

const LIST: Type = Type::list_of(ScalarType::IpAddr);

binary_fn!(eq, "==", |a: IpAddr, b: IpAddr| Ok(Value::Bool(a.matches(b))));
binary_fn!(ne, "!=", |a: IpAddr, b: IpAddr| Ok(Value::Bool(!a.matches(b))));

binary_fn!(in_list, "in", |a: IpAddr, items: List| list_contains(items, |item| {
    matches!(item, Value::IpAddr(b) if a.matches(b))
}));

pub static OPERATIONS: &[OperationDef] = &[
    OperationDef::binary(Operator::Eq, Type::IP_ADDR, Type::IP_ADDR, Type::BOOL, eq),
    OperationDef::binary(Operator::Neq, Type::IP_ADDR, Type::IP_ADDR, Type::BOOL, ne),
    OperationDef::binary(Operator::In, Type::IP_ADDR, LIST, Type::BOOL, in_list),
    OperationDef::truthiness(LIST, non_empty_list),
];
