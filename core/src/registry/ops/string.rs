//! String operations. Ordering is lexicographic over bytes.

use crate::parser::Operator;
use crate::registry::OperationDef;
use crate::registry::ops::{list_contains, non_empty_list};
use crate::types::{ScalarType, Type};
use crate::values::Value;

const LIST: Type = Type::list_of(ScalarType::Str);

ordering_fns!([eq, ne, lt, gt, le, ge], |a: Str, b: Str| a.as_str().cmp(b.as_str()));

binary_fn!(contains, "contains", |a: Str, b: Str| Ok(Value::Bool(
    a.contains(b.as_str())
)));

binary_fn!(in_list, "in", |a: Str, items: List| list_contains(items, |item| {
    matches!(item, Value::Str(b) if b == a)
}));

unary_fn!(truthy, "truthiness", |a: Str| Ok(Value::Bool(!a.is_empty())));

pub static OPERATIONS: &[OperationDef] = &[
    OperationDef::binary(Operator::Eq, Type::STR, Type::STR, Type::BOOL, eq),
    OperationDef::binary(Operator::Neq, Type::STR, Type::STR, Type::BOOL, ne),
    OperationDef::binary(Operator::Lt, Type::STR, Type::STR, Type::BOOL, lt),
    OperationDef::binary(Operator::Gt, Type::STR, Type::STR, Type::BOOL, gt),
    OperationDef::binary(Operator::Le, Type::STR, Type::STR, Type::BOOL, le),
    OperationDef::binary(Operator::Ge, Type::STR, Type::STR, Type::BOOL, ge),
    OperationDef::binary(Operator::Contains, Type::STR, Type::STR, Type::BOOL, contains),
    OperationDef::binary(Operator::In, Type::STR, LIST, Type::BOOL, in_list),
    OperationDef::truthiness(Type::STR, truthy),
    OperationDef::truthiness(LIST, non_empty_list),
];
