use super::*;
use crate::api::{Constant, ErrorCode, FieldDescriptor};
use crate::evaluator::RuntimeError;
use crate::parser;
use crate::parser::Operator;
use crate::registry::{CastKind, Registry};
use crate::types::{ScalarType, Type};
use crate::values::Value;

struct Schema;

impl Lookup for Schema {
    fn field(&self, name: &str) -> Option<FieldDescriptor> {
        let (id, ty) = match name {
            "port" => (1, Type::UINT),
            "proto" => (2, Type::UINT),
            "delta" => (3, Type::INT),
            "rate" => (4, Type::FLOAT),
            "host" => (5, Type::STR),
            "ip.src" => (6, Type::IP_ADDR),
            "mac" => (7, Type::MAC_ADDR),
            "flag" => (8, Type::BOOL),
            "ports" => (9, Type::list_of(ScalarType::UInt)),
            _ => return None,
        };
        Some(FieldDescriptor { id, ty })
    }

    fn constant(&self, name: &str) -> Option<Constant> {
        match name {
            "HTTP" => Some(Constant {
                value: Value::UInt(80),
                ty: Type::UINT,
            }),
            "BROKEN" => Some(Constant {
                value: Value::str("x"),
                ty: Type::INT,
            }),
            _ => None,
        }
    }
}

fn analyze_with(source: &str, registry: &Registry) -> Result<TypedExpr, Vec<TypeError>> {
    let parsed = parser::parse(source)
        .unwrap_or_else(|e| panic!("Expression parsing failed: {}\n{}", source, e));
    analyze(&parsed, &Schema, registry)
}

fn analyze_source(source: &str) -> Result<TypedExpr, Vec<TypeError>> {
    analyze_with(source, Registry::standard())
}

fn typed(source: &str) -> String {
    match analyze_source(source) {
        Ok(typed) => typed.to_string(),
        Err(errors) => panic!("{} failed: {:?}", source, errors),
    }
}

fn errors(source: &str) -> Vec<TypeError> {
    match analyze_source(source) {
        Ok(typed) => panic!("{} unexpectedly resolved to {}", source, typed),
        Err(errors) => errors,
    }
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_exact_matches_need_no_casts() {
    assert_eq!(typed("port == 80u"), "(== port 80u)");
    assert_eq!(typed("host contains 'exa'"), "(contains host \"exa\")");
    assert_eq!(typed("rate > 1.5"), "(> rate 1.5)");
}

#[test]
fn test_mixed_sign_comparison_is_direct() {
    assert_eq!(typed("port == 80"), "(== port 80)");
    assert_eq!(typed("delta < port"), "(< delta port)");
}

#[test]
fn test_single_widening() {
    assert_eq!(typed("rate > 1"), "(> rate (as float 1))");
    assert_eq!(typed("port + 1 == 81u"), "(== (+ port (as uint 1)) 81u)");
}

#[test]
fn test_widening_on_right() {
    assert_eq!(typed("1.5 * delta > 0.0"), "(> (* 1.5 (as float delta)) 0.0)");
}

#[test]
fn test_arithmetic_result_types() {
    for (source, ty) in [
        ("1 + 2", Type::INT),
        ("1u * 2u", Type::UINT),
        ("1.0 / 2.0", Type::FLOAT),
        ("-delta", Type::INT),
        ("-rate", Type::FLOAT),
    ] {
        let root = analyze_source(source).unwrap_or_else(|e| panic!("{}: {:?}", source, e));
        // The root is coerced to bool; the arithmetic type is one level down.
        let ExprInner::ImplicitCast { inner, .. } = root.inner else {
            panic!("{} should be coerced to bool", source);
        };
        assert_eq!(inner.ty, ty, "{}", source);
    }
}

#[test]
fn test_type_mismatch_names_operator_and_types() {
    let errors = errors("\"abc\" + 1");
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].kind,
        TypeErrorKind::NoOperation {
            op: "+".to_string(),
            operands: vec![Type::STR, Type::INT],
        }
    );
    assert_eq!(errors[0].code(), ErrorCode::TypeMismatch);
}

#[test]
fn test_unary_minus_operand_widening() {
    // uint has no negation of its own; float does.
    assert_eq!(typed("-port < 0.0"), "(< (- (as float port)) 0.0)");

    let found = errors("-host == 1");
    assert_eq!(found.len(), 1);
    assert!(matches!(
        &found[0].kind,
        TypeErrorKind::NoOperation { op, .. } if op == "-"
    ));
}

// ============================================================================
// Identifiers
// ============================================================================

#[test]
fn test_fields_and_constants() {
    assert_eq!(typed("port == HTTP"), "(== port 80u)");
    let root = analyze_source("ip.src == 10.0.0.0/8").unwrap();
    let ExprInner::Binary { left, .. } = root.inner else {
        panic!("expected comparison");
    };
    let ExprInner::Field { name, descriptor } = &left.inner else {
        panic!("expected field");
    };
    assert_eq!(name, "ip.src");
    assert_eq!(descriptor.id, 6);
}

#[test]
fn test_unknown_field() {
    let errors = errors("prot == 6");
    assert_eq!(
        errors[0].kind,
        TypeErrorKind::UnknownField {
            name: "prot".to_string()
        }
    );
    assert_eq!(errors[0].span, parser::Span::new(0, 4));
}

#[test]
fn test_unknown_constant_next_to_field() {
    let found = errors("port == HTTPS");
    assert_eq!(
        found[0].kind,
        TypeErrorKind::UnknownConstant {
            name: "HTTPS".to_string()
        }
    );
    assert_eq!(found[0].code(), ErrorCode::UnknownConstant);
    assert_eq!(errors("HTTPS == port")[0].code(), ErrorCode::UnknownConstant);
}

#[test]
fn test_constant_with_wrong_value_type() {
    let errors = errors("delta == BROKEN");
    assert!(matches!(
        errors[0].kind,
        TypeErrorKind::ConstantTypeMismatch { .. }
    ));
}

#[test]
fn test_errors_accumulate_across_subtrees() {
    let errors = errors("foo == 1 and bar == 2 or \"x\" + 1 == 2");
    let kinds: Vec<_> = errors.iter().map(TypeError::code).collect();
    assert_eq!(
        kinds,
        vec![
            ErrorCode::UnknownField,
            ErrorCode::UnknownField,
            ErrorCode::TypeMismatch
        ]
    );
}

#[test]
fn test_failed_child_does_not_cascade() {
    // The comparison above an unknown field reports nothing further.
    let errors = errors("(foo + 1) * 2 == 3 and not foo");
    assert_eq!(errors.len(), 2);
    assert!(
        errors
            .iter()
            .all(|e| matches!(e.kind, TypeErrorKind::UnknownField { .. }))
    );
}

// ============================================================================
// Logical contexts
// ============================================================================

#[test]
fn test_truthiness_coercion() {
    assert_eq!(typed("port"), "(as bool port)");
    assert_eq!(typed("host and flag"), "(and (as bool host) flag)");
    assert_eq!(typed("not ports"), "(not (as bool ports))");
}

#[test]
fn test_non_boolean_without_truthiness() {
    assert_eq!(
        errors("ip.src or flag")[0].kind,
        TypeErrorKind::NotBoolean {
            found: Type::IP_ADDR,
            context: "as operand of 'or'",
        }
    );
    assert!(matches!(
        errors("mac")[0].kind,
        TypeErrorKind::NotBoolean { .. }
    ));
}

// ============================================================================
// Lists
// ============================================================================

#[test]
fn test_list_membership() {
    assert_eq!(typed("proto in [6u, 17u]"), "(in proto [6u, 17u])");
    let root = analyze_source("proto in [6, 17]").unwrap();
    assert_eq!(root.ty, Type::BOOL);
    let ExprInner::Binary { right, .. } = root.inner else {
        panic!("expected membership");
    };
    assert_eq!(right.ty, Type::list_of(ScalarType::Int));
    assert_eq!(right.to_string(), "[6, 17]");
}

#[test]
fn test_list_elements_widen_to_common_type() {
    let root = analyze_source("rate in [1, 2.5, 3u]").unwrap();
    let ExprInner::Binary { right, .. } = root.inner else {
        panic!("expected membership");
    };
    assert_eq!(right.ty, Type::list_of(ScalarType::Float));
    assert_eq!(right.to_string(), "[(as float 1), 2.5, (as float 3u)]");
}

#[test]
fn test_heterogeneous_list() {
    let errors = errors("host in ['a', 1]");
    assert_eq!(
        errors[0].kind,
        TypeErrorKind::ListHeterogeneity {
            expected: Type::STR,
            found: Type::INT,
        }
    );
    assert_eq!(errors[0].code(), ErrorCode::ListHeterogeneity);
}

#[test]
fn test_list_in_list_is_rejected() {
    let errors = errors("[1, 2] in [1, 2, 3]");
    assert!(matches!(
        &errors[0].kind,
        TypeErrorKind::NoOperation { op, .. } if op == "in"
    ));
}

#[test]
fn test_empty_and_nested_lists() {
    assert_eq!(errors("port in []")[0].kind, TypeErrorKind::EmptyList);
    assert_eq!(errors("port in [[1]]")[0].kind, TypeErrorKind::NestedList);
    assert_eq!(errors("port in [ports]")[0].kind, TypeErrorKind::NestedList);
}

// ============================================================================
// Injected registries
// ============================================================================

fn to_str(value: &Value) -> Result<Value, RuntimeError> {
    Ok(Value::Str(value.to_string()))
}

fn to_bool(value: &Value) -> Result<Value, RuntimeError> {
    Ok(Value::Bool(value.as_int() != Some(0)))
}

fn str_eq(left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    Ok(Value::Bool(left == right))
}

fn bool_eq(left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    Ok(Value::Bool(left == right))
}

#[test]
fn test_cast_ambiguity() {
    // int == int is only reachable by casting both sides, either through
    // string or through bool.
    let mut registry = Registry::empty();
    registry.register_cast(Type::INT, Type::STR, CastKind::Widening, to_str);
    registry.register_cast(Type::INT, Type::BOOL, CastKind::Widening, to_bool);
    registry.register_binary(Operator::Eq, Type::STR, Type::STR, Type::BOOL, str_eq);
    registry.register_binary(Operator::Eq, Type::BOOL, Type::BOOL, Type::BOOL, bool_eq);

    let errors = analyze_with("1 == 2", &registry).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code(), ErrorCode::CastAmbiguity);
    let TypeErrorKind::CastAmbiguity { candidates, .. } = &errors[0].kind else {
        panic!("expected ambiguity");
    };
    assert_eq!(
        candidates,
        &vec!["string == string".to_string(), "bool == bool".to_string()]
    );
}

#[test]
fn test_cheaper_candidate_wins() {
    // Both sides need a cast to reach string == string, but bool == int is
    // one cast away.
    let mut registry = Registry::empty();
    registry.register_cast(Type::INT, Type::STR, CastKind::Widening, to_str);
    registry.register_cast(Type::INT, Type::BOOL, CastKind::Widening, to_bool);
    registry.register_binary(Operator::Eq, Type::STR, Type::STR, Type::BOOL, str_eq);
    registry.register_binary(Operator::Eq, Type::BOOL, Type::INT, Type::BOOL, bool_eq);

    let root = analyze_with("1 == 2", &registry).unwrap();
    assert_eq!(root.to_string(), "(== (as bool 1) 2)");
}

struct CountingSchema {
    field_lookups: std::cell::Cell<usize>,
}

impl Lookup for CountingSchema {
    fn field(&self, name: &str) -> Option<FieldDescriptor> {
        self.field_lookups.set(self.field_lookups.get() + 1);
        Schema.field(name)
    }

    fn constant(&self, name: &str) -> Option<Constant> {
        Schema.constant(name)
    }
}

#[test]
fn test_each_identifier_is_looked_up_once() {
    for (source, lookups) in [
        ("port == proto", 2),
        ("port == HTTP", 2),
        ("port == HTTPS", 2),
        ("port == 80 and proto in ports", 3),
    ] {
        let schema = CountingSchema {
            field_lookups: std::cell::Cell::new(0),
        };
        let parsed = parser::parse(source).unwrap();
        let _ = analyze(&parsed, &schema, Registry::standard());
        assert_eq!(schema.field_lookups.get(), lookups, "{}", source);
    }
}
