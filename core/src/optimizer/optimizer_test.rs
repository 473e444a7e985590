use super::*;
use crate::analyzer::{Lookup, analyze};
use crate::api::{Constant, FieldDescriptor};
use crate::parser;
use crate::registry::Registry;

struct Schema;

impl Lookup for Schema {
    fn field(&self, name: &str) -> Option<FieldDescriptor> {
        match name {
            "port" => Some(FieldDescriptor {
                id: 1,
                ty: Type::UINT,
            }),
            "rate" => Some(FieldDescriptor {
                id: 2,
                ty: Type::FLOAT,
            }),
            _ => None,
        }
    }

    fn constant(&self, name: &str) -> Option<Constant> {
        (name == "TCP").then(|| Constant {
            value: Value::UInt(6),
            ty: Type::UINT,
        })
    }
}

fn typed(source: &str) -> TypedExpr {
    let parsed = parser::parse(source).unwrap();
    analyze(&parsed, &Schema, Registry::standard())
        .unwrap_or_else(|e| panic!("{} failed to resolve: {:?}", source, e))
}

fn folded(source: &str) -> String {
    match optimize(typed(source)) {
        Ok(expr) => expr.to_string(),
        Err(errors) => panic!("{} failed to fold: {:?}", source, errors),
    }
}

fn fold_errors(source: &str) -> Vec<FoldError> {
    optimize(typed(source)).unwrap_err()
}

#[test]
fn test_constant_filter_folds_to_literal() {
    assert_eq!(folded("1 + 2 * 3 == 7"), "true");
    assert_eq!(folded("10 / 3 == 4"), "false");
    assert_eq!(folded("0.1 + 0.2 == 0.3"), "true");
    assert_eq!(folded("not true"), "false");
    assert_eq!(folded("1 + 1"), "true");
}

#[test]
fn test_folding_stops_at_fields() {
    assert_eq!(folded("port == 1 + 2"), "(== port 3)");
    assert_eq!(folded("port > 2 * 3 - 1"), "(> port 5)");
    assert_eq!(folded("port + 1 == 2"), "(== (+ port 1u) 2)");
    assert_eq!(folded("port == TCP"), "(== port 6u)");
}

#[test]
fn test_casts_of_constants_fold() {
    assert_eq!(folded("rate > 1"), "(> rate 1.0)");
    assert_eq!(folded("rate in [1, 2.5]"), "(in rate [1.0, 2.5])");
}

#[test]
fn test_signed_list_against_unsigned_field_is_not_cast() {
    assert_eq!(folded("port in [1, 2]"), "(in port [1, 2])");
    assert_eq!(folded("port in [80, -1]"), "(in port [80, -1])");
}

#[test]
fn test_logical_with_constant_operand() {
    assert_eq!(folded("false and port == 1"), "false");
    assert_eq!(folded("port == 1 and false"), "false");
    assert_eq!(folded("true or port == 1"), "true");
    assert_eq!(folded("port == 1 or 1 == 1"), "true");
    assert_eq!(folded("true and port == 1"), "(== port 1)");
    assert_eq!(folded("port == 1 or false"), "(== port 1)");
    assert_eq!(folded("1 > 2 or rate < 0.5"), "(< rate 0.5)");
}

#[test]
fn test_non_constant_logical_is_kept() {
    assert_eq!(
        folded("port == 1 and port == 2"),
        "(and (== port 1) (== port 2))"
    );
}

#[test]
fn test_division_by_zero_is_reported_with_span() {
    let errors = fold_errors("port == 1 / 0");
    assert_eq!(
        errors,
        vec![FoldError {
            error: RuntimeError::DivisionByZero,
            span: Span::new(8, 13),
        }]
    );
    let diagnostic = errors[0].to_diagnostic();
    assert_eq!(diagnostic.code, ErrorCode::Evaluation);
    assert_eq!(diagnostic.span, Some(Span::new(8, 13)));
}

#[test]
fn test_every_failing_subtree_is_reported() {
    let errors = fold_errors("port == 1 / 0 or port == 2 / 0");
    assert_eq!(errors.len(), 2);
}

#[test]
fn test_failing_cast_is_reported() {
    let errors = fold_errors("port == -1 + 0u");
    assert_eq!(
        errors[0].error,
        RuntimeError::NegativeToUnsigned { value: -1 }
    );
}

#[test]
fn test_skipped_side_of_connective_is_not_folded() {
    assert_eq!(folded("false and port > 1 / 0"), "false");
    assert_eq!(folded("true or 1 / 0 == 0"), "true");
    assert_eq!(folded("port > 1 / 0 and false"), "false");
    assert_eq!(folded("1 / 0 == 0 or true"), "true");
}

#[test]
fn test_identity_constant_keeps_failing_side() {
    let errors = fold_errors("true and port > 1 / 0");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].error, RuntimeError::DivisionByZero);
}
