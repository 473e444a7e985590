use pretty_assertions::assert_eq;

use super::parser::{parse, parse_with_max_depth};
use super::*;

fn parse_err(source: &str) -> ParseError {
    match parse(source) {
        Ok(expr) => panic!("expected {:?} to fail, got {}", source, expr),
        Err(err) => err,
    }
}

#[test]
fn test_literals() {
    assert_eq!(
        parse("42").unwrap(),
        Expr::literal(Literal::Int(42), Span::new(0, 2))
    );
    assert_eq!(parse("42u").unwrap().kind, ExprKind::Literal(Literal::UInt(42)));
    assert_eq!(parse("1.5").unwrap().kind, ExprKind::Literal(Literal::Float(1.5)));
    assert_eq!(
        parse("'web'").unwrap().kind,
        ExprKind::Literal(Literal::Str("web".to_string()))
    );
    assert_eq!(parse("true").unwrap().kind, ExprKind::Literal(Literal::Bool(true)));
}

#[test]
fn test_large_unsuffixed_integer_becomes_unsigned() {
    assert_eq!(
        parse("18446744073709551615").unwrap().kind,
        ExprKind::Literal(Literal::UInt(u64::MAX))
    );
    assert_eq!(
        parse("9223372036854775807").unwrap().kind,
        ExprKind::Literal(Literal::Int(i64::MAX))
    );
}

#[test]
fn test_i64_min_literal() {
    assert_eq!(
        parse("-9223372036854775808").unwrap(),
        Expr::literal(Literal::Int(i64::MIN), Span::new(0, 20))
    );
}

#[test]
fn test_comparison_spans() {
    let expr = parse("port == 80").unwrap();
    assert_eq!(expr.span, Span::new(0, 10));
    let ExprKind::Comparison { op, left, right } = expr.kind else {
        panic!("expected comparison");
    };
    assert_eq!(op, ComparisonOp::Eq);
    assert_eq!(left.as_ident(), Some("port"));
    assert_eq!(left.span, Span::new(0, 4));
    assert_eq!(right.span, Span::new(8, 10));
}

#[test]
fn test_parenthesized_span_covers_parentheses() {
    let expr = parse("(a)").unwrap();
    assert_eq!(expr.kind, ExprKind::Ident("a".to_string()));
    assert_eq!(expr.span, Span::new(0, 3));
}

#[test]
fn test_list() {
    let expr = parse("proto in [6, 17]").unwrap();
    assert_eq!(expr.to_string(), "(in proto [6, 17])");
    let ExprKind::Comparison { right, .. } = expr.kind else {
        panic!("expected comparison");
    };
    assert_eq!(right.span, Span::new(9, 16));
}

#[test]
fn test_empty_list_parses() {
    assert_eq!(parse("[]").unwrap().kind, ExprKind::List(vec![]));
}

#[test]
fn test_dotted_identifiers() {
    assert_eq!(
        parse("ip.src == 10.0.0.0/8").unwrap().to_string(),
        "(== ip.src 10.0.0.0/8)"
    );
}

#[test]
fn test_empty_input() {
    let err = parse_err("");
    assert!(matches!(err.kind, ParseErrorKind::UnexpectedEnd { .. }));
    assert_eq!(err.span, Span::new(0, 0));
}

#[test]
fn test_missing_operand() {
    let err = parse_err("port ==");
    assert!(matches!(err.kind, ParseErrorKind::UnexpectedEnd { .. }));
    assert_eq!(err.span, Span::new(7, 7));
}

#[test]
fn test_adjacent_operands_are_rejected() {
    let err = parse_err("port 80");
    assert_eq!(
        err.kind,
        ParseErrorKind::UnexpectedToken {
            expected: "operator or end of input".to_string(),
            found: "integer".to_string(),
        }
    );
    assert_eq!(err.span, Span::new(5, 7));
    assert_eq!(err.to_diagnostic().id, "P001");
}

#[test]
fn test_unclosed_delimiters() {
    assert_eq!(
        parse_err("(a == 1").kind,
        ParseErrorKind::UnclosedDelimiter { delimiter: '(' }
    );
    assert_eq!(
        parse_err("a in [1, 2").kind,
        ParseErrorKind::UnclosedDelimiter { delimiter: '[' }
    );
}

#[test]
fn test_unexpected_token_in_prefix_position() {
    let err = parse_err("a == )");
    assert_eq!(
        err.kind,
        ParseErrorKind::UnexpectedToken {
            expected: "expression".to_string(),
            found: "')'".to_string(),
        }
    );
}

#[test]
fn test_lexical_error_surfaces() {
    let err = parse_err("a == $");
    assert_eq!(err.code(), crate::api::ErrorCode::Lexical);
    assert_eq!(err.span, Span::new(5, 6));
}

#[test]
fn test_max_depth() {
    let nested = format!("{}a{}", "(".repeat(10), ")".repeat(10));
    assert!(parse_with_max_depth(&nested, 32).is_ok());
    let err = parse_with_max_depth(&nested, 5).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::MaxDepthExceeded { max_depth: 5 });
}

#[test]
fn test_deep_nesting_within_default_limit() {
    let nested = format!("{}1{}", "(".repeat(200), ")".repeat(200));
    assert!(parse(&nested).is_ok());
}

#[test]
fn test_long_chains_count_towards_depth() {
    let chain = vec!["a == 1"; 100].join(" or ");
    assert!(parse(&chain).is_ok());

    let chain = vec!["a == 1"; 3000].join(" or ");
    let err = parse(&chain).unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::MaxDepthExceeded {
            max_depth: DEFAULT_MAX_DEPTH
        }
    );
    assert_eq!(err.code(), crate::api::ErrorCode::Syntax);
}

#[test]
fn test_chain_height_limit() {
    // Four terms joined by `and` are three nodes over a comparison.
    let chain = "a == 1 and b == 2 and c == 3 and d == 4";
    assert!(parse_with_max_depth(chain, 5).is_ok());
    let err = parse_with_max_depth(chain, 4).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::MaxDepthExceeded { max_depth: 4 });
    // Reported at the operator that crossed the limit.
    assert_eq!(err.span, Span::new(29, 32));
}

#[test]
fn test_list_counts_towards_depth() {
    assert!(parse_with_max_depth("a in [1, 2]", 3).is_ok());
    let err = parse_with_max_depth("a in [1, -2]", 3).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::MaxDepthExceeded { max_depth: 3 });
}
