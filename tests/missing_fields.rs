mod cases;

use flowfilter::{EvalError, EvaluationOptions, Filter, MissingFieldPolicy, Value};

use cases::Flow;

fn evaluate(source: &str, flow: &Flow, missing_field: MissingFieldPolicy) -> Result<bool, EvalError> {
    let options = cases::options().with_evaluation_options(EvaluationOptions { missing_field });
    Filter::compile(source, options).unwrap().evaluate(flow)
}

fn tcp_flow() -> Flow {
    Flow::default().with("proto", Value::UInt(6))
}

#[test]
fn missing_field_is_an_error_by_default() {
    assert_eq!(
        cases::compile("port == 80").unwrap().evaluate(&tcp_flow()),
        Err(EvalError::MissingField {
            name: "port".to_string()
        })
    );
}

#[test]
fn error_policy_names_the_first_missing_field() {
    assert_eq!(
        evaluate("proto == 6 and host == \"a\"", &tcp_flow(), MissingFieldPolicy::Error),
        Err(EvalError::MissingField {
            name: "host".to_string()
        })
    );
}

#[test]
fn false_policy_makes_comparison_false() {
    let policy = MissingFieldPolicy::False;
    assert_eq!(evaluate("port == 80", &tcp_flow(), policy), Ok(false));
    assert_eq!(evaluate("port != 80", &tcp_flow(), policy), Ok(false));
    assert_eq!(evaluate("port * 2 > 1", &tcp_flow(), policy), Ok(false));
    assert_eq!(evaluate("port in [80, 443]", &tcp_flow(), policy), Ok(false));
}

#[test]
fn false_policy_inside_connectives() {
    let policy = MissingFieldPolicy::False;
    assert_eq!(evaluate("port == 80 or proto == 6", &tcp_flow(), policy), Ok(true));
    assert_eq!(evaluate("proto == 6 and port == 80", &tcp_flow(), policy), Ok(false));
    assert_eq!(evaluate("flag or proto == 6", &tcp_flow(), policy), Ok(true));
    assert_eq!(evaluate("not flag", &tcp_flow(), policy), Ok(false));
    assert_eq!(evaluate("not (port == 80)", &tcp_flow(), policy), Ok(true));
}

#[test]
fn false_policy_keeps_other_errors() {
    let flow = tcp_flow().with("delta", Value::Int(0));
    let result = evaluate("port == 1 or 1 / delta == 1", &flow, MissingFieldPolicy::False);
    assert!(matches!(result, Err(EvalError::Runtime { .. })));
}

#[test]
fn present_fields_are_unaffected() {
    let flow = tcp_flow().with("port", Value::UInt(80));
    for policy in [MissingFieldPolicy::Error, MissingFieldPolicy::False] {
        assert_eq!(evaluate("port == 80 and proto == TCP", &flow, policy), Ok(true));
    }
}
