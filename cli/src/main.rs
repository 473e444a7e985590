//! `flowfilter` command: compile a filter against fields declared on the
//! command line and evaluate it on a single record.
//!
//! ```text
//! flowfilter 'proto == TCP and port in [80, 443]' \
//!     --field port:uint --field proto:uint \
//!     --const TCP=6u --set port=443 --set proto=6
//! ```
//!
//! Prints `match` or `no match`. The exit status is 0 on a match, 1 when the
//! record does not match and 2 on any error.

use std::collections::HashMap;
use std::process::ExitCode;

use clap::Parser;
use flowfilter::{
    CompilationOptions, Constant, EvalError, EvaluationOptions, FieldDescriptor, Filter,
    FilterOptions, MissingFieldPolicy, ScalarType, Type, Value, render_diagnostics, render_error,
};
use miette::{Diagnostic, Result};
use thiserror::Error;

/// Flowfilter - compile and evaluate flow filter expressions
#[derive(Parser, Debug)]
#[command(name = "flowfilter")]
#[command(about = "Evaluate a flow filter against one record", long_about = None)]
struct Args {
    /// Filter expression
    expression: String,

    /// Declare a field, e.g. `--field ip.src:ip` or `--field ports:list<uint>`
    #[arg(long = "field", value_name = "NAME:TYPE")]
    fields: Vec<String>,

    /// Declare a named constant, e.g. `--const TCP=6u`
    #[arg(long = "const", value_name = "NAME=LITERAL")]
    constants: Vec<String>,

    /// Set a field of the record, e.g. `--set port=443`
    #[arg(long = "set", value_name = "NAME=LITERAL")]
    values: Vec<String>,

    /// Treat fields absent from the record as non-matching instead of failing
    #[arg(long)]
    missing_as_false: bool,

    /// Skip constant folding
    #[arg(long)]
    no_optimize: bool,

    /// Print the typed expression before evaluating
    #[arg(long)]
    print_ast: bool,
}

#[derive(Debug, Error, Diagnostic)]
enum CliError {
    #[error("Malformed {flag} argument '{arg}'")]
    #[diagnostic(code(flowfilter::args), help("expected {expected}"))]
    Malformed {
        flag: &'static str,
        arg: String,
        expected: &'static str,
    },

    #[error("Unknown type '{ty}' for field '{name}'")]
    #[diagnostic(
        code(flowfilter::args),
        help("types are bool, int, uint, float, string, ip, mac and list<T>")
    )]
    UnknownType { name: String, ty: String },

    #[error("Field '{name}' is declared more than once")]
    #[diagnostic(code(flowfilter::args))]
    DuplicateField { name: String },

    #[error("Invalid literal for '{name}': {message}")]
    #[diagnostic(code(flowfilter::args))]
    InvalidLiteral { name: String, message: String },

    #[error("Field '{name}' is set but not declared")]
    #[diagnostic(code(flowfilter::args), help("declare it with --field {name}:TYPE"))]
    UndeclaredField { name: String },

    #[error("Value for '{name}' is not a {ty}")]
    #[diagnostic(code(flowfilter::args))]
    ValueType { name: String, ty: Type },

    #[error("Evaluation failed: {0}")]
    #[diagnostic(code(flowfilter::evaluation))]
    Evaluation(#[from] EvalError),
}

#[derive(Default)]
struct Schema {
    fields: HashMap<String, FieldDescriptor>,
    constants: HashMap<String, Constant>,
}

type Record = HashMap<u64, Value>;

enum Outcome {
    Match,
    NoMatch,
    Rejected,
}

fn split_arg<'a>(
    arg: &'a str,
    separator: char,
    flag: &'static str,
    expected: &'static str,
) -> Result<(&'a str, &'a str), CliError> {
    match arg.split_once(separator) {
        Some((name, rest)) if !name.trim().is_empty() => Ok((name.trim(), rest.trim())),
        _ => Err(CliError::Malformed {
            flag,
            arg: arg.to_string(),
            expected,
        }),
    }
}

fn parse_literal(name: &str, text: &str) -> Result<Value, CliError> {
    Value::parse_literal(text).map_err(|error| CliError::InvalidLiteral {
        name: name.to_string(),
        message: error.to_string(),
    })
}

/// Brings a command-line literal to the declared field type, so `--set
/// port=443` works for a uint field.
fn coerce(value: Value, ty: Type) -> Option<Value> {
    if value.conforms_to(ty) {
        return Some(value);
    }
    match (value, ty) {
        (Value::Int(n), Type::Scalar(ScalarType::UInt)) => u64::try_from(n).ok().map(Value::UInt),
        (Value::Int(n), Type::Scalar(ScalarType::Float)) => Some(Value::Float(n as f64)),
        (Value::UInt(n), Type::Scalar(ScalarType::Float)) => Some(Value::Float(n as f64)),
        (Value::List(items), Type::List(element)) => items
            .into_iter()
            .map(|item| coerce(item, Type::Scalar(element)))
            .collect::<Option<Vec<_>>>()
            .map(Value::List),
        _ => None,
    }
}

fn build_schema(args: &Args) -> Result<Schema, CliError> {
    let mut schema = Schema::default();

    for (id, arg) in args.fields.iter().enumerate() {
        let (name, ty_name) = split_arg(arg, ':', "--field", "NAME:TYPE")?;
        let ty = Type::from_name(ty_name).ok_or_else(|| CliError::UnknownType {
            name: name.to_string(),
            ty: ty_name.to_string(),
        })?;
        let descriptor = FieldDescriptor { id: id as u64, ty };
        if schema.fields.insert(name.to_string(), descriptor).is_some() {
            return Err(CliError::DuplicateField {
                name: name.to_string(),
            });
        }
    }

    for arg in &args.constants {
        let (name, text) = split_arg(arg, '=', "--const", "NAME=LITERAL")?;
        let value = parse_literal(name, text)?;
        let ty = value.ty().ok_or_else(|| CliError::InvalidLiteral {
            name: name.to_string(),
            message: "an empty list has no type".to_string(),
        })?;
        schema
            .constants
            .insert(name.to_string(), Constant { value, ty });
    }

    tracing::debug!(
        fields = schema.fields.len(),
        constants = schema.constants.len(),
        "Built schema"
    );
    Ok(schema)
}

fn build_record(args: &Args, schema: &Schema) -> Result<Record, CliError> {
    let mut record = Record::new();
    for arg in &args.values {
        let (name, text) = split_arg(arg, '=', "--set", "NAME=LITERAL")?;
        let descriptor = schema
            .fields
            .get(name)
            .ok_or_else(|| CliError::UndeclaredField {
                name: name.to_string(),
            })?;
        let value =
            coerce(parse_literal(name, text)?, descriptor.ty).ok_or_else(|| CliError::ValueType {
                name: name.to_string(),
                ty: descriptor.ty,
            })?;
        record.insert(descriptor.id, value);
    }
    Ok(record)
}

fn run(args: &Args) -> Result<Outcome> {
    let schema = build_schema(args)?;
    let record = build_record(args, &schema)?;

    let field_lookup = |name: &str, schema: &Schema| schema.fields.get(name).copied();
    let constant_lookup = |name: &str, schema: &Schema| schema.constants.get(name).cloned();
    let data_accessor =
        |field: &FieldDescriptor, record: &Record, _: &Schema| record.get(&field.id).cloned();

    let missing_field = if args.missing_as_false {
        MissingFieldPolicy::False
    } else {
        MissingFieldPolicy::Error
    };
    let options = FilterOptions::new(&field_lookup, &data_accessor, &schema)
        .with_constant_lookup(&constant_lookup)
        .with_compilation_options(CompilationOptions {
            optimize: !args.no_optimize,
            ..CompilationOptions::default()
        })
        .with_evaluation_options(EvaluationOptions { missing_field });

    let filter = match Filter::compile(&args.expression, options) {
        Ok(filter) => filter,
        Err(error) => {
            render_error(&error);
            return Ok(Outcome::Rejected);
        }
    };
    render_diagnostics(filter.source(), filter.diagnostics());

    if args.print_ast {
        println!("=== Typed Expression ===");
        println!("{}", filter.ast());
        println!();
    }

    let matched = filter.evaluate(&record).map_err(CliError::from)?;
    Ok(if matched {
        Outcome::Match
    } else {
        Outcome::NoMatch
    })
}

fn main() -> ExitCode {
    let args = Args::parse();

    use tracing_subscriber::{EnvFilter, fmt};

    // RUST_LOG controls the log level; default to WARN if not set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(&args) {
        Ok(Outcome::Match) => {
            println!("match");
            ExitCode::SUCCESS
        }
        Ok(Outcome::NoMatch) => {
            println!("no match");
            ExitCode::from(1)
        }
        Ok(Outcome::Rejected) => ExitCode::from(2),
        Err(report) => {
            eprintln!("{:?}", report);
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["flowfilter"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_coerce_to_declared_type() {
        assert_eq!(coerce(Value::Int(443), Type::UINT), Some(Value::UInt(443)));
        assert_eq!(coerce(Value::Int(-1), Type::UINT), None);
        assert_eq!(coerce(Value::UInt(2), Type::FLOAT), Some(Value::Float(2.0)));
        assert_eq!(
            coerce(
                Value::List(vec![Value::Int(80), Value::Int(443)]),
                Type::list_of(ScalarType::UInt)
            ),
            Some(Value::List(vec![Value::UInt(80), Value::UInt(443)]))
        );
        assert_eq!(coerce(Value::str("x"), Type::INT), None);
    }

    #[test]
    fn test_schema_and_record() {
        let args = args(&[
            "port == HTTP",
            "--field",
            "port:uint",
            "--field",
            "ports:list<uint>",
            "--const",
            "HTTP=80u",
            "--set",
            "port=80",
            "--set",
            "ports=[80, 443]",
        ]);
        let schema = build_schema(&args).unwrap();
        assert_eq!(schema.fields["port"].ty, Type::UINT);
        assert_eq!(schema.constants["HTTP"].ty, Type::UINT);

        let record = build_record(&args, &schema).unwrap();
        assert_eq!(record[&schema.fields["port"].id], Value::UInt(80));
        assert!(matches!(run(&args), Ok(Outcome::Match)));
    }

    #[test]
    fn test_argument_errors() {
        let schema_error = |extra: &[&str]| build_schema(&args(extra)).err();
        assert!(matches!(
            schema_error(&["x", "--field", "port"]),
            Some(CliError::Malformed { .. })
        ));
        assert!(matches!(
            schema_error(&["x", "--field", "port:short"]),
            Some(CliError::UnknownType { .. })
        ));
        assert!(matches!(
            schema_error(&["x", "--field", "a:int", "--field", "a:uint"]),
            Some(CliError::DuplicateField { .. })
        ));

        let args = args(&["x", "--field", "port:uint", "--set", "prot=1"]);
        let schema = build_schema(&args).unwrap();
        assert!(matches!(
            build_record(&args, &schema),
            Err(CliError::UndeclaredField { .. })
        ));
    }

    #[test]
    fn test_missing_field_outcomes() {
        let strict = args(&["port == 80", "--field", "port:uint"]);
        assert!(run(&strict).is_err());

        let lenient = args(&["port == 80", "--field", "port:uint", "--missing-as-false"]);
        assert!(matches!(run(&lenient), Ok(Outcome::NoMatch)));
    }
}
