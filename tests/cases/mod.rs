//! Shared schema, record type and `test_case!` macro for the integration
//! tests.

#![allow(dead_code)]

use std::collections::HashMap;

use flowfilter::{
    Constant, Error, FieldDescriptor, Filter, FilterOptions, IpPrefix, ScalarType, Type, Value,
};
use once_cell::sync::Lazy;

pub struct Schema {
    fields: HashMap<&'static str, FieldDescriptor>,
    constants: HashMap<&'static str, Constant>,
}

pub static SCHEMA: Lazy<Schema> = Lazy::new(|| {
    let fields = [
        ("port", Type::UINT),
        ("sport", Type::UINT),
        ("proto", Type::UINT),
        ("bytes", Type::UINT),
        ("delta", Type::INT),
        ("rate", Type::FLOAT),
        ("host", Type::STR),
        ("ip.src", Type::IP_ADDR),
        ("ip.dst", Type::IP_ADDR),
        ("mac.src", Type::MAC_ADDR),
        ("flag", Type::BOOL),
        ("ports", Type::list_of(ScalarType::UInt)),
        ("tags", Type::list_of(ScalarType::Str)),
    ]
    .into_iter()
    .enumerate()
    .map(|(id, (name, ty))| (name, FieldDescriptor { id: id as u64, ty }))
    .collect();

    let localnet: IpPrefix = "192.168.0.0/16".parse().unwrap();
    let constants = [
        ("TCP", Value::UInt(6), Type::UINT),
        ("UDP", Value::UInt(17), Type::UINT),
        ("HTTP", Value::UInt(80), Type::UINT),
        ("LOCALNET", Value::IpAddr(localnet), Type::IP_ADDR),
        ("THRESHOLD", Value::Float(0.5), Type::FLOAT),
    ]
    .into_iter()
    .map(|(name, value, ty)| (name, Constant { value, ty }))
    .collect();

    Schema { fields, constants }
});

/// A record: values keyed by field id. Unset fields are absent.
#[derive(Debug, Clone, Default)]
pub struct Flow {
    values: HashMap<u64, Value>,
}

impl Flow {
    pub fn set(&mut self, name: &str, value: Value) {
        let descriptor = SCHEMA.fields[name];
        self.values.insert(descriptor.id, value);
    }

    pub fn with(mut self, name: &str, value: Value) -> Self {
        self.set(name, value);
        self
    }
}

fn field_lookup(name: &str, schema: &Schema) -> Option<FieldDescriptor> {
    schema.fields.get(name).copied()
}

fn constant_lookup(name: &str, schema: &Schema) -> Option<Constant> {
    schema.constants.get(name).cloned()
}

pub fn data_accessor(field: &FieldDescriptor, flow: &Flow, _: &Schema) -> Option<Value> {
    flow.values.get(&field.id).cloned()
}

pub static FIELD_LOOKUP: fn(&str, &Schema) -> Option<FieldDescriptor> = field_lookup;
pub static CONSTANT_LOOKUP: fn(&str, &Schema) -> Option<Constant> = constant_lookup;
pub static DATA_ACCESSOR: fn(&FieldDescriptor, &Flow, &Schema) -> Option<Value> = data_accessor;

pub fn options() -> FilterOptions<'static, Schema, Flow> {
    FilterOptions::new(&FIELD_LOOKUP, &DATA_ACCESSOR, &*SCHEMA).with_constant_lookup(&CONSTANT_LOOKUP)
}

pub fn compile(source: &str) -> Result<Filter<'static, Schema, Flow>, Error> {
    Filter::compile(source, options())
}

pub fn expect_filter<'a>(
    compiled: &'a Result<Filter<'static, Schema, Flow>, Error>,
) -> &'a Filter<'static, Schema, Flow> {
    match compiled {
        Ok(filter) => filter,
        Err(error) => panic!(
            "compilation failed:\n{}",
            flowfilter::render_error_to_string_no_color(error)
        ),
    }
}

pub fn expect_error<'a>(compiled: &'a Result<Filter<'static, Schema, Flow>, Error>) -> &'a Error {
    match compiled {
        Ok(filter) => panic!("expected a compilation error, got {}", filter.ast()),
        Err(error) => error,
    }
}

/// Declares one end-to-end test: compile `input` against the shared schema,
/// then check any of the folded AST, the result on `flow`, or the first
/// compilation diagnostic.
#[macro_export]
macro_rules! test_case {
    (
        name: $name:ident,
        input: $input:expr,
        $(flow: { $($field:literal: $value:expr),* $(,)? },)?
        $(ast: $ast:expr,)?
        $(evaluates: $evaluates:expr,)?
        $(error: ($code:expr, $message:expr),)?
    ) => {
        #[test]
        fn $name() {
            #[allow(unused_mut)]
            let mut flow = $crate::cases::Flow::default();
            $($( flow.set($field, $value); )*)?
            let compiled = $crate::cases::compile($input);
            $(
                let filter = $crate::cases::expect_filter(&compiled);
                pretty_assertions::assert_eq!(filter.ast().to_string(), $ast);
            )?
            $(
                let filter = $crate::cases::expect_filter(&compiled);
                assert_eq!(filter.evaluate(&flow), $evaluates);
            )?
            $(
                let error = $crate::cases::expect_error(&compiled);
                let first = error
                    .diagnostics()
                    .get(0)
                    .unwrap_or_else(|| panic!("no diagnostics for {}", $input));
                assert_eq!((first.code, first.message.as_str()), ($code, $message));
            )?
            let _ = (&flow, &compiled);
        }
    };
}
