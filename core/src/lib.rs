//! Compiler and evaluator for boolean filter expressions over flow records.
//!
//! The pipeline is: [`parser`] → [`analyzer`] (types and operation binding
//! through a [`registry::Registry`]) → [`optimizer`] → [`compiler`] (eval
//! tree) → [`evaluator`]. [`api::Filter`] ties the phases together.

pub mod analyzer;
pub mod api;
pub mod compiler;
pub mod evaluator;
pub mod optimizer;
pub mod parser;
pub mod registry;
pub mod syntax;
pub mod types;
pub mod values;

pub use api::{
    CompilationOptions, Constant, Diagnostic, Diagnostics, Error, ErrorCode, EvaluationOptions,
    FieldDescriptor, Filter, FilterOptions, Location, MissingFieldPolicy, Severity,
};
pub use evaluator::{EvalError, RuntimeError};
pub use registry::Registry;
pub use types::{ScalarType, Type};
pub use values::{IpPrefix, MacAddr, Value};
