//! flowfilter - boolean filter expressions over flow records
//!
//! # Overview
//!
//! A filter expression such as
//!
//! ```text
//! ip.src == 10.0.0.0/8 and proto == TCP and port in [80, 443]
//! ```
//!
//! is compiled once against a schema (reached through callbacks that
//! resolve field names and symbolic constants) and then evaluated once per
//! record. Operators are bound to typed operations at compile time;
//! evaluation is a short-circuiting walk of a pre-bound tree.
//!
//! # Quick Start
//!
//! ```
//! use flowfilter::{FieldDescriptor, Filter, FilterOptions, Type, Value};
//!
//! struct Flow {
//!     port: u64,
//!     bytes: u64,
//! }
//!
//! let lookup = |name: &str, _: &()| match name {
//!     "port" => Some(FieldDescriptor { id: 0, ty: Type::UINT }),
//!     "bytes" => Some(FieldDescriptor { id: 1, ty: Type::UINT }),
//!     _ => None,
//! };
//! let accessor = |field: &FieldDescriptor, flow: &Flow, _: &()| match field.id {
//!     0 => Some(Value::UInt(flow.port)),
//!     1 => Some(Value::UInt(flow.bytes)),
//!     _ => None,
//! };
//!
//! let filter = Filter::compile(
//!     "port == 443 and bytes > 1024 * 1024",
//!     FilterOptions::<(), Flow>::new(&lookup, &accessor, &()),
//! )
//! .unwrap();
//!
//! assert_eq!(filter.evaluate(&Flow { port: 443, bytes: 5 << 20 }), Ok(true));
//! assert_eq!(filter.evaluate(&Flow { port: 443, bytes: 10 }), Ok(false));
//! ```
//!
//! Compilation errors carry every diagnostic found; render them with
//! [`render_error`] for a source-annotated report.

mod error_renderer;

pub use error_renderer::{
    render_diagnostics, render_error, render_error_to, render_error_to_string,
    render_error_to_string_no_color,
};

// Re-export public API from flowfilter_core
pub use flowfilter_core::api::{
    CompilationOptions, Constant, ConstantLookupFn, DataAccessorFn, Diagnostic, Diagnostics, Error,
    ErrorCode, EvaluationOptions, FieldDescriptor, FieldLookupFn, Filter, FilterOptions, Location,
    MissingFieldPolicy, Severity,
};

// Re-export commonly used types and values
pub use flowfilter_core::registry::{self, CastKind, Registry};
pub use flowfilter_core::types::{ScalarType, Type};
pub use flowfilter_core::values::{IpPrefix, MacAddr, Value};

// Re-export errors
pub use flowfilter_core::evaluator::{EvalError, RuntimeError};
