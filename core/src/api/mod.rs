//! Public API for compiling and evaluating filters.
//!
//! A filter is compiled once from its expression text and a
//! [`FilterOptions`] bundle holding the schema callbacks, then evaluated
//! once per record:
//!
//! ```ignore
//! use flowfilter_core::api::{Filter, FilterOptions};
//!
//! let options = FilterOptions::new(&field_lookup, &data_accessor, &schema)
//!     .with_constant_lookup(&constant_lookup);
//! let filter = Filter::compile("ip.src == 10.0.0.0/8 and port in [80, 443]", options)?;
//!
//! for flow in &flows {
//!     if filter.evaluate(flow)? {
//!         // ...
//!     }
//! }
//! ```

pub mod diagnostics;
pub mod error;
pub mod filter;
pub mod options;


pub use diagnostics::Diagnostics;
pub use error::{Diagnostic, Error, ErrorCode, Location, Severity};
pub use filter::Filter;
pub use options::{
    CompilationOptions, Constant, ConstantLookupFn, DataAccessorFn, EvaluationOptions,
    FieldDescriptor, FieldLookupFn, FilterOptions, MissingFieldPolicy,
};
