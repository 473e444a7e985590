//! Tree-walking evaluator for compiled filters.
//!
//! The evaluator walks an `EvalNode` tree once per record and produces the
//! filter's boolean result.
//!
//! ## Design Principles
//!
//! - **Never panic**: operation failures and absent fields are reported as
//!   `EvalError`s that abort only the current call
//! - **Short-circuit**: the right operand of `and`/`or` is skipped when the
//!   left one decides the result, including its field reads
//! - **No shared scratch state**: literals are borrowed from the tree and
//!   every intermediate value is owned by the call frame that produced it
//!
//! ## Example
//!
//! ```ignore
//! let tree = compiler::lower(&typed)?;
//! let matched = evaluator::evaluate(&tree, &accessor, &record, &context, &options)?;
//! ```

mod error;
mod eval;


pub use error::{EvalError, RuntimeError};
pub use eval::Evaluator;

use crate::api::{DataAccessorFn, EvaluationOptions};
use crate::compiler::EvalNode;

/// Evaluate `tree` against one record.
pub fn evaluate<C: ?Sized, R: ?Sized>(
    tree: &EvalNode,
    accessor: &DataAccessorFn<'_, C, R>,
    record: &R,
    context: &C,
    options: &EvaluationOptions,
) -> Result<bool, EvalError> {
    Evaluator::new(accessor, record, context, options.missing_field).eval(tree)
}
