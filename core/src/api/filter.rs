//! Compiled filters.

use core::fmt;

use super::{
    DataAccessorFn, Diagnostic, Diagnostics, Error, ErrorCode, EvaluationOptions, FilterOptions,
};
use crate::analyzer::{self, TypedExpr};
use crate::compiler::{self, EvalNode};
use crate::evaluator::{self, EvalError};
use crate::{optimizer, parser};

/// A compiled filter expression, evaluated once per record.
///
/// The filter owns its source text, typed AST, evaluation tree and
/// diagnostics. It borrows the data accessor and the user context for
/// `'cb`. Evaluation takes `&self` and keeps all scratch state on the
/// stack, so a filter may be shared between threads when its context is
/// `Sync`.
///
/// # Example
///
/// ```
/// use flowfilter_core::api::{FieldDescriptor, Filter, FilterOptions};
/// use flowfilter_core::types::Type;
/// use flowfilter_core::values::Value;
///
/// struct Flow {
///     port: u64,
/// }
///
/// let lookup = |name: &str, _: &()| {
///     (name == "port").then_some(FieldDescriptor { id: 1, ty: Type::UINT })
/// };
/// let accessor = |_: &FieldDescriptor, flow: &Flow, _: &()| Some(Value::UInt(flow.port));
///
/// let filter = Filter::compile(
///     "port == 80 or port == 443",
///     FilterOptions::<(), Flow>::new(&lookup, &accessor, &()),
/// )
/// .unwrap();
/// assert_eq!(filter.evaluate(&Flow { port: 443 }), Ok(true));
/// assert_eq!(filter.evaluate(&Flow { port: 22 }), Ok(false));
/// ```
pub struct Filter<'cb, C: ?Sized, R: ?Sized> {
    source: String,
    ast: TypedExpr,
    tree: EvalNode,
    diagnostics: Diagnostics,
    data_accessor: &'cb DataAccessorFn<'cb, C, R>,
    context: &'cb C,
    options: EvaluationOptions,
}

impl<'cb, C: ?Sized, R: ?Sized> Filter<'cb, C, R> {
    /// Compile `expression`.
    ///
    /// Phases run in order: parse, type resolution, constant folding (when
    /// enabled) and lowering. The first failing phase stops the pipeline;
    /// its diagnostics are returned in `Error::Compilation`.
    pub fn compile(expression: &str, options: FilterOptions<'cb, C, R>) -> Result<Self, Error> {
        tracing::debug!(source = expression, "Compiling filter");
        let mut diagnostics = Diagnostics::new(expression);
        let fail = |diagnostics: Diagnostics| Error::Compilation {
            diagnostics,
            source: expression.to_string(),
        };

        let parsed = match parser::parse_with_max_depth(expression, options.compilation.max_depth)
        {
            Ok(parsed) => parsed,
            Err(error) => {
                tracing::debug!(%error, "Parsing failed");
                diagnostics.push(error.to_diagnostic());
                return Err(fail(diagnostics));
            }
        };

        let typed = match analyzer::analyze(&parsed, &options, options.registry) {
            Ok(typed) => typed,
            Err(errors) => {
                tracing::debug!(errors = errors.len(), "Type resolution failed");
                diagnostics.extend(errors.iter().map(|e| e.to_diagnostic()));
                return Err(fail(diagnostics));
            }
        };

        let ast = if options.compilation.optimize {
            match optimizer::optimize(typed) {
                Ok(folded) => folded,
                Err(errors) => {
                    diagnostics.extend(errors.iter().map(|e| e.to_diagnostic()));
                    return Err(fail(diagnostics));
                }
            }
        } else {
            typed
        };

        if let Some(value) = ast.as_bool_literal() {
            diagnostics.push(Diagnostic::warning(
                ErrorCode::ConstantFilter,
                "W001",
                format!("Filter always evaluates to {}", value),
                Some(ast.span.clone()),
            ));
        }

        let tree = match compiler::lower(&ast) {
            Ok(tree) => tree,
            Err(error) => {
                tracing::debug!(%error, "Lowering failed");
                diagnostics.push(error.to_diagnostic());
                return Err(fail(diagnostics));
            }
        };

        tracing::debug!(
            ast_nodes = ast.node_count(),
            eval_nodes = tree.node_count(),
            warnings = diagnostics.len(),
            "Filter compiled"
        );

        Ok(Self {
            source: expression.to_string(),
            ast,
            tree,
            diagnostics,
            data_accessor: options.data_accessor,
            context: options.context,
            options: options.evaluation,
        })
    }

    /// Evaluate the filter against one record.
    ///
    /// An error aborts only this call; the filter stays usable.
    pub fn evaluate(&self, record: &R) -> Result<bool, EvalError> {
        evaluator::evaluate(
            &self.tree,
            self.data_accessor,
            record,
            self.context,
            &self.options,
        )
    }

    /// Non-fatal diagnostics of the compilation, such as the constant
    /// filter warning.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The typed (and folded) AST the evaluation tree was lowered from.
    pub fn ast(&self) -> &TypedExpr {
        &self.ast
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl<C: ?Sized, R: ?Sized> fmt::Debug for Filter<'_, C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("source", &self.source)
            .field("ast", &format_args!("{}", self.ast))
            .field("diagnostics", &self.diagnostics)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
