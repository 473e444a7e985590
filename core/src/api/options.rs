//! Configuration and callbacks for compiling a filter.

use core::fmt;

use crate::analyzer::Lookup;
use crate::parser::DEFAULT_MAX_DEPTH;
use crate::registry::Registry;
use crate::types::Type;
use crate::values::Value;

/// Schema information about a field, as returned by the field lookup.
///
/// The id is opaque to the filter and handed back unchanged to the data
/// accessor.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    pub id: u64,
    pub ty: Type,
}

/// A symbolic constant, as returned by the constant lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub value: Value,
    pub ty: Type,
}

/// Resolves a field name against the schema.
pub type FieldLookupFn<'cb, C> = dyn Fn(&str, &C) -> Option<FieldDescriptor> + Send + Sync + 'cb;

/// Resolves a symbolic constant name.
pub type ConstantLookupFn<'cb, C> = dyn Fn(&str, &C) -> Option<Constant> + Send + Sync + 'cb;

/// Reads a field from a record. `None` means the record does not carry it.
pub type DataAccessorFn<'cb, C, R> =
    dyn Fn(&FieldDescriptor, &R, &C) -> Option<Value> + Send + Sync + 'cb;

/// Configuration options for compilation.
///
/// # Example
///
/// ```
/// use flowfilter_core::api::CompilationOptions;
///
/// let options = CompilationOptions {
///     optimize: false,
///     ..CompilationOptions::default()
/// };
/// assert_eq!(options.max_depth, 256);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilationOptions {
    /// Maximum nesting of sub-expressions accepted by the parser.
    ///
    /// Default: 256
    pub max_depth: usize,

    /// Fold constant subtrees and simplify logical connectives with a
    /// constant operand.
    ///
    /// Default: true
    pub optimize: bool,
}

impl Default for CompilationOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            optimize: true,
        }
    }
}

/// What an evaluation does when the data accessor reports a field as absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingFieldPolicy {
    /// Abort the evaluation with `EvalError::MissingField`.
    #[default]
    Error,
    /// The innermost boolean-producing operation depending on the field
    /// yields `false`. Logical connectives treat such an operand as `false`.
    False,
}

/// Configuration options for evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationOptions {
    pub missing_field: MissingFieldPolicy,
}

/// Everything `Filter::compile` needs: the callbacks, the opaque user
/// context passed to every callback, the registry operations are bound
/// from, and the phase options.
///
/// # Example
///
/// ```
/// use flowfilter_core::api::{FieldDescriptor, FilterOptions};
/// use flowfilter_core::types::Type;
/// use flowfilter_core::values::Value;
///
/// struct Record {
///     port: u64,
/// }
///
/// let lookup = |name: &str, _: &()| {
///     (name == "port").then_some(FieldDescriptor { id: 1, ty: Type::UINT })
/// };
/// let accessor = |_: &FieldDescriptor, record: &Record, _: &()| Some(Value::UInt(record.port));
/// let options = FilterOptions::<(), Record>::new(&lookup, &accessor, &());
/// # let _ = options;
/// ```
pub struct FilterOptions<'cb, C: ?Sized, R: ?Sized> {
    pub field_lookup: &'cb FieldLookupFn<'cb, C>,
    pub constant_lookup: Option<&'cb ConstantLookupFn<'cb, C>>,
    pub data_accessor: &'cb DataAccessorFn<'cb, C, R>,
    pub context: &'cb C,
    pub registry: &'cb Registry,
    pub compilation: CompilationOptions,
    pub evaluation: EvaluationOptions,
}

impl<'cb, C: ?Sized, R: ?Sized> FilterOptions<'cb, C, R> {
    /// Options with no constant lookup, the standard registry and default
    /// phase options.
    pub fn new(
        field_lookup: &'cb FieldLookupFn<'cb, C>,
        data_accessor: &'cb DataAccessorFn<'cb, C, R>,
        context: &'cb C,
    ) -> Self {
        Self {
            field_lookup,
            constant_lookup: None,
            data_accessor,
            context,
            registry: Registry::standard(),
            compilation: CompilationOptions::default(),
            evaluation: EvaluationOptions::default(),
        }
    }

    pub fn with_constant_lookup(mut self, constant_lookup: &'cb ConstantLookupFn<'cb, C>) -> Self {
        self.constant_lookup = Some(constant_lookup);
        self
    }

    pub fn with_registry(mut self, registry: &'cb Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_compilation_options(mut self, compilation: CompilationOptions) -> Self {
        self.compilation = compilation;
        self
    }

    pub fn with_evaluation_options(mut self, evaluation: EvaluationOptions) -> Self {
        self.evaluation = evaluation;
        self
    }
}

impl<C: ?Sized, R: ?Sized> Lookup for FilterOptions<'_, C, R> {
    fn field(&self, name: &str) -> Option<FieldDescriptor> {
        (self.field_lookup)(name, self.context)
    }

    fn constant(&self, name: &str) -> Option<Constant> {
        self.constant_lookup
            .and_then(|lookup| lookup(name, self.context))
    }
}

impl<C: ?Sized, R: ?Sized> fmt::Debug for FilterOptions<'_, C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterOptions")
            .field("constant_lookup", &self.constant_lookup.is_some())
            .field("registry", self.registry)
            .field("compilation", &self.compilation)
            .field("evaluation", &self.evaluation)
            .finish_non_exhaustive()
    }
}
