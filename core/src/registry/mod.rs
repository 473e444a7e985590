//! Type-directed operation registry.
//!
//! Every operator application and implicit conversion in a filter is bound
//! at compile time to a function taken from a `Registry`. The standard
//! registry is assembled once from the per-type definition tables in
//! [`ops`]; tests and embedders can build their own with
//! [`Registry::empty`] and the `register_*` methods.

pub mod ops;


use core::fmt;

use hashbrown::HashMap;
use lazy_static::lazy_static;

use crate::evaluator::RuntimeError;
use crate::parser::Operator;
use crate::types::Type;
use crate::values::Value;

/// Bound unary operation or conversion.
pub type UnaryFn = fn(&Value) -> Result<Value, RuntimeError>;

/// Bound binary operation.
pub type BinaryFn = fn(&Value, &Value) -> Result<Value, RuntimeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastKind {
    /// Lossless-in-intent numeric widening, usable to make operands match.
    Widening,
    /// Conversion to bool in logical contexts.
    Truthiness,
}

/// One row of a per-type definition table.
#[derive(Clone, Copy)]
pub enum OperationDef {
    Unary {
        op: Operator,
        operand: Type,
        result: Type,
        func: UnaryFn,
    },
    Binary {
        op: Operator,
        left: Type,
        right: Type,
        result: Type,
        func: BinaryFn,
    },
    Cast {
        from: Type,
        to: Type,
        kind: CastKind,
        func: UnaryFn,
    },
}

impl OperationDef {
    pub const fn unary(op: Operator, operand: Type, result: Type, func: UnaryFn) -> Self {
        OperationDef::Unary {
            op,
            operand,
            result,
            func,
        }
    }

    pub const fn binary(
        op: Operator,
        left: Type,
        right: Type,
        result: Type,
        func: BinaryFn,
    ) -> Self {
        OperationDef::Binary {
            op,
            left,
            right,
            result,
            func,
        }
    }

    pub const fn widening(from: Type, to: Type, func: UnaryFn) -> Self {
        OperationDef::Cast {
            from,
            to,
            kind: CastKind::Widening,
            func,
        }
    }

    pub const fn truthiness(from: Type, func: UnaryFn) -> Self {
        OperationDef::Cast {
            from,
            to: Type::BOOL,
            kind: CastKind::Truthiness,
            func,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UnaryOperation {
    pub op: Operator,
    pub operand: Type,
    pub result: Type,
    pub func: UnaryFn,
}

#[derive(Debug, Clone, Copy)]
pub struct BinaryOperation {
    pub op: Operator,
    pub left: Type,
    pub right: Type,
    pub result: Type,
    pub func: BinaryFn,
}

#[derive(Debug, Clone, Copy)]
pub struct Cast {
    pub from: Type,
    pub to: Type,
    pub kind: CastKind,
    pub func: UnaryFn,
}

lazy_static! {
    static ref STANDARD: Registry = Registry::from_tables(ops::STANDARD_TABLES);
}

/// Lookup tables keyed by operator and operand types.
///
/// Registration is first-wins: a later definition for an already
/// registered key is ignored, so lookups always return the first exact
/// match in table order.
#[derive(Default)]
pub struct Registry {
    unary: HashMap<(Operator, Type), UnaryOperation>,
    binary: HashMap<(Operator, Type, Type), BinaryOperation>,
    casts: HashMap<Type, Vec<Cast>>,
}

impl Registry {
    /// The process-wide registry holding the built-in operations.
    pub fn standard() -> &'static Registry {
        &STANDARD
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_tables(tables: &[&[OperationDef]]) -> Self {
        let mut registry = Self::empty();
        for table in tables {
            for def in table.iter() {
                registry.register(*def);
            }
        }
        tracing::debug!(
            unary = registry.unary.len(),
            binary = registry.binary.len(),
            casts = registry.casts.values().map(Vec::len).sum::<usize>(),
            "Built operation registry"
        );
        registry
    }

    pub fn register(&mut self, def: OperationDef) {
        match def {
            OperationDef::Unary {
                op,
                operand,
                result,
                func,
            } => self.register_unary(op, operand, result, func),
            OperationDef::Binary {
                op,
                left,
                right,
                result,
                func,
            } => self.register_binary(op, left, right, result, func),
            OperationDef::Cast {
                from,
                to,
                kind,
                func,
            } => self.register_cast(from, to, kind, func),
        }
    }

    pub fn register_unary(&mut self, op: Operator, operand: Type, result: Type, func: UnaryFn) {
        self.unary.entry((op, operand)).or_insert(UnaryOperation {
            op,
            operand,
            result,
            func,
        });
    }

    pub fn register_binary(
        &mut self,
        op: Operator,
        left: Type,
        right: Type,
        result: Type,
        func: BinaryFn,
    ) {
        self.binary
            .entry((op, left, right))
            .or_insert(BinaryOperation {
                op,
                left,
                right,
                result,
                func,
            });
    }

    pub fn register_cast(&mut self, from: Type, to: Type, kind: CastKind, func: UnaryFn) {
        let casts = self.casts.entry(from).or_default();
        if casts.iter().any(|c| c.to == to) {
            return;
        }
        casts.push(Cast {
            from,
            to,
            kind,
            func,
        });
    }

    pub fn unary(&self, op: Operator, operand: Type) -> Option<&UnaryOperation> {
        let found = self.unary.get(&(op, operand));
        tracing::trace!(%op, %operand, found = found.is_some(), "Unary lookup");
        found
    }

    pub fn binary(&self, op: Operator, left: Type, right: Type) -> Option<&BinaryOperation> {
        let found = self.binary.get(&(op, left, right));
        tracing::trace!(%op, %left, %right, found = found.is_some(), "Binary lookup");
        found
    }

    /// Widening conversions out of `from`, in registration order.
    pub fn widenings(&self, from: Type) -> impl Iterator<Item = &Cast> {
        self.casts_from(from)
            .filter(|c| c.kind == CastKind::Widening)
    }

    pub fn truthiness(&self, from: Type) -> Option<&Cast> {
        self.casts_from(from)
            .find(|c| c.kind == CastKind::Truthiness)
    }

    fn casts_from(&self, from: Type) -> impl Iterator<Item = &Cast> {
        self.casts.get(&from).into_iter().flatten()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("unary", &self.unary.len())
            .field("binary", &self.binary.len())
            .field("casts", &self.casts.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}
