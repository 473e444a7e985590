//! Lowering of the typed AST to the evaluation tree.
//!
//! The evaluation tree mirrors the resolved AST one node for one node, with
//! every implicit cast turned into its own unary node. Operations stay bound
//! to the functions chosen during resolution; nothing is looked up again.

mod error;
mod eval_tree;


pub use error::CompileError;
pub use eval_tree::{EvalNode, lower};
