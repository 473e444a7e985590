mod parsed_expr;
pub mod parser;
pub mod scanner;
mod syntax;
pub mod error;

pub use parser::DEFAULT_MAX_DEPTH;
pub use parser::parse;
pub use parser::parse_literal;
pub use parser::parse_with_max_depth;

pub use parsed_expr::{Expr, ExprKind, Literal};
pub use scanner::{LexError, Scanner, Token};
pub use syntax::{BinaryOp, BoolOp, ComparisonOp, Operator, Span, UnaryOp};
pub use error::{ParseError, ParseErrorKind};

#[cfg(test)]
mod parse_test;
