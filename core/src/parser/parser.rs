//! Precedence-climbing parser for filter expressions.
//!
//! Binding powers, lowest first:
//!
//! | level | operators                              |
//! |-------|----------------------------------------|
//! | 1     | `or`                                   |
//! | 2     | `and`                                  |
//! | 3     | prefix `not`                           |
//! | 4     | `== != < > <= >= in contains`          |
//! | 5     | `+ -`                                  |
//! | 6     | `* /`                                  |
//! | 7     | prefix `-`                             |
//!
//! All binary levels are left-associative. Parsing stops at the first
//! error.

use crate::parser::scanner::{AddressLiteral, IntLiteral, Scanner, Spanned, Token};
use crate::parser::{
    BinaryOp, BoolOp, ComparisonOp, Expr, ExprKind, Literal, ParseError, ParseErrorKind, Span,
    UnaryOp,
};
use crate::values::Value;

/// Default maximum nesting depth for expressions.
pub const DEFAULT_MAX_DEPTH: usize = 256;

const NOT_OPERAND_BP: u8 = 4;
const NEG_OPERAND_BP: u8 = 7;

#[derive(Debug, Clone, Copy)]
enum InfixOp {
    Bool(BoolOp),
    Comparison(ComparisonOp),
    Binary(BinaryOp),
}

fn infix_op(token: &Token) -> Option<(InfixOp, u8)> {
    let op = match token {
        Token::Or => (InfixOp::Bool(BoolOp::Or), 1),
        Token::And => (InfixOp::Bool(BoolOp::And), 2),
        Token::EqEq => (InfixOp::Comparison(ComparisonOp::Eq), 4),
        Token::NotEq => (InfixOp::Comparison(ComparisonOp::Neq), 4),
        Token::Less => (InfixOp::Comparison(ComparisonOp::Lt), 4),
        Token::Greater => (InfixOp::Comparison(ComparisonOp::Gt), 4),
        Token::LessEq => (InfixOp::Comparison(ComparisonOp::Le), 4),
        Token::GreaterEq => (InfixOp::Comparison(ComparisonOp::Ge), 4),
        Token::In => (InfixOp::Comparison(ComparisonOp::In), 4),
        Token::Contains => (InfixOp::Comparison(ComparisonOp::Contains), 4),
        Token::Plus => (InfixOp::Binary(BinaryOp::Add), 5),
        Token::Minus => (InfixOp::Binary(BinaryOp::Sub), 5),
        Token::Star => (InfixOp::Binary(BinaryOp::Mul), 6),
        Token::Slash => (InfixOp::Binary(BinaryOp::Div), 6),
        _ => return None,
    };
    Some(op)
}

/// Parse a filter expression with the default nesting limit.
pub fn parse(source: &str) -> Result<Expr, ParseError> {
    parse_with_max_depth(source, DEFAULT_MAX_DEPTH)
}

/// Parse with a custom maximum nesting depth.
pub fn parse_with_max_depth(source: &str, max_depth: usize) -> Result<Expr, ParseError> {
    tracing::debug!(source, max_depth, "Parsing filter");
    let mut parser = Parser::new(source, max_depth);
    let (expr, _) = parser.expression(0)?;
    parser.expect_end()?;
    Ok(expr)
}

/// Parse a single literal value (a scalar, a negated number, or a list of
/// literals of one type).
pub fn parse_literal(source: &str) -> Result<Value, ParseError> {
    let expr = parse(source)?;
    literal_value(&expr)
}

fn literal_value(expr: &Expr) -> Result<Value, ParseError> {
    let not_literal = |found: &str| {
        ParseError::new(
            ParseErrorKind::UnexpectedToken {
                expected: "literal".to_string(),
                found: found.to_string(),
            },
            expr.span.clone(),
        )
    };
    match &expr.kind {
        ExprKind::Literal(literal) => Ok(Value::from(literal.clone())),
        ExprKind::Unary {
            op: UnaryOp::Neg,
            expr: inner,
        } => match &inner.kind {
            ExprKind::Literal(Literal::Int(i)) => Ok(Value::Int(i.wrapping_neg())),
            ExprKind::Literal(Literal::Float(x)) => Ok(Value::Float(-x)),
            _ => Err(not_literal("expression")),
        },
        ExprKind::List(elements) => {
            let mut values = Vec::with_capacity(elements.len());
            for element in elements {
                if matches!(element.kind, ExprKind::List(_)) {
                    return Err(not_literal("nested list"));
                }
                values.push(literal_value(element)?);
            }
            let first_type = values.first().map(Value::scalar_type);
            if let Some(bad) = values.iter().find(|v| Some(v.scalar_type()) != first_type) {
                return Err(not_literal(&format!("mixed list element {}", bad)));
            }
            Ok(Value::List(values))
        }
        ExprKind::Ident(name) => Err(not_literal(&format!("identifier '{}'", name))),
        _ => Err(not_literal("expression")),
    }
}

struct Parser<'src> {
    scanner: Scanner<'src>,
    depth: usize,
    max_depth: usize,
}

impl<'src> Parser<'src> {
    fn new(source: &'src str, max_depth: usize) -> Self {
        Self {
            scanner: Scanner::new(source),
            depth: 0,
            max_depth,
        }
    }

    /// Parses one expression and returns it with its height, counted in
    /// AST nodes along the longest path to a leaf.
    ///
    /// `depth` bounds the recursion of the parser itself; the height bounds
    /// the tree every later pass walks. Left-associative chains grow the
    /// height without recursing, so both are checked against `max_depth`.
    fn expression(&mut self, min_bp: u8) -> Result<(Expr, usize), ParseError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            let span = self.scanner.peek()?.map(|next| next.span.clone());
            let span = span.unwrap_or_else(|| self.scanner.end_span());
            return Err(self.too_deep(span));
        }

        let (mut lhs, mut height) = self.prefix()?;
        loop {
            let Some(next) = self.scanner.peek()? else {
                break;
            };
            let Some((op, bp)) = infix_op(&next.token) else {
                break;
            };
            if bp < min_bp {
                break;
            }
            let op_span = next.span.clone();
            self.scanner.next_token()?;
            let (rhs, rhs_height) = self.expression(bp + 1)?;
            height = self.nest(height.max(rhs_height), &op_span)?;
            let span = Span::combine(&lhs.span, &rhs.span);
            let (left, right) = (Box::new(lhs), Box::new(rhs));
            let kind = match op {
                InfixOp::Bool(op) => ExprKind::Boolean { op, left, right },
                InfixOp::Comparison(op) => ExprKind::Comparison { op, left, right },
                InfixOp::Binary(op) => ExprKind::Binary { op, left, right },
            };
            lhs = Expr::new(kind, span);
        }

        self.depth -= 1;
        Ok((lhs, height))
    }

    /// Height of a node whose tallest child has height `child`.
    fn nest(&self, child: usize, span: &Span) -> Result<usize, ParseError> {
        let height = child + 1;
        if height > self.max_depth {
            return Err(self.too_deep(span.clone()));
        }
        Ok(height)
    }

    fn too_deep(&self, span: Span) -> ParseError {
        ParseError::new(
            ParseErrorKind::MaxDepthExceeded {
                max_depth: self.max_depth,
            },
            span,
        )
    }

    fn prefix(&mut self) -> Result<(Expr, usize), ParseError> {
        let Some(Spanned { token, span }) = self.scanner.next_token()? else {
            return Err(self.unexpected_end("expression"));
        };

        match token {
            Token::Not => {
                let (operand, height) = self.expression(NOT_OPERAND_BP)?;
                let height = self.nest(height, &span)?;
                let span = Span::combine(&span, &operand.span);
                let expr = Expr::new(
                    ExprKind::Unary {
                        op: UnaryOp::Not,
                        expr: Box::new(operand),
                    },
                    span,
                );
                Ok((expr, height))
            }
            Token::Minus => {
                if let Some(min) = self.take_i64_min_magnitude()? {
                    let span = Span::combine(&span, &min);
                    return Ok((Expr::literal(Literal::Int(i64::MIN), span), 1));
                }
                let (operand, height) = self.expression(NEG_OPERAND_BP)?;
                let height = self.nest(height, &span)?;
                let span = Span::combine(&span, &operand.span);
                let expr = Expr::new(
                    ExprKind::Unary {
                        op: UnaryOp::Neg,
                        expr: Box::new(operand),
                    },
                    span,
                );
                Ok((expr, height))
            }
            Token::LParen => {
                let (inner, height) = self.expression(0)?;
                let close = self.expect_closing(Token::RParen, ')', '(')?;
                // Parentheses only affect the span.
                Ok((Expr::new(inner.kind, Span::combine(&span, &close)), height))
            }
            Token::LBracket => self.list(span),
            Token::Bool(b) => Ok((Expr::literal(Literal::Bool(b), span), 1)),
            Token::Integer(int) => Ok((Expr::literal(integer_literal(int), span), 1)),
            Token::Float(x) => Ok((Expr::literal(Literal::Float(x), span), 1)),
            Token::Str(s) => Ok((Expr::literal(Literal::Str(s), span), 1)),
            Token::Address(AddressLiteral::Ip(ip)) => {
                Ok((Expr::literal(Literal::Ip(ip), span), 1))
            }
            Token::Address(AddressLiteral::Mac(mac)) => {
                Ok((Expr::literal(Literal::Mac(mac), span), 1))
            }
            Token::Ident(name) => Ok((Expr::new(ExprKind::Ident(name), span), 1)),
            other => Err(ParseError::new(
                ParseErrorKind::UnexpectedToken {
                    expected: "expression".to_string(),
                    found: other.describe(),
                },
                span,
            )),
        }
    }

    fn list(&mut self, open: Span) -> Result<(Expr, usize), ParseError> {
        let mut elements = Vec::new();
        let empty = matches!(
            self.scanner.peek()?,
            Some(Spanned {
                token: Token::RBracket,
                ..
            })
        );
        if empty {
            let close = self.expect_closing(Token::RBracket, ']', '[')?;
            let expr = Expr::new(ExprKind::List(elements), Span::combine(&open, &close));
            return Ok((expr, 1));
        }

        let mut tallest = 0;
        loop {
            let (element, height) = self.expression(0)?;
            tallest = tallest.max(height);
            elements.push(element);
            let comma = matches!(
                self.scanner.peek()?,
                Some(Spanned {
                    token: Token::Comma,
                    ..
                })
            );
            if !comma {
                break;
            }
            self.scanner.next_token()?;
        }

        let height = self.nest(tallest, &open)?;
        let close = self.expect_closing(Token::RBracket, ']', '[')?;
        let expr = Expr::new(ExprKind::List(elements), Span::combine(&open, &close));
        Ok((expr, height))
    }

    /// `-9223372036854775808` only fits `i64` once negated.
    fn take_i64_min_magnitude(&mut self) -> Result<Option<Span>, ParseError> {
        let magnitude = 1u64 << 63;
        let is_min = matches!(
            self.scanner.peek()?,
            Some(Spanned {
                token: Token::Integer(IntLiteral {
                    value,
                    unsigned: false,
                }),
                ..
            }) if *value == magnitude
        );
        if !is_min {
            return Ok(None);
        }
        Ok(self.scanner.next_token()?.map(|spanned| spanned.span))
    }

    fn expect_closing(
        &mut self,
        expected: Token,
        closing: char,
        opening: char,
    ) -> Result<Span, ParseError> {
        match self.scanner.next_token()? {
            Some(Spanned { token, span }) if token == expected => Ok(span),
            Some(Spanned { token, span }) => Err(ParseError::new(
                ParseErrorKind::UnexpectedToken {
                    expected: format!("'{}'", closing),
                    found: token.describe(),
                },
                span,
            )),
            None => Err(ParseError::new(
                ParseErrorKind::UnclosedDelimiter { delimiter: opening },
                self.scanner.end_span(),
            )),
        }
    }

    fn expect_end(&mut self) -> Result<(), ParseError> {
        match self.scanner.next_token()? {
            None => Ok(()),
            Some(Spanned { token, span }) => Err(ParseError::new(
                ParseErrorKind::UnexpectedToken {
                    expected: "operator or end of input".to_string(),
                    found: token.describe(),
                },
                span,
            )),
        }
    }

    fn unexpected_end(&self, expected: &str) -> ParseError {
        ParseError::new(
            ParseErrorKind::UnexpectedEnd {
                expected: expected.to_string(),
            },
            self.scanner.end_span(),
        )
    }
}

fn integer_literal(int: IntLiteral) -> Literal {
    match int {
        IntLiteral {
            value,
            unsigned: true,
        } => Literal::UInt(value),
        IntLiteral { value, .. } => match i64::try_from(value) {
            Ok(i) => Literal::Int(i),
            Err(_) => Literal::UInt(value),
        },
    }
}
