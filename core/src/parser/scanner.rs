//! Lexical scanner for filter expressions.
//!
//! Tokens are produced on demand from a cursor over the source text. The
//! token set is declared with `logos`; literal payloads (numbers, strings,
//! addresses) are decoded by the token callbacks so the parser only ever
//! sees typed payloads.

use logos::{Lexer, Logos};

use crate::parser::Span;
use crate::parser::error::{ParseError, ParseErrorKind};
use crate::syntax::string_literal::{UnescapeError, unescape_string};
use crate::values::{IpPrefix, MacAddr};

/// Failure modes reported by token callbacks.
#[derive(Debug, Clone, PartialEq, Default, thiserror::Error)]
pub enum LexError {
    /// No token matches at this position.
    #[default]
    #[error("unexpected character")]
    UnexpectedCharacter,
    #[error("integer literal out of range")]
    InvalidNumber,
    #[error("invalid address literal")]
    InvalidAddress,
    #[error("{0}")]
    InvalidEscape(UnescapeError),
    #[error("unterminated string literal")]
    UnterminatedString,
}

/// An integer literal before signedness is settled.
///
/// Unsuffixed literals that do not fit `i64` are promoted to unsigned by
/// the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntLiteral {
    pub value: u64,
    pub unsigned: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressLiteral {
    Ip(IpPrefix),
    Mac(MacAddr),
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(error = LexError)]
pub enum Token {
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(",")]
    Comma,

    #[token("==")]
    EqEq,

    #[token("!=")]
    NotEq,

    #[token("<=")]
    LessEq,

    #[token(">=")]
    GreaterEq,

    #[token("<")]
    Less,

    #[token(">")]
    Greater,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("and")]
    And,

    #[token("or")]
    Or,

    #[token("not")]
    Not,

    #[token("in")]
    In,

    #[token("contains")]
    Contains,

    #[token("true", |_| true)]
    #[token("false", |_| false)]
    Bool(bool),

    #[regex(r"[0-9]+u?", decimal_literal)]
    #[regex(r"0[xX][0-9a-fA-F]+u?", hex_literal)]
    Integer(IntLiteral),

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", float_literal)]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", float_literal)]
    Float(f64),

    // Strict double/single quoted strings (must be closed)
    #[regex(r#""(?:[^"\\]|\\.)*""#, string_literal)]
    #[regex(r#"'(?:[^'\\]|\\.)*'"#, string_literal)]
    Str(String),

    #[regex(r#""(?:[^"\\]|\\.)*"#, unterminated_string)]
    #[regex(r#"'(?:[^'\\]|\\.)*"#, unterminated_string)]
    UnterminatedStr,

    #[regex(r"[0-9]+\.[0-9]+\.[0-9]+\.[0-9]+(/[0-9]+)?", ipv4_literal)]
    #[regex(r"[0-9a-fA-F]*:[0-9a-fA-F:.]*(/[0-9]+)?", colon_address_literal)]
    Address(AddressLiteral),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*", |lex| lex.slice().to_string())]
    Ident(String),
}

fn decimal_literal(lex: &mut Lexer<Token>) -> Result<IntLiteral, LexError> {
    let text = lex.slice();
    let (digits, unsigned) = match text.strip_suffix('u') {
        Some(digits) => (digits, true),
        None => (text, false),
    };
    let value = digits
        .parse::<u64>()
        .map_err(|_| LexError::InvalidNumber)?;
    Ok(IntLiteral { value, unsigned })
}

fn hex_literal(lex: &mut Lexer<Token>) -> Result<IntLiteral, LexError> {
    let text = &lex.slice()[2..];
    let (digits, unsigned) = match text.strip_suffix('u') {
        Some(digits) => (digits, true),
        None => (text, false),
    };
    let value = u64::from_str_radix(digits, 16).map_err(|_| LexError::InvalidNumber)?;
    Ok(IntLiteral { value, unsigned })
}

fn float_literal(lex: &mut Lexer<Token>) -> Result<f64, LexError> {
    lex.slice()
        .parse::<f64>()
        .map_err(|_| LexError::InvalidNumber)
}

fn string_literal(lex: &mut Lexer<Token>) -> Result<String, LexError> {
    let s = lex.slice();
    unescape_string(&s[1..s.len() - 1]).map_err(LexError::InvalidEscape)
}

fn unterminated_string(_lex: &mut Lexer<Token>) -> Result<(), LexError> {
    Err(LexError::UnterminatedString)
}

fn ipv4_literal(lex: &mut Lexer<Token>) -> Result<AddressLiteral, LexError> {
    lex.slice()
        .parse::<IpPrefix>()
        .map(AddressLiteral::Ip)
        .map_err(|_| LexError::InvalidAddress)
}

/// MAC addresses and IPv6 addresses share the colon-separated shape; six
/// two-digit groups without a prefix is a MAC, anything else must be IPv6.
fn colon_address_literal(lex: &mut Lexer<Token>) -> Result<AddressLiteral, LexError> {
    let text = lex.slice();
    if let Ok(mac) = text.parse::<MacAddr>() {
        return Ok(AddressLiteral::Mac(mac));
    }
    text.parse::<IpPrefix>()
        .map(AddressLiteral::Ip)
        .map_err(|_| LexError::InvalidAddress)
}

impl Token {
    /// Human-readable token description for error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::Comma => "','".to_string(),
            Token::EqEq => "'=='".to_string(),
            Token::NotEq => "'!='".to_string(),
            Token::LessEq => "'<='".to_string(),
            Token::GreaterEq => "'>='".to_string(),
            Token::Less => "'<'".to_string(),
            Token::Greater => "'>'".to_string(),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::And => "'and'".to_string(),
            Token::Or => "'or'".to_string(),
            Token::Not => "'not'".to_string(),
            Token::In => "'in'".to_string(),
            Token::Contains => "'contains'".to_string(),
            Token::Bool(_) => "boolean".to_string(),
            Token::Integer(_) => "integer".to_string(),
            Token::Float(_) => "floating-point number".to_string(),
            Token::Str(_) | Token::UnterminatedStr => "string".to_string(),
            Token::Address(AddressLiteral::Ip(_)) => "IP address".to_string(),
            Token::Address(AddressLiteral::Mac(_)) => "MAC address".to_string(),
            Token::Ident(name) => format!("identifier '{}'", name),
        }
    }
}

/// A token with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub span: Span,
}

/// On-demand token stream with one token of lookahead.
pub struct Scanner<'src> {
    lexer: Lexer<'src, Token>,
    peeked: Option<Option<Spanned>>,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            lexer: Token::lexer(source),
            peeked: None,
        }
    }

    pub fn source(&self) -> &'src str {
        self.lexer.source()
    }

    /// Returns the next token, `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Spanned>, ParseError> {
        match self.peeked.take() {
            Some(peeked) => Ok(peeked),
            None => self.scan(),
        }
    }

    pub fn peek(&mut self) -> Result<Option<&Spanned>, ParseError> {
        if self.peeked.is_none() {
            let next = self.scan()?;
            self.peeked = Some(next);
        }
        Ok(self.peeked.as_ref().and_then(|p| p.as_ref()))
    }

    /// Span used for "unexpected end of input" errors.
    pub fn end_span(&self) -> Span {
        let len = self.lexer.source().len();
        Span::new(len, len)
    }

    fn scan(&mut self) -> Result<Option<Spanned>, ParseError> {
        let Some(result) = self.lexer.next() else {
            return Ok(None);
        };
        let span = Span(self.lexer.span());
        match result {
            Ok(token) => Ok(Some(Spanned { token, span })),
            Err(kind) => Err(lex_error(kind, self.lexer.slice(), span)),
        }
    }
}

fn lex_error(kind: LexError, text: &str, span: Span) -> ParseError {
    let kind = match kind {
        LexError::UnexpectedCharacter => ParseErrorKind::UnexpectedCharacter {
            found: text.chars().next().unwrap_or('\0'),
        },
        LexError::InvalidNumber => ParseErrorKind::InvalidNumber {
            text: text.to_string(),
        },
        LexError::InvalidAddress => ParseErrorKind::InvalidAddress {
            text: text.to_string(),
        },
        LexError::InvalidEscape(err) => ParseErrorKind::InvalidEscape {
            message: err.to_string(),
        },
        LexError::UnterminatedString => ParseErrorKind::UnterminatedString,
    };
    ParseError::new(kind, span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(source: &str) -> Vec<Token> {
        let mut scanner = Scanner::new(source);
        let mut out = Vec::new();
        while let Some(spanned) = scanner.next_token().expect("scan failed") {
            out.push(spanned.token);
        }
        out
    }

    fn scan_error(source: &str) -> ParseError {
        let mut scanner = Scanner::new(source);
        loop {
            match scanner.next_token() {
                Ok(Some(_)) => continue,
                Ok(None) => panic!("expected a lexical error for {:?}", source),
                Err(err) => return err,
            }
        }
    }

    fn int(value: u64, unsigned: bool) -> Token {
        Token::Integer(IntLiteral { value, unsigned })
    }

    #[test]
    fn test_operators_and_keywords() {
        assert_eq!(
            tokens("a == 1 and not b.c in [2, 3] or d contains 'x'"),
            vec![
                Token::Ident("a".to_string()),
                Token::EqEq,
                int(1, false),
                Token::And,
                Token::Not,
                Token::Ident("b.c".to_string()),
                Token::In,
                Token::LBracket,
                int(2, false),
                Token::Comma,
                int(3, false),
                Token::RBracket,
                Token::Or,
                Token::Ident("d".to_string()),
                Token::Contains,
                Token::Str("x".to_string()),
            ]
        );
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        assert_eq!(
            tokens("index order nothing"),
            vec![
                Token::Ident("index".to_string()),
                Token::Ident("order".to_string()),
                Token::Ident("nothing".to_string()),
            ]
        );
    }

    #[test]
    fn test_numeric_literals() {
        assert_eq!(
            tokens("42 42u 0x1F 0xffu 1.5 2e3 2.5e-1"),
            vec![
                int(42, false),
                int(42, true),
                int(31, false),
                int(255, true),
                Token::Float(1.5),
                Token::Float(2000.0),
                Token::Float(0.25),
            ]
        );
    }

    #[test]
    fn test_address_literals() {
        let toks = tokens("10.0.0.1 10.0.0.0/8 ::1 fe80::1/64 00:11:22:aa:bb:cc");
        assert_eq!(
            toks,
            vec![
                Token::Address(AddressLiteral::Ip("10.0.0.1".parse().unwrap())),
                Token::Address(AddressLiteral::Ip("10.0.0.0/8".parse().unwrap())),
                Token::Address(AddressLiteral::Ip("::1".parse().unwrap())),
                Token::Address(AddressLiteral::Ip("fe80::1/64".parse().unwrap())),
                Token::Address(AddressLiteral::Mac("00:11:22:aa:bb:cc".parse().unwrap())),
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            tokens(r#""a\"b" 'c\n'"#),
            vec![Token::Str("a\"b".to_string()), Token::Str("c\n".to_string())]
        );
    }

    #[test]
    fn test_spans() {
        let mut scanner = Scanner::new("  port >= 80");
        let first = scanner.next_token().unwrap().unwrap();
        assert_eq!(first.span, Span::new(2, 6));
        assert_eq!(scanner.peek().unwrap().unwrap().span, Span::new(7, 9));
        let second = scanner.next_token().unwrap().unwrap();
        assert_eq!(second.token, Token::GreaterEq);
        let third = scanner.next_token().unwrap().unwrap();
        assert_eq!(third.span, Span::new(10, 12));
        assert_eq!(scanner.next_token().unwrap(), None);
    }

    #[test]
    fn test_unexpected_character() {
        let err = scan_error("port == 80 & 1");
        assert_eq!(err.span, Span::new(11, 12));
        assert!(matches!(
            err.kind,
            ParseErrorKind::UnexpectedCharacter { found: '&' }
        ));
    }

    #[test]
    fn test_unterminated_string() {
        let err = scan_error("name == \"abc");
        assert!(matches!(err.kind, ParseErrorKind::UnterminatedString));
    }

    #[test]
    fn test_invalid_escape() {
        let err = scan_error(r#"name == "a\qb""#);
        assert!(matches!(err.kind, ParseErrorKind::InvalidEscape { .. }));
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(matches!(
            scan_error("ip == 300.1.1.1").kind,
            ParseErrorKind::InvalidAddress { .. }
        ));
        assert!(matches!(
            scan_error("ip == 10.0.0.0/40").kind,
            ParseErrorKind::InvalidAddress { .. }
        ));
    }

    #[test]
    fn test_integer_overflow() {
        assert!(matches!(
            scan_error("99999999999999999999").kind,
            ParseErrorKind::InvalidNumber { .. }
        ));
    }
}
