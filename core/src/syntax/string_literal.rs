/// String literal escaping and unescaping for filter syntax.
///
/// This module provides utilities for converting between:
/// - Runtime strings (e.g., "hello\n" with actual newline character)
/// - Filter source string literals (e.g., "hello\n" with backslash-n sequence)
use core::fmt;

/// Controls which quote style to use when escaping strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteStyle {
    /// Always use single quotes: `'...'`
    AlwaysSingle,
    /// Always use double quotes: `"..."`
    AlwaysDouble,
    /// Prefer single quotes, use double if string contains single quotes but not double
    PreferSingle,
    /// Prefer double quotes, use single if string contains double quotes but not single
    #[default]
    PreferDouble,
}

/// Errors that can occur when unescaping string literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnescapeError {
    /// Invalid escape sequence (e.g., `\q`)
    InvalidEscape { pos: usize, seq: String },
    /// Invalid hex digit in Unicode escape
    InvalidHexDigit { pos: usize, seq: String },
    /// Incomplete Unicode escape (not enough digits)
    IncompleteUnicodeEscape {
        pos: usize,
        expected: usize,
        got: usize,
    },
    /// Invalid Unicode scalar value
    InvalidUnicodeScalar { pos: usize, value: u32 },
}

impl fmt::Display for UnescapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnescapeError::InvalidEscape { pos, seq } => {
                write!(f, "invalid escape sequence '{}' at position {}", seq, pos)
            }
            UnescapeError::InvalidHexDigit { pos, seq } => {
                write!(f, "invalid hex digit in '{}' at position {}", seq, pos)
            }
            UnescapeError::IncompleteUnicodeEscape { pos, expected, got } => {
                write!(
                    f,
                    "incomplete Unicode escape at position {}: expected {} digits, got {}",
                    pos, expected, got
                )
            }
            UnescapeError::InvalidUnicodeScalar { pos, value } => {
                write!(
                    f,
                    "invalid Unicode scalar value U+{:X} at position {}",
                    value, pos
                )
            }
        }
    }
}

/// Escape special characters in strings for filter string literals.
///
/// Converts runtime strings to their source code representation by escaping
/// quotes, backslashes, `\n`, `\r`, `\t`, `\0` and other control characters
/// (as `\uNNNN`). The quote character is chosen from `style`.
pub fn escape_string(f: &mut impl fmt::Write, s: &str, style: QuoteStyle) -> fmt::Result {
    let quote_char = match style {
        QuoteStyle::AlwaysDouble => '"',
        QuoteStyle::AlwaysSingle => '\'',
        QuoteStyle::PreferDouble => {
            if s.contains('"') && !s.contains('\'') {
                '\''
            } else {
                '"'
            }
        }
        QuoteStyle::PreferSingle => {
            if s.contains('\'') && !s.contains('"') {
                '"'
            } else {
                '\''
            }
        }
    };

    f.write_char(quote_char)?;

    for ch in s.chars() {
        match ch {
            c if c == quote_char => write!(f, "\\{}", quote_char)?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\0' => f.write_str("\\0")?,
            c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }

    f.write_char(quote_char)
}

/// Unescape the content of a string literal (without surrounding quotes).
///
/// Supports `\n`, `\r`, `\t`, `\\`, `\"`, `\'`, `\0`, `\uNNNN` and
/// `\UNNNNNNNN`. Positions in errors are byte offsets into `input`.
pub fn unescape_string(input: &str) -> Result<String, UnescapeError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        if ch != '\\' {
            output.push(ch);
            continue;
        }

        match chars.next() {
            Some((_, 'n')) => output.push('\n'),
            Some((_, 'r')) => output.push('\r'),
            Some((_, 't')) => output.push('\t'),
            Some((_, '0')) => output.push('\0'),
            Some((_, '\\')) => output.push('\\'),
            Some((_, '"')) => output.push('"'),
            Some((_, '\'')) => output.push('\''),
            Some((_, 'u')) => output.push(unescape_unicode(&mut chars, pos, 4, 'u')?),
            Some((_, 'U')) => output.push(unescape_unicode(&mut chars, pos, 8, 'U')?),
            Some((_, other)) => {
                return Err(UnescapeError::InvalidEscape {
                    pos,
                    seq: format!("\\{}", other),
                });
            }
            None => {
                return Err(UnescapeError::InvalidEscape {
                    pos,
                    seq: "\\".to_string(),
                });
            }
        }
    }

    Ok(output)
}

fn unescape_unicode(
    chars: &mut impl Iterator<Item = (usize, char)>,
    pos: usize,
    digits: usize,
    marker: char,
) -> Result<char, UnescapeError> {
    let mut hex_value = 0u32;
    for got in 0..digits {
        match chars.next() {
            Some((_, ch)) => match ch.to_digit(16) {
                Some(digit) => hex_value = (hex_value << 4) | digit,
                None => {
                    return Err(UnescapeError::InvalidHexDigit {
                        pos,
                        seq: format!("\\{}{}", marker, ch),
                    });
                }
            },
            None => {
                return Err(UnescapeError::IncompleteUnicodeEscape {
                    pos,
                    expected: digits,
                    got,
                });
            }
        }
    }
    char::from_u32(hex_value).ok_or(UnescapeError::InvalidUnicodeScalar {
        pos,
        value: hex_value,
    })
}
