//! Quoted-string lexer: single/double-quoted or bareword tokens with
//! `\`-escapes, grounded on `attrib_handle`/`name_handle` in the original
//! tool's `html.c`, generalized here for reuse by the pattern compiler.

use crate::error::{PatternError, PatternErrorKind};

/// The result of lexing one token: the unescaped bytes and how many input
/// bytes were consumed (including surrounding quotes, if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    /// The unescaped token contents.
    pub value: Vec<u8>,
    /// Number of bytes of the input consumed producing this token.
    pub consumed: usize,
}

/// Read one token starting at byte `0` of `text`.
///
/// If `text` starts with `"` or `'`, reads a quoted string up to the
/// matching unescaped quote. Otherwise reads a bareword up to whitespace or
/// any byte in `delimiters`. `\\` always collapses to `\`; inside quotes,
/// `\<quote>` collapses to the quote; in barewords, `\<delimiter>` collapses
/// to the delimiter for each byte in `delimiters`.
pub fn lex(text: &[u8], delimiters: &[u8]) -> Result<Lexeme, PatternError> {
    match text.first() {
        Some(&q) if q == b'"' || q == b'\'' => lex_quoted(text, q),
        _ => Ok(lex_bareword(text, delimiters)),
    }
}

fn lex_quoted(text: &[u8], quote: u8) -> Result<Lexeme, PatternError> {
    let mut value = Vec::new();
    let mut i = 1; // skip opening quote
    loop {
        match text.get(i) {
            None => {
                return Err(PatternError::new(
                    i,
                    PatternErrorKind::UnterminatedQuote,
                    "unterminated quoted string",
                ))
            }
            Some(&b) if b == quote => {
                i += 1;
                break;
            }
            Some(&b'\\') => match text.get(i + 1) {
                Some(&next) if next == b'\\' || next == quote => {
                    value.push(next);
                    i += 2;
                }
                _ => {
                    value.push(b'\\');
                    i += 1;
                }
            },
            Some(&b) => {
                value.push(b);
                i += 1;
            }
        }
    }
    Ok(Lexeme { value, consumed: i })
}

fn lex_bareword(text: &[u8], delimiters: &[u8]) -> Lexeme {
    let mut value = Vec::new();
    let mut i = 0;
    while let Some(&b) = text.get(i) {
        if b.is_ascii_whitespace() || delimiters.contains(&b) {
            break;
        }
        if b == b'\\' {
            match text.get(i + 1) {
                Some(&next) if next == b'\\' || delimiters.contains(&next) => {
                    value.push(next);
                    i += 2;
                    continue;
                }
                _ => {
                    value.push(b'\\');
                    i += 1;
                    continue;
                }
            }
        }
        value.push(b);
        i += 1;
    }
    Lexeme { value, consumed: i }
}
