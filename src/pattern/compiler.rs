//! Pattern DSL compiler: `spec.md` §4.F.
//!
//! ```text
//! pattern := [!] tag-term (WS attribute-pred | WS hook)* [range]
//! attribute-pred := ("+"|"-") attr-term ["=" value-term]
//! hook := "@" name "(" arg ")"
//! ```
//!
//! `-i`/`-v`/`-E` are CLI-level flags (`spec.md` §6) rather than per-pattern
//! syntax; this compiler takes them as `defaults: TermFlags` applied to
//! every term it compiles, with a leading `!` on the tag term XORing the
//! default invert flag for that term only.

use crate::error::{Error, PatternError, PatternErrorKind};
use crate::lexer::lex;
use crate::range::{Endpoint, Range, RangeList};
use crate::term::{Term, TermFlags};

use super::hook::{Hook, HookArg, HookKind};
use super::{AttributePredicate, Pattern};

/// Bytes that end a bareword term because they carry structural meaning one
/// level up, at the expression compiler (`spec.md` §4.G).
const TERM_DELIMITERS: &[u8] = b",;{}|";

/// Compile `text` into a [`Pattern`], returning the pattern and the number
/// of bytes of `text` it consumed. Compilation stops as soon as it reaches a
/// byte that cannot continue the pattern grammar, so the expression compiler
/// can hand it a whole remaining buffer and use the returned length to find
/// where the pattern ends.
pub fn compile(text: &[u8], defaults: TermFlags) -> Result<(Pattern, usize), Error> {
    let mut pos = 0;

    let mut invert = defaults.invert;
    if text.first() == Some(&b'!') {
        invert = !invert;
        pos += 1;
    }

    let tag_flags = TermFlags { invert, ..defaults };
    let (tag, consumed) = compile_term(&text[pos..], tag_flags, TERM_DELIMITERS)
        .map_err(|e| offset_error(e, pos))?;
    pos += consumed;

    let mut pattern = Pattern {
        tag,
        attribute_predicates: Vec::new(),
        hooks: Vec::new(),
        sibling_range: RangeList::all(),
    };
    let mut has_sibling_range = false;

    loop {
        let before_ws = pos;
        skip_ws(text, &mut pos);
        match text.get(pos) {
            Some(&b'+') | Some(&b'-') => {
                let positive = text[pos] == b'+';
                pos += 1;
                let predicate = compile_attribute_predicate(text, &mut pos, defaults)
                    .map_err(|e| offset_error(e, pos))?;
                pattern.attribute_predicates.push(AttributePredicate {
                    positive,
                    name: predicate.0,
                    value: predicate.1,
                });
            }
            Some(&b'@') => {
                pos += 1;
                let hook = compile_hook(text, &mut pos).map_err(|e| offset_error(e, pos))?;
                pattern.hooks.push(hook);
            }
            Some(&b'[') => {
                if has_sibling_range {
                    return Err(Error::Pattern(PatternError::new(
                        pos,
                        PatternErrorKind::Syntax,
                        "duplicate sibling-position range",
                    )));
                }
                let (range, consumed) =
                    RangeList::parse(&text[pos..]).map_err(|e| offset_error(e, pos))?;
                pattern.sibling_range = range;
                has_sibling_range = true;
                pos += consumed;
            }
            _ => {
                pos = before_ws;
                break;
            }
        }
    }

    Ok((pattern, pos))
}

fn compile_attribute_predicate(
    text: &[u8],
    pos: &mut usize,
    defaults: TermFlags,
) -> Result<(Term, Option<Term>), PatternError> {
    let name_flags = TermFlags {
        case_insensitive: defaults.case_insensitive,
        invert: false,
        whole_word: false,
    };
    let (name, consumed) = compile_term(&text[*pos..], name_flags, b"=,;{}|")?;
    *pos += consumed;

    if text.get(*pos) == Some(&b'=') {
        *pos += 1;
        let (value, consumed) = compile_term(&text[*pos..], name_flags, TERM_DELIMITERS)?;
        *pos += consumed;
        Ok((name, Some(value)))
    } else {
        Ok((name, None))
    }
}

fn compile_hook(text: &[u8], pos: &mut usize) -> Result<Hook, PatternError> {
    let name_byte = *text.get(*pos).ok_or_else(|| {
        PatternError::new(*pos, PatternErrorKind::Syntax, "expected hook name after '@'")
    })?;
    let kind = HookKind::from_byte(name_byte).ok_or_else(|| {
        PatternError::new(
            *pos,
            PatternErrorKind::UnknownHook,
            format!("unknown hook '{}'", name_byte as char),
        )
    })?;
    *pos += 1;

    if text.get(*pos) != Some(&b'(') {
        return Err(PatternError::new(
            *pos,
            PatternErrorKind::Syntax,
            "expected '(' after hook name",
        ));
    }
    *pos += 1;

    let close = text[*pos..].iter().position(|&b| b == b')').ok_or_else(|| {
        PatternError::new(*pos, PatternErrorKind::Syntax, "unterminated hook argument")
    })?;
    let arg_bytes = &text[*pos..*pos + close];
    let range = parse_hook_range(arg_bytes, *pos)?;
    *pos += close + 1;

    Ok(Hook::new(kind, HookArg::Range(range)))
}

/// Parse a single hook range argument (`2:5`, `-1`, `1000:`), allowing empty
/// endpoints to mean "unbounded" — a relaxation the bracketed `[a:b:c]`
/// range-list grammar (`spec.md` §4.A) does not offer, but the examples in
/// `spec.md` §4.F (`@s(1000:)`) require.
fn parse_hook_range(arg: &[u8], base_offset: usize) -> Result<RangeList, PatternError> {
    let parts: Vec<&[u8]> = arg.split(|&b| b == b':').collect();
    let endpoint = |part: &[u8], default: Endpoint| -> Result<Endpoint, PatternError> {
        let trimmed = trim_ascii(part);
        if trimmed.is_empty() {
            return Ok(default);
        }
        if let Some(rest) = trimmed.strip_prefix(b"-") {
            parse_usize(rest, base_offset).map(Endpoint::FromEnd)
        } else {
            parse_usize(trimmed, base_offset).map(Endpoint::Absolute)
        }
    };

    let range = match parts.as_slice() {
        [a] => Range::Point(endpoint(a, Endpoint::Absolute(0))?),
        [a, b] => Range::Interval(
            endpoint(a, Endpoint::Absolute(0))?,
            endpoint(b, Endpoint::Absolute(usize::MAX))?,
        ),
        [a, b, c] => {
            let stride = {
                let trimmed = trim_ascii(c);
                if trimmed.is_empty() {
                    0
                } else {
                    parse_usize(trimmed, base_offset)?
                }
            };
            Range::Strided(
                endpoint(a, Endpoint::Absolute(0))?,
                endpoint(b, Endpoint::Absolute(usize::MAX))?,
                stride,
            )
        }
        _ => {
            return Err(PatternError::new(
                base_offset,
                PatternErrorKind::Syntax,
                "expected 'a', 'a:b' or 'a:b:c' hook argument",
            ))
        }
    };
    Ok(RangeList::from_ranges(vec![range]))
}

fn parse_usize(b: &[u8], offset: usize) -> Result<usize, PatternError> {
    std::str::from_utf8(b)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            PatternError::new(
                offset,
                PatternErrorKind::Syntax,
                format!("expected integer in hook argument, got {:?}", String::from_utf8_lossy(b)),
            )
        })
}

fn trim_ascii(b: &[u8]) -> &[u8] {
    let start = b.iter().position(|c| !c.is_ascii_whitespace()).unwrap_or(b.len());
    let end = b.iter().rposition(|c| !c.is_ascii_whitespace()).map_or(start, |p| p + 1);
    &b[start..end]
}

/// Compile one term: a `/regex/` if `text` starts with `/`, otherwise a
/// literal read via the quoted-string/bareword lexer.
fn compile_term(text: &[u8], flags: TermFlags, delimiters: &[u8]) -> Result<(Term, usize), PatternError> {
    if text.first() == Some(&b'/') {
        let (pattern, consumed) = read_regex_literal(text)?;
        let term = Term::regex(&pattern, flags, RangeList::all())
            .map_err(|_| PatternError::new(0, PatternErrorKind::Syntax, "invalid regex"))?;
        Ok((term, consumed))
    } else {
        let lexeme = lex(text, delimiters)?;
        // A bare `*` is the wildcard term: matches any target. An empty
        // literal already matches everything (`find`/`find_ci` treat an
        // empty needle as found at offset 0), so this reduces to an empty
        // literal rather than needing a distinct `Term` variant.
        let value = if lexeme.value == b"*" { Vec::new() } else { lexeme.value };
        Ok((Term::literal(value, flags, RangeList::all()), lexeme.consumed))
    }
}

fn read_regex_literal(text: &[u8]) -> Result<(String, usize), PatternError> {
    let mut value = Vec::new();
    let mut i = 1; // skip leading '/'
    loop {
        match text.get(i) {
            None => {
                return Err(PatternError::new(
                    i,
                    PatternErrorKind::UnterminatedQuote,
                    "unterminated regex literal",
                ))
            }
            Some(&b'/') => {
                i += 1;
                break;
            }
            Some(&b'\\') => match text.get(i + 1) {
                Some(&next) if next == b'\\' || next == b'/' => {
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
    let pattern = String::from_utf8(value)
        .map_err(|_| PatternError::new(0, PatternErrorKind::Syntax, "regex literal is not valid UTF-8"))?;
    Ok((pattern, i))
}

fn skip_ws(text: &[u8], pos: &mut usize) {
    while text.get(*pos).is_some_and(|b| b.is_ascii_whitespace()) {
        *pos += 1;
    }
}

fn offset_error(err: PatternError, base: usize) -> Error {
    Error::Pattern(PatternError::new(base + err.offset, err.kind, err.detail))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_bare_tag_term() {
        let (pattern, consumed) = compile(b"div", TermFlags::default()).unwrap();
        assert_eq!(consumed, 3);
        assert!(pattern.tag.text_matches(b"div"));
    }

    #[test]
    fn stops_at_expression_delimiters() {
        let (_, consumed) = compile(b"div; span", TermFlags::default()).unwrap();
        assert_eq!(consumed, 3);
    }

    #[test]
    fn bang_inverts_tag_term() {
        let (pattern, _) = compile(b"!div", TermFlags::default()).unwrap();
        assert!(!pattern.tag.text_matches(b"div"));
        assert!(pattern.tag.text_matches(b"span"));
    }

    #[test]
    fn attribute_predicate_with_value() {
        let (pattern, _) = compile(br#"a +href="x""#, TermFlags::default()).unwrap();
        assert_eq!(pattern.attribute_predicates.len(), 1);
        assert!(pattern.attribute_predicates[0].positive);
        assert!(pattern.attribute_predicates[0]
            .value
            .as_ref()
            .unwrap()
            .text_matches(b"x"));
    }

    #[test]
    fn negative_attribute_predicate_has_no_value() {
        let (pattern, _) = compile(b"a -href", TermFlags::default()).unwrap();
        assert!(!pattern.attribute_predicates[0].positive);
        assert!(pattern.attribute_predicates[0].value.is_none());
    }

    #[test]
    fn hook_compiles_range_argument() {
        let (pattern, _) = compile(b"* @c(2:5)", TermFlags::default()).unwrap();
        assert_eq!(pattern.hooks.len(), 1);
        assert_eq!(*pattern.hooks[0].kind(), HookKind::ChildCount);
    }

    #[test]
    fn hook_with_open_upper_bound() {
        let (pattern, _) = compile(b"* @s(1000:)", TermFlags::default()).unwrap();
        let HookArg::Range(range) = pattern.hooks[0].arg() else {
            panic!("expected range arg");
        };
        assert!(range.matches(5000, 5000));
        assert!(!range.matches(500, 500));
    }

    #[test]
    fn unknown_hook_name_is_an_error() {
        let err = compile(b"* @z(1)", TermFlags::default()).unwrap_err();
        match err {
            Error::Pattern(e) => assert_eq!(e.kind, PatternErrorKind::UnknownHook),
            _ => panic!("expected pattern error"),
        }
    }

    #[test]
    fn sibling_range_is_parsed_once() {
        let (pattern, consumed) = compile(b"li[1]", TermFlags::default()).unwrap();
        assert_eq!(consumed, 5);
        assert!(pattern.sibling_range.matches(1, 2));
    }

    #[test]
    fn regex_tag_term() {
        let (pattern, consumed) = compile(br"/^h\d$/", TermFlags::default()).unwrap();
        assert_eq!(consumed, 7);
        assert!(pattern.tag.text_matches(b"h1"));
    }
}
