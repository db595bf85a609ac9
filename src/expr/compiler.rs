//! Expression DSL compiler: `spec.md` §4.G.
//!
//! ```text
//! expr := seq ("," seq)*
//! seq  := step (";" step)*
//! step := pattern | "{" expr "}"
//! ```
//!
//! A step (pattern or group) may be followed by a node-format string
//! (`|"…"`) and/or an expression-format string (`/"…"`).

use crate::error::{Error, PatternError, PatternErrorKind};
use crate::lexer::lex;
use crate::pattern;
use crate::term::TermFlags;

use super::ExprNode;

/// Maximum nesting depth of `{…}` groups (`SPEC_FULL.md` stage limits).
const MAX_GROUP_DEPTH: usize = 64;

/// Compile an expression-pipeline string into an [`ExprNode`] tree.
pub fn compile(text: &[u8], defaults: TermFlags) -> Result<ExprNode, Error> {
    let mut pos = 0;
    let node = parse_expr(text, &mut pos, 0, defaults)?;
    skip_ws(text, &mut pos);
    if pos != text.len() {
        return Err(Error::Pattern(PatternError::new(
            pos,
            PatternErrorKind::Syntax,
            "unexpected trailing text",
        )));
    }
    Ok(node)
}

fn parse_expr(text: &[u8], pos: &mut usize, depth: usize, defaults: TermFlags) -> Result<ExprNode, Error> {
    let mut branches = vec![parse_seq(text, pos, depth, defaults)?];
    loop {
        skip_ws(text, pos);
        if text.get(*pos) == Some(&b',') {
            *pos += 1;
            branches.push(parse_seq(text, pos, depth, defaults)?);
        } else {
            break;
        }
    }
    Ok(if branches.len() == 1 {
        branches.pop().unwrap()
    } else {
        ExprNode::Alternatives(branches)
    })
}

fn parse_seq(text: &[u8], pos: &mut usize, depth: usize, defaults: TermFlags) -> Result<ExprNode, Error> {
    let mut steps = vec![parse_step(text, pos, depth, defaults)?];
    loop {
        skip_ws(text, pos);
        if text.get(*pos) == Some(&b';') {
            *pos += 1;
            steps.push(parse_step(text, pos, depth, defaults)?);
        } else {
            break;
        }
    }
    Ok(if steps.len() == 1 {
        steps.pop().unwrap()
    } else {
        ExprNode::Sequence(steps)
    })
}

fn parse_step(text: &[u8], pos: &mut usize, depth: usize, defaults: TermFlags) -> Result<ExprNode, Error> {
    skip_ws(text, pos);
    if text.get(*pos) == Some(&b'{') {
        if depth + 1 > MAX_GROUP_DEPTH {
            return Err(Error::Pattern(PatternError::new(
                *pos,
                PatternErrorKind::NestingTooDeep,
                "group nesting exceeds the supported depth",
            )));
        }
        *pos += 1;
        let inner = parse_expr(text, pos, depth + 1, defaults)?;
        skip_ws(text, pos);
        if text.get(*pos) != Some(&b'}') {
            return Err(Error::Pattern(PatternError::new(
                *pos,
                PatternErrorKind::Syntax,
                "expected '}' to close group",
            )));
        }
        *pos += 1;
        let (node_format, expr_format) = parse_trailing_formats(text, pos)?;
        Ok(ExprNode::Group {
            body: Box::new(inner),
            node_format,
            expr_format,
        })
    } else {
        let remaining = &text[*pos..];
        if remaining.is_empty() {
            return Err(Error::Pattern(PatternError::new(
                *pos,
                PatternErrorKind::Syntax,
                "expected a pattern",
            )));
        }
        let (pattern, consumed) = pattern::compile(remaining, defaults)?;
        *pos += consumed;
        let (node_format, expr_format) = parse_trailing_formats(text, pos)?;
        Ok(ExprNode::Leaf {
            pattern,
            node_format,
            expr_format,
        })
    }
}

fn parse_trailing_formats(
    text: &[u8],
    pos: &mut usize,
) -> Result<(Option<String>, Option<String>), Error> {
    let node_format = parse_quoted_suffix(text, pos, b'|')?;
    let expr_format = parse_quoted_suffix(text, pos, b'/')?;
    Ok((node_format, expr_format))
}

fn parse_quoted_suffix(text: &[u8], pos: &mut usize, marker: u8) -> Result<Option<String>, Error> {
    let before = *pos;
    skip_ws(text, pos);
    if text.get(*pos) != Some(&marker) {
        *pos = before;
        return Ok(None);
    }
    let quote_pos = *pos + 1;
    match text.get(quote_pos) {
        Some(&q) if q == b'"' || q == b'\'' => {
            let lexeme = lex(&text[quote_pos..], &[])
                .map_err(|e| Error::Pattern(PatternError::new(quote_pos + e.offset, e.kind, e.detail)))?;
            *pos = quote_pos + lexeme.consumed;
            let text = String::from_utf8(lexeme.value).map_err(|_| {
                Error::Pattern(PatternError::new(
                    quote_pos,
                    PatternErrorKind::Syntax,
                    "format string is not valid UTF-8",
                ))
            })?;
            Ok(Some(text))
        }
        _ => {
            *pos = before;
            Ok(None)
        }
    }
}

fn skip_ws(text: &[u8], pos: &mut usize) {
    while text.get(*pos).is_some_and(|b| b.is_ascii_whitespace()) {
        *pos += 1;
    }
}
