//! Integer range lists: `[a:b:c,...]`, each component optionally "from end".
//!
//! Grounded on the compact tagged-record layout of `reliq_range_node` in the
//! original tool (three `v` slots plus a flags byte): a [`Range`] is either a
//! single point or an interval with an optional stride, and each of its
//! components independently carries an "from end" flag.

use derive_more::Deref;

use crate::error::{PatternError, PatternErrorKind};

/// One component of a range endpoint: a literal value or an offset from `last`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Absolute position.
    Absolute(usize),
    /// Position counted backwards from the last valid index.
    FromEnd(usize),
}

impl Endpoint {
    fn effective(self, last: usize) -> usize {
        match self {
            Endpoint::Absolute(v) => v,
            Endpoint::FromEnd(v) => last.saturating_sub(v),
        }
    }
}

/// A single range specifier: a point, or an interval with an optional stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Range {
    /// `a` — accept only this position.
    Point(Endpoint),
    /// `a:b` — accept any position in `[a, b]`.
    Interval(Endpoint, Endpoint),
    /// `a:b:c` — accept positions in `[a, b]` that are also multiples of `c`.
    Strided(Endpoint, Endpoint, usize),
}

impl Range {
    fn accepts(&self, matched: usize, last: usize) -> bool {
        match *self {
            Range::Point(a) => matched == a.effective(last),
            Range::Interval(a, b) => {
                let (lo, hi) = (a.effective(last), b.effective(last));
                lo <= matched && matched <= hi
            }
            Range::Strided(a, b, c) => {
                let (lo, hi) = (a.effective(last), b.effective(last));
                lo <= matched && matched <= hi && (c < 2 || matched % c == 0)
            }
        }
    }
}

/// An ordered list of [`Range`]s, matched by union (any range accepting the
/// value accepts it). An empty list accepts everything.
///
/// Derefs to its backing `Vec<Range>`, matching `snippets::text::Buffer`'s use
/// of `derive_more` to expose a thin owned wrapper without hand-written
/// forwarding methods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct RangeList(Vec<Range>);

impl RangeList {
    /// The empty range list, which accepts every position.
    pub fn all() -> Self {
        Self(Vec::new())
    }

    /// Build a range list directly from already-parsed [`Range`]s, used by
    /// the hook-argument parser which allows open-ended bounds (`1000:`)
    /// that the bracketed `[a:b:c]` grammar does not.
    pub(crate) fn from_ranges(ranges: Vec<Range>) -> Self {
        Self(ranges)
    }

    /// Whether `matched` (0-based) is a member, given the highest valid index `last`.
    pub fn matches(&self, matched: usize, last: usize) -> bool {
        self.is_empty() || self.iter().any(|r| r.accepts(matched, last))
    }

    /// Parse a bracketed range list `[a:b:c,...]` starting at byte `0` of `text`.
    ///
    /// `text` must start with `[` and contain a matching `]`; whitespace
    /// inside the brackets is ignored. Returns the parsed list and the byte
    /// offset just past the closing `]`.
    pub fn parse(text: &[u8]) -> Result<(Self, usize), PatternError> {
        if text.first() != Some(&b'[') {
            return Err(PatternError::new(
                0,
                PatternErrorKind::Range,
                "range must start with '['",
            ));
        }
        let close = text.iter().position(|&b| b == b']').ok_or_else(|| {
            PatternError::new(0, PatternErrorKind::Range, "unterminated range, missing ']'")
        })?;
        let body = &text[1..close];
        let mut ranges = Vec::new();
        for (chunk_index, chunk) in split_unescaped(body, b',').into_iter().enumerate() {
            let trimmed = trim_ascii(chunk);
            if trimmed.is_empty() {
                continue;
            }
            ranges.push(parse_spec(trimmed).map_err(|detail| {
                PatternError::new(
                    chunk_index,
                    PatternErrorKind::Range,
                    format!("invalid range spec: {detail}"),
                )
            })?);
        }
        Ok((Self(ranges), close + 1))
    }
}

fn split_unescaped(body: &[u8], sep: u8) -> Vec<&[u8]> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, &b) in body.iter().enumerate() {
        if b == sep {
            out.push(&body[start..i]);
            start = i + 1;
        }
    }
    out.push(&body[start..]);
    out
}

fn trim_ascii(b: &[u8]) -> &[u8] {
    let start = b.iter().position(|c| !c.is_ascii_whitespace()).unwrap_or(b.len());
    let end = b.iter().rposition(|c| !c.is_ascii_whitespace()).map_or(start, |p| p + 1);
    &b[start..end]
}

fn parse_endpoint(part: &[u8]) -> Result<Endpoint, String> {
    let part = trim_ascii(part);
    if let Some(rest) = part.strip_prefix(b"-") {
        let value = parse_usize(rest)?;
        Ok(Endpoint::FromEnd(value))
    } else {
        Ok(Endpoint::Absolute(parse_usize(part)?))
    }
}

fn parse_usize(b: &[u8]) -> Result<usize, String> {
    std::str::from_utf8(b)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| format!("expected integer, got {:?}", String::from_utf8_lossy(b)))
}

fn parse_spec(spec: &[u8]) -> Result<Range, String> {
    let parts: Vec<&[u8]> = split_unescaped(spec, b':');
    match parts.as_slice() {
        [a] => Ok(Range::Point(parse_endpoint(a)?)),
        [a, b] => Ok(Range::Interval(parse_endpoint(a)?, parse_endpoint(b)?)),
        [a, b, c] => {
            let c = trim_ascii(c);
            let stride = if c.is_empty() { 0 } else { parse_usize(c)? };
            // A present-but-zero stride is a syntax error, not a silent
            // "no stride" (unlike the original tool's `ranges_match`, which
            // treats any `c < 2` as unstrided).
            if !c.is_empty() && stride == 0 {
                return Err("stride ('c' in 'a:b:c') must not be 0".into());
            }
            Ok(Range::Strided(parse_endpoint(a)?, parse_endpoint(b)?, stride))
        }
        _ => Err("expected 'a', 'a:b' or 'a:b:c'".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_range_accepts_all() {
        let list = RangeList::all();
        assert!(list.matches(0, 0));
        assert!(list.matches(9000, 9000));
    }

    #[test]
    fn point_range() {
        let (list, consumed) = RangeList::parse(b"[2]").unwrap();
        assert_eq!(consumed, 3);
        assert!(list.matches(2, 10));
        assert!(!list.matches(3, 10));
    }

    #[test]
    fn interval_range() {
        let (list, _) = RangeList::parse(b"[2:5]").unwrap();
        assert!(!list.matches(1, 10));
        assert!(list.matches(2, 10));
        assert!(list.matches(5, 10));
        assert!(!list.matches(6, 10));
    }

    #[test]
    fn strided_range() {
        let (list, _) = RangeList::parse(b"[0:10:2]").unwrap();
        assert!(list.matches(0, 10));
        assert!(!list.matches(1, 10));
        assert!(list.matches(4, 10));
    }

    #[test]
    fn from_end_is_closed_at_boundary() {
        let (list, _) = RangeList::parse(b"[-0]").unwrap();
        assert!(list.matches(10, 10));
    }

    #[test]
    fn from_end_computes_offset_from_last() {
        let (list, _) = RangeList::parse(b"[-1]").unwrap();
        assert!(list.matches(9, 10));
        assert!(!list.matches(10, 10));
    }

    #[test]
    fn multiple_specs_are_unioned() {
        let (list, _) = RangeList::parse(b"[0,5,9]").unwrap();
        assert!(list.matches(0, 9));
        assert!(list.matches(5, 9));
        assert!(list.matches(9, 9));
        assert!(!list.matches(4, 9));
    }

    #[test]
    fn whitespace_inside_brackets_is_ignored() {
        let (list, _) = RangeList::parse(b"[ 1 : 3 , 5 ]").unwrap();
        assert!(list.matches(2, 10));
        assert!(list.matches(5, 10));
    }

    #[test]
    fn unterminated_range_is_an_error() {
        let err = RangeList::parse(b"[1:2").unwrap_err();
        assert_eq!(err.kind, PatternErrorKind::Range);
    }

    #[test]
    fn zero_stride_is_a_syntax_error() {
        let err = RangeList::parse(b"[1:5:0]").unwrap_err();
        assert_eq!(err.kind, PatternErrorKind::Range);
    }
}
