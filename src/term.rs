//! Pattern terms: a literal byte string or a compiled regex, plus matcher
//! flags and an attached occurrence-range filter.
//!
//! Grounded on `reliq_pattern` (`reliq.h`): a tagged union of a literal
//! string or a `regex_t`, a `reliq_range`, and a flags word. The tagged
//! union becomes [`TermKind`] here rather than C's union-plus-discriminant.

use regex::bytes::{Regex, RegexBuilder};

use crate::error::Error;
use crate::range::RangeList;

/// Flags controlling how a [`Term`] is compared against its target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TermFlags {
    /// Fold ASCII case before comparing.
    pub case_insensitive: bool,
    /// Invert the match result.
    pub invert: bool,
    /// Require the match to be bounded by non-word characters (or string edges).
    pub whole_word: bool,
}

/// Either a literal byte string or a compiled regular expression.
#[derive(Debug, Clone)]
enum TermKind {
    Literal(Vec<u8>),
    Regex(Regex),
}

/// A compiled pattern term: text or regex, comparison flags, and an
/// occurrence-range filter used when the term is tested against a sequence
/// of candidates (e.g. an attribute name recurring across a node's
/// attribute list — see [`crate::pattern::matcher`]).
#[derive(Debug, Clone)]
pub struct Term {
    kind: TermKind,
    flags: TermFlags,
    ranges: RangeList,
}

impl Term {
    /// Compile a literal byte-string term.
    pub fn literal(text: Vec<u8>, flags: TermFlags, ranges: RangeList) -> Self {
        Self {
            kind: TermKind::Literal(text),
            flags,
            ranges,
        }
    }

    /// Compile a regex term. `extended` selects POSIX-extended-like syntax;
    /// since `regex` is already more expressive than POSIX BRE, this crate
    /// enables the same feature set in both modes and keeps the flag solely
    /// to mirror the CLI surface from `spec.md` §6 (`-E`).
    pub fn regex(pattern: &str, flags: TermFlags, ranges: RangeList) -> Result<Self, Error> {
        let compiled = RegexBuilder::new(pattern)
            .case_insensitive(flags.case_insensitive)
            .build()?;
        Ok(Self {
            kind: TermKind::Regex(compiled),
            flags,
            ranges,
        })
    }

    /// Matcher flags attached to this term.
    pub fn flags(&self) -> TermFlags {
        self.flags
    }

    /// The occurrence-range filter attached to this term.
    pub fn ranges(&self) -> &RangeList {
        &self.ranges
    }

    /// Whether `target` satisfies this term's text/regex comparison and
    /// flags (case-folding, whole-word boundary, inversion). Does not
    /// consult [`Term::ranges`]; see [`Term::accepts_occurrence`] for that.
    pub fn text_matches(&self, target: &[u8]) -> bool {
        let raw = match &self.kind {
            TermKind::Literal(text) => self.literal_matches(text, target),
            TermKind::Regex(re) => self.regex_matches(re, target),
        };
        raw ^ self.flags.invert
    }

    fn literal_matches(&self, needle: &[u8], target: &[u8]) -> bool {
        if self.flags.case_insensitive {
            find_ci(target, needle)
                .map(|pos| self.bounded(target, pos, pos + needle.len()))
                .unwrap_or(false)
        } else {
            find(target, needle)
                .map(|pos| self.bounded(target, pos, pos + needle.len()))
                .unwrap_or(false)
        }
    }

    fn regex_matches(&self, re: &Regex, target: &[u8]) -> bool {
        re.find_iter(target)
            .any(|m| self.bounded(target, m.start(), m.end()))
    }

    fn bounded(&self, target: &[u8], start: usize, end: usize) -> bool {
        if !self.flags.whole_word {
            return true;
        }
        let before_ok = start == 0 || !is_word_byte(target[start - 1]);
        let after_ok = end == target.len() || !is_word_byte(target[end]);
        before_ok && after_ok
    }

    /// Whether the `occurrence_index`-th (0-based) of `occurrence_count`
    /// matches of this term is selected by [`Term::ranges`].
    pub fn accepts_occurrence(&self, occurrence_index: usize, occurrence_count: usize) -> bool {
        self.ranges
            .matches(occurrence_index, occurrence_count.saturating_sub(1))
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn find_ci(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}
