//! Scalar node-property hooks: `@c(2:5)`, `@l(-1)`, `@s(1000:)`, etc.
//!
//! Grounded on the hook mechanism named in `reliq.h`'s most recent pattern
//! record shape (superseding the earlier `position_r`/`size_r`/`child_count_r`
//! split fields), generalized into one named-kind-plus-range shape.

use getset::Getters;
use typed_builder::TypedBuilder;

use crate::html::{Document, Node};
use crate::range::RangeList;
use crate::term::Term;

/// The fixed set of scalar properties a hook can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    /// `c` — transitive descendant count.
    ChildCount,
    /// `l` — depth from the document root (or the current pipeline stage's root).
    Depth,
    /// `s` — byte length of `all`.
    SubtreeSize,
    /// `i` — byte length of `insides`.
    InsidesLen,
    /// `I` — length of `insides` after whitespace collapsing.
    InsidesText,
    /// `m` — alias of `s`, kept for parity with the original tool's naming.
    AllSize,
    /// `a` — attribute count.
    AttrCount,
}

impl HookKind {
    /// Map a single ASCII letter to its hook kind.
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'c' => Some(Self::ChildCount),
            b'l' => Some(Self::Depth),
            b's' => Some(Self::SubtreeSize),
            b'i' => Some(Self::InsidesLen),
            b'I' => Some(Self::InsidesText),
            b'm' => Some(Self::AllSize),
            b'a' => Some(Self::AttrCount),
            _ => None,
        }
    }
}

/// A hook's argument: a numeric range, or (structurally, unused by any
/// built-in kind today) a text term. Kept as a sum type for fidelity to the
/// data model described for patterns; see the crate's design notes for why
/// the `Term` arm has no current producer.
#[derive(Debug, Clone)]
pub enum HookArg {
    Range(RangeList),
    Term(Term),
}

/// One compiled hook: a property to read plus the argument it's tested against.
///
/// `TypedBuilder` plus `getset` accessors follow `srclib::Locator`'s pattern
/// for a small, immutable, fully-owned value type built once at compile time.
#[derive(Debug, Clone, TypedBuilder, Getters)]
pub struct Hook {
    #[getset(get = "pub")]
    kind: HookKind,
    #[getset(get = "pub")]
    arg: HookArg,
}

impl Hook {
    pub fn new(kind: HookKind, arg: HookArg) -> Self {
        Self { kind, arg }
    }

    /// Evaluate this hook against `node`, whose effective depth (after
    /// pipeline depth-normalization) is `effective_lvl`.
    pub fn evaluate(&self, node: &Node<'_>, _doc: &Document<'_>, effective_lvl: u32) -> bool {
        let value = match self.kind {
            HookKind::ChildCount => node.child_count,
            HookKind::Depth => effective_lvl as usize,
            HookKind::SubtreeSize | HookKind::AllSize => node.all.len(),
            HookKind::InsidesLen => node.insides.len(),
            HookKind::InsidesText => collapsed_text_len(node.insides),
            HookKind::AttrCount => node.attribs.len(),
        };
        match &self.arg {
            HookArg::Range(ranges) => ranges.matches(value, value),
            HookArg::Term(term) => term.text_matches(value.to_string().as_bytes()),
        }
    }
}

/// Length of `insides` after stripping leading/trailing ASCII whitespace and
/// collapsing internal whitespace runs to a single space, with no entity
/// decoding.
pub fn collapsed_text_len(insides: &[u8]) -> usize {
    let start = insides.iter().position(|b| !b.is_ascii_whitespace());
    let Some(start) = start else { return 0 };
    let end = insides.iter().rposition(|b| !b.is_ascii_whitespace()).unwrap() + 1;
    let trimmed = &insides[start..end];

    let mut len = 0;
    let mut in_run = false;
    for &b in trimmed {
        if b.is_ascii_whitespace() {
            in_run = true;
            continue;
        }
        if in_run {
            len += 1;
            in_run = false;
        }
        len += 1;
    }
    len
}
