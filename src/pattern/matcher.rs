//! Evaluate one compiled [`Pattern`](super::Pattern) against one node.
//!
//! Grounded on `spec.md` §4.E's evaluation order: tag term, then attribute
//! predicates (AND-combined, independent of declaration order for the
//! boolean result), then hooks, then the sibling-position range.

use itertools::Itertools;

use super::{AttributePredicate, Pattern};
use crate::html::{Document, Node};
use crate::term::Term;

/// Whether `pattern` accepts the node at `index`.
///
/// `effective_lvl` is the node's depth relative to the current pipeline
/// stage's root (see the executor's depth-normalization rule); `sibling_ordinal`
/// and `sibling_count` describe the node's position among siblings sharing its
/// parent in the current scan.
pub fn matches(
    pattern: &Pattern,
    doc: &Document<'_>,
    index: usize,
    effective_lvl: u32,
    sibling_ordinal: usize,
    sibling_count: usize,
) -> bool {
    let node = &doc.nodes()[index];

    if !pattern.tag.text_matches(node.tag) {
        return false;
    }

    for predicate in &pattern.attribute_predicates {
        let satisfied = predicate_satisfied(predicate, node);
        if predicate.positive != satisfied {
            return false;
        }
    }

    for hook in &pattern.hooks {
        if !hook.evaluate(node, doc, effective_lvl) {
            return false;
        }
    }

    pattern
        .sibling_range
        .matches(sibling_ordinal, sibling_count.saturating_sub(1))
}

fn predicate_satisfied(predicate: &AttributePredicate, node: &Node<'_>) -> bool {
    let total = node
        .attribs
        .iter()
        .positions(|attr| attribute_matches(&predicate.name, predicate.value.as_ref(), attr))
        .count();

    (0..total).any(|occurrence_index| predicate.name.accepts_occurrence(occurrence_index, total))
}

fn attribute_matches(name: &Term, value: Option<&Term>, attr: &crate::html::Attribute<'_>) -> bool {
    name.text_matches(attr.name) && value.map_or(true, |v| v.text_matches(attr.value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::parse;
    use crate::pattern::compile;
    use crate::term::TermFlags;

    #[test]
    fn tag_term_gates_the_whole_match() {
        let doc = parse(b"<p>x</p>");
        let (pattern, _) = compile(b"p", TermFlags::default()).unwrap();
        assert!(matches(&pattern, &doc, 0, 0, 0, 0));

        let (pattern, _) = compile(b"div", TermFlags::default()).unwrap();
        assert!(!matches(&pattern, &doc, 0, 0, 0, 0));
    }

    #[test]
    fn positive_attribute_predicate_requires_presence() {
        let doc = parse(br#"<a href="x">1</a>"#);
        let (pattern, _) = compile(b"a +href", TermFlags::default()).unwrap();
        assert!(matches(&pattern, &doc, 0, 0, 0, 0));

        let doc_no_attr = parse(b"<a>1</a>");
        assert!(!matches(&pattern, &doc_no_attr, 0, 0, 0, 0));
    }

    #[test]
    fn negative_attribute_predicate_requires_absence() {
        let (pattern, _) = compile(b"a -href", TermFlags::default()).unwrap();
        let doc = parse(b"<a>1</a>");
        assert!(matches(&pattern, &doc, 0, 0, 0, 0));

        let doc_with_attr = parse(br#"<a href="x">1</a>"#);
        assert!(!matches(&pattern, &doc_with_attr, 0, 0, 0, 0));
    }

    #[test]
    fn hook_constrains_child_count() {
        let doc = parse(b"<ul><li>1</li><li>2</li></ul>");
        let (pattern, _) = compile(b"ul @c(2:2)", TermFlags::default()).unwrap();
        assert!(matches(&pattern, &doc, 0, 0, 0, 0));

        let (pattern, _) = compile(b"ul @c(3:3)", TermFlags::default()).unwrap();
        assert!(!matches(&pattern, &doc, 0, 0, 0, 0));
    }

    #[test]
    fn sibling_range_constrains_ordinal() {
        let doc = parse(b"<ul><li>1</li><li>2</li><li>3</li></ul>");
        let (pattern, _) = compile(b"li[1]", TermFlags::default()).unwrap();
        assert!(!matches(&pattern, &doc, 1, 1, 0, 2));
        assert!(matches(&pattern, &doc, 2, 1, 1, 2));
    }
}
