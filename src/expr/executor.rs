//! Pipeline executor: `spec.md` §4.H.
//!
//! Drives an [`ExprNode`] tree against a parsed [`Document`], maintaining
//! ordered match sets of `(node_index, parent_index)` between stages.

use std::rc::Rc;

use crate::html::Document;
use crate::pattern::{self, Pattern};

use super::ExprNode;

/// One surviving `(node, parent)` pair, carrying whichever format string the
/// producing leaf/group attached (`node_format` takes precedence over
/// `expr_format` when both are present — see `DESIGN.md` for why the two are
/// not rendered through materially different code paths here).
#[derive(Debug, Clone)]
pub struct MatchEntry {
    pub node: usize,
    pub parent: Option<usize>,
    pub node_format: Option<Rc<str>>,
    pub expr_format: Option<Rc<str>>,
}

impl MatchEntry {
    /// The format string to use when rendering this entry, if any.
    pub fn format(&self) -> Option<&str> {
        self.node_format
            .as_deref()
            .or(self.expr_format.as_deref())
    }
}

/// Evaluate `expr` against `doc` from scratch (no prior stage).
pub fn run(expr: &ExprNode, doc: &Document<'_>) -> Vec<MatchEntry> {
    eval(expr, doc, None)
}

fn eval(node: &ExprNode, doc: &Document<'_>, input: Option<&[MatchEntry]>) -> Vec<MatchEntry> {
    match node {
        ExprNode::Leaf {
            pattern,
            node_format,
            expr_format,
        } => {
            let node_format = node_format.as_ref().map(|s| Rc::from(s.as_str()));
            let expr_format = expr_format.as_ref().map(|s| Rc::from(s.as_str()));
            eval_leaf(pattern, doc, input)
                .into_iter()
                .map(|(n, p)| MatchEntry {
                    node: n,
                    parent: p,
                    node_format: node_format.clone(),
                    expr_format: expr_format.clone(),
                })
                .collect()
        }
        ExprNode::Sequence(steps) => {
            let mut current: Option<Vec<MatchEntry>> = input.map(<[_]>::to_vec);
            for step in steps {
                current = Some(eval(step, doc, current.as_deref()));
            }
            current.unwrap_or_default()
        }
        ExprNode::Alternatives(branches) => {
            let mut out = Vec::new();
            for branch in branches {
                out.extend(eval(branch, doc, input));
            }
            out
        }
        ExprNode::Group {
            body,
            node_format,
            expr_format,
        } => {
            let mut result = eval(body, doc, input);
            if let Some(fmt) = node_format {
                let fmt: Rc<str> = Rc::from(fmt.as_str());
                for entry in &mut result {
                    entry.node_format = Some(fmt.clone());
                }
            }
            if let Some(fmt) = expr_format {
                let fmt: Rc<str> = Rc::from(fmt.as_str());
                for entry in &mut result {
                    entry.expr_format = Some(fmt.clone());
                }
            }
            result
        }
    }
}

fn eval_leaf(
    pattern: &Pattern,
    doc: &Document<'_>,
    input: Option<&[MatchEntry]>,
) -> Vec<(usize, Option<usize>)> {
    match input {
        None => (0..doc.len())
            .filter(|&i| {
                let (ordinal, count) = sibling_info(doc, i);
                pattern::matches(pattern, doc, i, doc.nodes()[i].lvl, ordinal, count)
            })
            .map(|i| (i, None))
            .collect(),
        Some(entries) => {
            let mut out = Vec::new();
            for entry in entries {
                let root_lvl = doc.nodes()[entry.node].lvl;
                for j in doc.descendant_range(entry.node) {
                    let effective_lvl = doc.nodes()[j].lvl - root_lvl;
                    let (ordinal, count) = sibling_info(doc, j);
                    if pattern::matches(pattern, doc, j, effective_lvl, ordinal, count) {
                        out.push((j, Some(entry.node)));
                    }
                }
            }
            out
        }
    }
}

/// The node's 0-based ordinal among its direct siblings, and the count of
/// direct siblings minus one (the `last` value `RangeList::matches` expects).
fn sibling_info(doc: &Document<'_>, index: usize) -> (usize, usize) {
    let parent = doc.parent_of(index);
    let siblings = direct_children(doc, parent);
    let ordinal = siblings.iter().position(|&s| s == index).unwrap_or(0);
    (ordinal, siblings.len())
}

/// The leaf patterns and carried format strings of `expr`, if it is a flat
/// sequence of leaves (or a single leaf) with no alternatives or groups —
/// the one shape fast mode (`-F`) supports, since each stage's output must
/// reduce to a single linear byte buffer to hand to the next stage's parser.
fn flat_leaves(expr: &ExprNode) -> Option<Vec<(&Pattern, Option<&str>)>> {
    fn leaf_of(node: &ExprNode) -> Option<(&Pattern, Option<&str>)> {
        match node {
            ExprNode::Leaf {
                pattern,
                node_format,
                expr_format,
            } => Some((pattern, node_format.as_deref().or(expr_format.as_deref()))),
            _ => None,
        }
    }
    match expr {
        ExprNode::Leaf { .. } => leaf_of(expr).map(|leaf| vec![leaf]),
        ExprNode::Sequence(steps) => steps.iter().map(leaf_of).collect(),
        _ => None,
    }
}

/// Fast-mode (`-F`) execution (`spec.md` §4.H "Fast mode"): re-parses
/// between stages from a streamed intermediate buffer instead of keeping one
/// `Document`'s node indices alive for the whole pipeline, trading re-parse
/// cost for O(current-stage) memory. Only applies to a flat leaf sequence;
/// returns `None` for anything else (alternatives/groups don't reduce to one
/// linear buffer) so the caller can fall back to the normal executor.
///
/// Returns the final stage's rendered output and its match count.
pub fn run_fast(expr: &ExprNode, input: &[u8]) -> Option<(Vec<u8>, usize)> {
    let leaves = flat_leaves(expr)?;
    let mut buffer = input.to_vec();
    let mut last_count = 0;
    for (pattern, format) in leaves {
        let doc = crate::html::parse(&buffer);
        let mut next = Vec::new();
        let mut count = 0;
        for index in 0..doc.len() {
            let (ordinal, sibling_count) = sibling_info(&doc, index);
            if pattern::matches(pattern, &doc, index, doc.nodes()[index].lvl, ordinal, sibling_count) {
                next.extend_from_slice(&crate::format::render(&doc, index, format));
                count += 1;
            }
        }
        buffer = next;
        last_count = count;
    }
    Some((buffer, last_count))
}

fn direct_children(doc: &Document<'_>, parent: Option<usize>) -> Vec<usize> {
    let nodes = doc.nodes();
    let (start, end, target_lvl) = match parent {
        Some(p) => {
            let range = doc.descendant_range(p);
            (range.start, range.end, nodes[p].lvl + 1)
        }
        None => (0, nodes.len(), 0),
    };
    let mut children = Vec::new();
    let mut i = start;
    while i < end {
        if nodes[i].lvl == target_lvl {
            children.push(i);
            i += 1 + nodes[i].child_count;
        } else {
            i += 1;
        }
    }
    children
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::compile;
    use crate::html::parse;
    use crate::term::TermFlags;

    fn rendered(doc: &Document<'_>, entries: &[MatchEntry]) -> Vec<u8> {
        entries
            .iter()
            .flat_map(|e| crate::format::render(doc, e.node, e.format()))
            .collect()
    }

    #[test]
    fn void_elements_scenario() {
        let doc = parse(b"<p>x<br>y</p>");
        let expr = compile(b"br", TermFlags::default()).unwrap();
        let out = run(&expr, &doc);
        assert_eq!(rendered(&doc, &out), b"<br>");
    }

    #[test]
    fn attribute_predicate_scenario() {
        let doc = parse(br#"<a href="x">1</a><a>2</a><a href="y">3</a>"#);
        let expr = compile(b"a +href", TermFlags::default()).unwrap();
        let out = run(&expr, &doc);
        assert_eq!(rendered(&doc, &out), br#"<a href="x">1</a><a href="y">3</a>"#);
    }

    #[test]
    fn nested_position_range_scenario() {
        let doc = parse(b"<ul><li>1</li><li>2</li><li>3</li></ul>");
        let expr = compile(b"li[1]", TermFlags::default()).unwrap();
        let out = run(&expr, &doc);
        assert_eq!(rendered(&doc, &out), b"<li>2</li>");
    }

    #[test]
    fn sequence_descent_scenario() {
        let doc = parse(b"<div><span>a</span></div><div><span>b</span></div>");
        let expr = compile(b"div; span[0]", TermFlags::default()).unwrap();
        let out = run(&expr, &doc);
        assert_eq!(rendered(&doc, &out), b"<span>a</span><span>b</span>");
    }

    #[test]
    fn alternatives_preserve_document_order() {
        let doc = parse(b"<b>1</b><i>2</i><b>3</b>");
        let expr = compile(b"b, i", TermFlags::default()).unwrap();
        let out = run(&expr, &doc);
        assert_eq!(rendered(&doc, &out), b"<b>1</b><i>2</i><b>3</b>");
    }

    #[test]
    fn opaque_tag_scenario() {
        let doc = parse(b"<script>if (a<b) x=1;</script><p>ok</p>");
        let expr = compile(b"p", TermFlags::default()).unwrap();
        let out = run(&expr, &doc);
        assert_eq!(rendered(&doc, &out), b"<p>ok</p>");
    }

    #[test]
    fn identity_expression_round_trips_literal_emission() {
        let input: &[u8] = b"<div><span>a</span></div>";
        let doc = parse(input);
        let expr = compile(b"*", TermFlags::default()).unwrap();
        let out = run(&expr, &doc);
        // The root-level node(s) alone reproduce the whole well-formed input
        // since child spans are sub-ranges of their parent's `all`.
        let top_level: Vec<u8> = out
            .iter()
            .filter(|e| e.parent.is_none() && doc.parent_of(e.node).is_none())
            .flat_map(|e| doc.nodes()[e.node].all.to_vec())
            .collect();
        assert_eq!(top_level, input);
    }

    #[test]
    fn empty_input_yields_no_matches() {
        let doc = parse(b"");
        let expr = compile(b"*", TermFlags::default()).unwrap();
        assert!(run(&expr, &doc).is_empty());
    }

    #[test]
    fn fast_mode_matches_normal_execution_for_a_flat_sequence() {
        let doc = parse(b"<div><span>a</span></div><div><span>b</span></div>");
        let expr = compile(b"div; span[0]", TermFlags::default()).unwrap();
        let normal = rendered(&doc, &run(&expr, &doc));

        let (fast, count) = run_fast(&expr, b"<div><span>a</span></div><div><span>b</span></div>").unwrap();
        assert_eq!(fast, normal);
        assert_eq!(count, 2);
    }

    #[test]
    fn fast_mode_declines_expressions_with_alternatives_or_groups() {
        let alternatives = compile(b"b, i", TermFlags::default()).unwrap();
        assert!(run_fast(&alternatives, b"<b>1</b>").is_none());

        let group = compile(b"{div; span}", TermFlags::default()).unwrap();
        assert!(run_fast(&group, b"<div><span>a</span></div>").is_none());
    }

    #[test]
    fn sequence_associativity_over_alternatives() {
        let doc = parse(b"<div><b>1</b><i>2</i><b>3</b></div>");
        let lhs_expr = compile(b"{div; b}, {div; i}", TermFlags::default()).unwrap();
        let rhs_expr = compile(b"div; {b, i}", TermFlags::default()).unwrap();
        let lhs: Vec<usize> = run(&lhs_expr, &doc).into_iter().map(|e| e.node).collect();
        let rhs: Vec<usize> = run(&rhs_expr, &doc).into_iter().map(|e| e.node).collect();
        let mut lhs_sorted = lhs.clone();
        let mut rhs_sorted = rhs.clone();
        lhs_sorted.sort_unstable();
        rhs_sorted.sort_unstable();
        assert_eq!(lhs_sorted, rhs_sorted);
    }
}
