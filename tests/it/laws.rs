//! The algebraic laws in `spec.md` §8, exercised against the public API.

use htgrep::expr;
use htgrep::expr::executor;
use htgrep::format;
use htgrep::html;
use htgrep::term::TermFlags;

fn defaults() -> TermFlags {
    TermFlags::default()
}

#[test]
fn identity_expression_reprints_well_formed_input() {
    let input: &[u8] = b"<div><span>a</span></div><p>b</p>";
    let doc = html::parse(input);
    let expr = expr::compile(b"*", defaults()).unwrap();
    let matches = executor::run(&expr, &doc);

    let top_level: Vec<u8> = matches
        .iter()
        .filter(|e| doc.nodes()[e.node].lvl == 0)
        .flat_map(|e| format::render(&doc, e.node, None))
        .collect();
    assert_eq!(top_level, input);
}

#[test]
fn empty_input_yields_no_matches_for_any_expression() {
    let doc = html::parse(b"");
    for pattern in ["*", "div", "a +href"] {
        let expr = expr::compile(pattern.as_bytes(), defaults()).unwrap();
        assert!(executor::run(&expr, &doc).is_empty(), "pattern {pattern:?}");
    }
}

#[test]
fn case_insensitive_flag_makes_upper_and_lower_equivalent() {
    let doc = html::parse(b"<DIV>x</DIV><span>y</span>");
    let ci = TermFlags {
        case_insensitive: true,
        ..TermFlags::default()
    };
    let upper = expr::compile(b"DIV", ci).unwrap();
    let lower = expr::compile(b"div", ci).unwrap();

    let render_tags = |expr: &expr::ExprNode| -> Vec<&[u8]> {
        executor::run(expr, &doc)
            .into_iter()
            .map(|e| doc.nodes()[e.node].tag)
            .collect()
    };
    assert_eq!(render_tags(&upper), render_tags(&lower));
}

#[test]
fn sequence_associativity_over_alternatives() {
    let doc = html::parse(b"<div><b>1</b><i>2</i><b>3</b></div><div><b>4</b></div>");
    let lhs = expr::compile(b"{div; b}, {div; i}", defaults()).unwrap();
    let rhs = expr::compile(b"div; {b, i}", defaults()).unwrap();

    let mut lhs_nodes: Vec<usize> = executor::run(&lhs, &doc).into_iter().map(|e| e.node).collect();
    let mut rhs_nodes: Vec<usize> = executor::run(&rhs, &doc).into_iter().map(|e| e.node).collect();
    lhs_nodes.sort_unstable();
    rhs_nodes.sort_unstable();
    assert_eq!(lhs_nodes, rhs_nodes);
}
