//! Expression trees: `spec.md` §4.G/§4.H, composing patterns with sequence
//! (`;`), alternatives (`,`) and grouping (`{…}`).

mod compiler;
pub mod executor;

pub use compiler::compile;

use crate::pattern::Pattern;

/// One node of the pipeline's expression tree.
///
/// Tagged sum rather than a trait-object hierarchy, matching the design
/// note that calls for tagged variants over polymorphism for this tree.
#[derive(Debug, Clone)]
pub enum ExprNode {
    /// A single compiled pattern, optionally carrying format strings.
    Leaf {
        pattern: Pattern,
        node_format: Option<String>,
        expr_format: Option<String>,
    },
    /// `;` — children run left-to-right, each consuming the previous step's output.
    Sequence(Vec<ExprNode>),
    /// `,` — children run independently against the same input, outputs concatenated in order.
    Alternatives(Vec<ExprNode>),
    /// `{…}` — a sequence wrapped for format-string scoping.
    Group {
        body: Box<ExprNode>,
        node_format: Option<String>,
        expr_format: Option<String>,
    },
}
