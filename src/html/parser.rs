//! Recursive-descent HTML structural parser.
//!
//! Produces the flat node array described in `Document`/`Node`. Grounded on
//! `html_struct_handle` in the original tool's `html.c`: a single recursive
//! function walks the byte buffer, pushing one [`Node`] per start tag and
//! recursing one level per nested tag. Unlike the original, which threads an
//! "unwind" signal back through a 64-bit bit-packed return value, this
//! parser returns a small tagged [`Unwind`] enum, per the design note that
//! nested-parser recursion should use a structured return rather than
//! bit-packed integers.

use tracing::debug;

use super::node::{Attribute, Document, Node};
use super::tags::{is_autoclosing, is_opaque, is_void};

/// Signal threaded back up the recursion when a closing tag matches an
/// ancestor rather than the current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unwind {
    /// The closing tag matched this node (or it self-closed); nothing to propagate.
    None,
    /// This node was force-closed because an ancestor `remaining` levels
    /// above (not counting this node) owns the matching closing tag.
    /// Each ancestor frame that receives `Levels(m)` with `m > 0` must also
    /// force-close and propagate `Levels(m - 1)`; a frame receiving
    /// `Levels(0)` resumes normal scanning (it is the matching ancestor).
    Levels(usize),
}

struct Builder<'a> {
    input: &'a [u8],
    nodes: Vec<Node<'a>>,
}

/// Parse `input` into a flat, pre-order [`Document`].
pub fn parse(input: &[u8]) -> Document<'_> {
    let mut builder = Builder {
        input,
        nodes: Vec::new(),
    };
    let mut pos = 0;
    while pos < input.len() {
        skip_non_tag_bytes(input, &mut pos);
        if pos >= input.len() {
            break;
        }
        parse_node(&mut builder, &mut pos, 0);
    }
    Document::new(input, builder.nodes)
}

fn skip_non_tag_bytes(input: &[u8], pos: &mut usize) {
    while *pos < input.len() && input[*pos] != b'<' {
        *pos += 1;
    }
}

/// Parse one node (and its subtree) starting at `input[*pos] == '<'`.
///
/// Returns `None` if the `<...>` at this position was a comment or
/// declaration (no node emitted); otherwise the index of the pushed node and
/// the unwind signal for the caller.
fn parse_node(builder: &mut Builder<'_>, pos: &mut usize, lvl: u32) -> Option<(usize, Unwind)> {
    let input = builder.input;
    let start = *pos;
    debug_assert_eq!(input[*pos], b'<');
    *pos += 1;
    skip_ws(input, pos);

    if input.get(*pos) == Some(&b'!') {
        skip_comment_or_decl(input, pos);
        return None;
    }

    let tag_start = *pos;
    let tag = read_name(input, pos);
    if tag.is_empty() {
        // Not a real tag (e.g. a bare `<` in text); treat as ordinary content.
        *pos = tag_start;
        return None;
    }

    let index = builder.nodes.len();
    builder.nodes.push(Node {
        all: &input[start..start],
        tag,
        insides: &input[*pos..*pos],
        attribs: Vec::new(),
        child_count: 0,
        lvl,
        truncated: false,
    });

    let mut attribs = Vec::new();
    let mut self_closed = false;
    loop {
        skip_ws(input, pos);
        match input.get(*pos) {
            None => break,
            Some(&b'>') => {
                *pos += 1;
                break;
            }
            Some(&b'/') => {
                if input.get(*pos + 1) == Some(&b'>') {
                    *pos += 2;
                    self_closed = true;
                    break;
                }
                *pos += 1;
            }
            Some(&b) if is_attr_name_byte(b) => {
                attribs.push(read_attribute(input, pos));
            }
            Some(_) => *pos += 1,
        }
    }
    builder.nodes[index].attribs = attribs;

    let void = is_void(tag);
    let opaque = is_opaque(tag);
    let autoclose = is_autoclosing(tag);

    if self_closed || void {
        finish_leaf(builder, index, start, *pos);
        return Some((index, Unwind::None));
    }

    let insides_start = *pos;
    if opaque {
        return Some((index, parse_opaque_body(builder, pos, index, start, insides_start, tag)));
    }

    parse_children(builder, pos, lvl, index, start, insides_start, tag, autoclose)
}

fn parse_opaque_body(
    builder: &mut Builder<'_>,
    pos: &mut usize,
    index: usize,
    start: usize,
    insides_start: usize,
    tag: &[u8],
) -> Unwind {
    let input = builder.input;
    loop {
        match find_close_tag(input, *pos, tag) {
            Some((close_start, after_close)) => {
                builder.nodes[index].insides = &input[insides_start..close_start];
                builder.nodes[index].all = &input[start..after_close];
                *pos = after_close;
                return Unwind::None;
            }
            None => {
                *pos = input.len();
                builder.nodes[index].insides = &input[insides_start..input.len()];
                builder.nodes[index].all = &input[start..input.len()];
                builder.nodes[index].truncated = true;
                return Unwind::None;
            }
        }
    }
}

/// Find `</tag>` at or after `from`, returning (offset of `<`, offset past `>`).
fn find_close_tag(input: &[u8], from: usize, tag: &[u8]) -> Option<(usize, usize)> {
    let mut i = from;
    while i < input.len() {
        if input[i] == b'<' && input.get(i + 1) == Some(&b'/') {
            let mut j = i + 2;
            skip_ws(input, &mut j);
            let name_start = j;
            let name = read_name(input, &mut j);
            if name.eq_ignore_ascii_case(tag) {
                if let Some(gt) = input[j..].iter().position(|&b| b == b'>') {
                    return Some((i, j + gt + 1));
                }
                return None;
            }
            let _ = name_start;
        }
        i += 1;
    }
    None
}

#[allow(clippy::too_many_arguments)]
fn parse_children(
    builder: &mut Builder<'_>,
    pos: &mut usize,
    lvl: u32,
    index: usize,
    start: usize,
    insides_start: usize,
    tag: &[u8],
    autoclose: bool,
) -> Option<(usize, Unwind)> {
    let mut descendants = 0usize;
    loop {
        let input = builder.input;
        if *pos >= input.len() {
            builder.nodes[index].insides = &input[insides_start..input.len()];
            builder.nodes[index].all = &input[start..input.len()];
            builder.nodes[index].truncated = true;
            builder.nodes[index].child_count = descendants;
            return Some((index, Unwind::None));
        }

        if input[*pos] != b'<' {
            *pos += 1;
            continue;
        }

        // Closing tag?
        if input.get(*pos + 1) == Some(&b'/') {
            let tag_open = *pos;
            let mut j = *pos + 2;
            skip_ws(input, &mut j);
            let endname = read_name(input, &mut j);

            if endname.is_empty() {
                *pos += 1;
                continue;
            }

            if endname.eq_ignore_ascii_case(tag) {
                let close_end = match input[j..].iter().position(|&b| b == b'>') {
                    Some(gt) => j + gt + 1,
                    None => {
                        builder.nodes[index].insides = &input[insides_start..input.len()];
                        builder.nodes[index].all = &input[start..input.len()];
                        builder.nodes[index].truncated = true;
                        builder.nodes[index].child_count = descendants;
                        *pos = input.len();
                        return Some((index, Unwind::None));
                    }
                };
                builder.nodes[index].insides = &input[insides_start..tag_open];
                builder.nodes[index].all = &input[start..close_end];
                builder.nodes[index].child_count = descendants;
                *pos = close_end;
                return Some((index, Unwind::None));
            }

            // Doesn't match our own tag: search open ancestors.
            if let Some(ancestor_lvl) = find_open_ancestor(builder, index, endname, lvl) {
                let remaining = lvl - ancestor_lvl - 1;
                builder.nodes[index].insides = &input[insides_start..tag_open];
                builder.nodes[index].all = &input[start..tag_open];
                builder.nodes[index].child_count = descendants;
                *pos = tag_open;
                debug!(tag = %String::from_utf8_lossy(tag), "unwound by unmatched close tag");
                return Some((index, Unwind::Levels(remaining as usize)));
            }

            // No ancestor owns this close tag; treat it as ordinary content.
            *pos += 1;
            continue;
        }

        // `<!-- -->` / `<!DOCTYPE>` inside content.
        if input.get(*pos + 1) == Some(&b'!') {
            let mut j = *pos + 1;
            skip_comment_or_decl(input, &mut j);
            *pos = j;
            continue;
        }

        if autoclose {
            let mut j = *pos + 1;
            skip_ws(input, &mut j);
            let name = read_name(input, &mut j);
            if name.eq_ignore_ascii_case(tag) {
                builder.nodes[index].insides = &input[insides_start..*pos];
                builder.nodes[index].all = &input[start..*pos];
                builder.nodes[index].child_count = descendants;
                // Don't consume: the sibling start tag is parsed by our caller.
                return Some((index, Unwind::None));
            }
        }

        // A nested start tag: recurse.
        match parse_node(builder, pos, lvl + 1) {
            None => continue,
            Some((_, Unwind::None)) => {
                descendants = builder.nodes.len() - index - 1;
            }
            Some((_, Unwind::Levels(remaining))) => {
                if remaining == 0 {
                    // This frame is the ancestor the close tag actually
                    // belongs to. `*pos` sits at the `<` of that close tag
                    // (set by the unwinding child's ancestor-search branch),
                    // so resume the loop rather than force-closing here: the
                    // ordinary closing-tag branch above will match our own
                    // `tag`, consume it through its `>`, and set `all`
                    // accordingly, instead of silently dropping that text.
                    descendants = builder.nodes.len() - index - 1;
                    continue;
                }
                builder.nodes[index].insides = &input[insides_start..*pos];
                builder.nodes[index].all = &input[start..*pos];
                builder.nodes[index].child_count = builder.nodes.len() - index - 1;
                return Some((index, Unwind::Levels(remaining - 1)));
            }
        }
    }
}

fn finish_leaf(builder: &mut Builder<'_>, index: usize, start: usize, end: usize) {
    let input = builder.input;
    builder.nodes[index].all = &input[start..end];
    builder.nodes[index].insides = &input[end..end];
    builder.nodes[index].child_count = 0;
}

/// Search already-pushed, still-open ancestor nodes (at levels `< lvl`) for
/// the nearest one whose tag matches `name`. "Still open" is approximated
/// here by tracking levels directly: ancestors are exactly the nodes on the
/// current recursion's path, which are the nodes at levels `0..lvl` that
/// precede `current_index` and whose subtree has not yet been closed — since
/// we're still inside their `parse_children` call, that's any pushed node
/// with `lvl < current`'s level that hasn't returned yet. We approximate
/// "hasn't returned yet" by scanning backward for decreasing levels, which
/// holds because a closed sibling subtree's nodes all have `lvl >=` the
/// subtree root's level and can't produce a smaller level than an ancestor.
fn find_open_ancestor(builder: &Builder<'_>, current_index: usize, name: &[u8], lvl: u32) -> Option<u32> {
    let mut want = lvl;
    for i in (0..=current_index).rev() {
        let node = &builder.nodes[i];
        if node.lvl < want {
            if node.tag.eq_ignore_ascii_case(name) {
                return Some(node.lvl);
            }
            want = node.lvl;
            if want == 0 {
                break;
            }
        }
    }
    None
}

fn skip_ws(input: &[u8], pos: &mut usize) {
    while input.get(*pos).is_some_and(|b| b.is_ascii_whitespace()) {
        *pos += 1;
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

fn is_attr_name_byte(b: u8) -> bool {
    is_name_byte(b) || b.is_ascii_alphabetic()
}

fn read_name<'a>(input: &'a [u8], pos: &mut usize) -> &'a [u8] {
    let start = *pos;
    while input.get(*pos).is_some_and(|&b| is_name_byte(b)) {
        *pos += 1;
    }
    &input[start..*pos]
}

fn read_attribute<'a>(input: &'a [u8], pos: &mut usize) -> Attribute<'a> {
    let name = read_name(input, pos);
    skip_ws(input, pos);
    if input.get(*pos) != Some(&b'=') {
        return Attribute { name, value: &input[*pos..*pos] };
    }
    *pos += 1;
    skip_ws(input, pos);
    match input.get(*pos) {
        Some(&q) if q == b'"' || q == b'\'' => {
            *pos += 1;
            let value_start = *pos;
            while input.get(*pos).is_some_and(|&b| b != q) {
                *pos += 1;
            }
            let value = &input[value_start..*pos];
            if input.get(*pos) == Some(&q) {
                *pos += 1;
            }
            Attribute { name, value }
        }
        _ => {
            let value_start = *pos;
            while input
                .get(*pos)
                .is_some_and(|&b| !b.is_ascii_whitespace() && b != b'>')
            {
                *pos += 1;
            }
            Attribute { name, value: &input[value_start..*pos] }
        }
    }
}

fn skip_comment_or_decl(input: &[u8], pos: &mut usize) {
    // `*pos` is at the `!`.
    *pos += 1;
    if input[*pos..].starts_with(b"--") {
        *pos += 2;
        match find_subslice(&input[*pos..], b"-->") {
            Some(rel) => *pos += rel + 3,
            None => *pos = input.len(),
        }
        return;
    }
    while input.get(*pos).is_some_and(|&b| b != b'>') {
        *pos += 1;
    }
    if *pos < input.len() {
        *pos += 1;
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
