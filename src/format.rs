//! Output formatter: renders a matched node either literally (`node.all`) or
//! through a `%`-directive format string (`spec.md` §4.I, directive table
//! fixed in `SPEC_FULL.md`).

use crate::html::{Document, Node};
use crate::pattern::hook::collapsed_text_len;

/// Render `node` at `index`, either literally or via `format`.
pub fn render(doc: &Document<'_>, index: usize, format: Option<&str>) -> Vec<u8> {
    let node = &doc.nodes()[index];
    match format {
        None => node.all.to_vec(),
        Some(spec) => render_directives(doc, node, spec),
    }
}

/// Wrap a rendered match in the SGR codes for bold red, matching `grep
/// --color=auto`'s convention of highlighting a whole match rather than a
/// sub-span of it.
pub fn colorize(rendered: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(rendered.len() + 10);
    out.extend_from_slice(b"\x1b[1;31m");
    out.extend_from_slice(rendered);
    out.extend_from_slice(b"\x1b[0m");
    out
}

fn render_directives(doc: &Document<'_>, node: &Node<'_>, spec: &str) -> Vec<u8> {
    let mut out = Vec::new();
    let bytes = spec.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        match bytes.get(i + 1) {
            Some(&b't') => {
                out.extend_from_slice(node.tag);
                i += 2;
            }
            Some(&b'i') => {
                out.extend_from_slice(node.insides);
                i += 2;
            }
            Some(&b'I') => {
                out.extend_from_slice(&collapsed_text(node.insides));
                i += 2;
            }
            Some(&b'N') => {
                out.extend_from_slice(node.attribs.len().to_string().as_bytes());
                i += 2;
            }
            Some(&b'C') => {
                out.extend_from_slice(node.child_count.to_string().as_bytes());
                i += 2;
            }
            Some(&b'L') => {
                out.extend_from_slice(node.lvl.to_string().as_bytes());
                i += 2;
            }
            Some(&b'p') => {
                out.extend_from_slice(node.offset_in(doc.input()).to_string().as_bytes());
                i += 2;
            }
            Some(&b's') => {
                out.extend_from_slice(node.all.len().to_string().as_bytes());
                i += 2;
            }
            Some(&b'n') => {
                out.push(b'\n');
                i += 2;
            }
            Some(&b'%') => {
                out.push(b'%');
                i += 2;
            }
            Some(&b'|') => {
                out.push(b'|');
                i += 2;
            }
            Some(&b'(') => match render_attribute_directive(node, &bytes[i..]) {
                Some((value, consumed)) => {
                    out.extend_from_slice(&value);
                    i += consumed;
                }
                None => {
                    out.push(b'%');
                    i += 1;
                }
            },
            _ => {
                out.push(b'%');
                i += 1;
            }
        }
    }
    out
}

/// Parse `%(name)a` starting at `rest[0] == '%'`; returns the attribute value
/// and the number of bytes consumed, or `None` if malformed (emitted literally).
fn render_attribute_directive(node: &Node<'_>, rest: &[u8]) -> Option<(Vec<u8>, usize)> {
    let close = rest.iter().position(|&b| b == b')')?;
    if rest.get(close + 1) != Some(&b'a') {
        return None;
    }
    let name = &rest[2..close];
    let value = node.attribute(name).unwrap_or(&[]).to_vec();
    Some((value, close + 2))
}

fn collapsed_text(insides: &[u8]) -> Vec<u8> {
    let start = insides.iter().position(|b| !b.is_ascii_whitespace());
    let Some(start) = start else { return Vec::new() };
    let end = insides.iter().rposition(|b| !b.is_ascii_whitespace()).unwrap() + 1;
    let trimmed = &insides[start..end];

    let mut out = Vec::with_capacity(collapsed_text_len(insides));
    let mut in_run = false;
    for &b in trimmed {
        if b.is_ascii_whitespace() {
            in_run = true;
            continue;
        }
        if in_run {
            out.push(b' ');
            in_run = false;
        }
        out.push(b);
    }
    out
}
