//! Static tag-class tables, grounded on `selfclosing_s`, `script_s`, and
//! `autoclosing_s` in the original tool's `html.c`.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Tags that never carry a closing tag and self-close unconditionally.
static VOID_TAGS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "br", "hr", "img", "input", "col", "embed", "area", "base", "link", "meta", "param",
        "source", "track", "wbr", "command", "keygen", "menuitem",
    ]
    .into_iter()
    .collect()
});

/// Tags whose content is consumed verbatim, without nested-markup parsing,
/// up to a matching close tag.
static OPAQUE_TAGS: Lazy<HashSet<&'static str>> = Lazy::new(|| ["script", "style"].into_iter().collect());

/// Tags that implicitly close when another start tag of the same name
/// appears at the current nesting level.
static AUTOCLOSE_TAGS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "p", "tr", "td", "th", "tbody", "tfoot", "thead", "rt", "rp", "caption", "colgroup",
        "option", "optgroup",
    ]
    .into_iter()
    .collect()
});

fn contains_ci(table: &Lazy<HashSet<&'static str>>, tag: &[u8]) -> bool {
    let mut lower = [0u8; 16];
    if tag.len() > lower.len() {
        return table.iter().any(|t| t.as_bytes().eq_ignore_ascii_case(tag));
    }
    for (dst, &src) in lower.iter_mut().zip(tag) {
        *dst = src.to_ascii_lowercase();
    }
    std::str::from_utf8(&lower[..tag.len()])
        .map(|t| table.contains(t))
        .unwrap_or(false)
}

/// Whether `tag` is a void element.
pub fn is_void(tag: &[u8]) -> bool {
    contains_ci(&VOID_TAGS, tag)
}

/// Whether `tag`'s contents should be treated as opaque (unparsed) text.
pub fn is_opaque(tag: &[u8]) -> bool {
    contains_ci(&OPAQUE_TAGS, tag)
}

/// Whether `tag` implicitly closes on a sibling start tag of the same name.
pub fn is_autoclosing(tag: &[u8]) -> bool {
    contains_ci(&AUTOCLOSE_TAGS, tag)
}
