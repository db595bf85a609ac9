//! HTML structural parsing: turns a byte buffer into a flat, zero-copy
//! [`Document`] of [`Node`]s in pre-order.

mod node;
mod parser;
mod tags;

pub use node::{Attribute, Document, Node};
pub use parser::parse;
pub use tags::{is_autoclosing, is_opaque, is_void};
