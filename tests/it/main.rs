//! Integration tests, exercising `htgrep`'s public entrypoint end-to-end
//! against in-memory buffers rather than unit-level internals.

mod laws;
mod scenarios;
