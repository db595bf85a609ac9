//! Error taxonomy for pattern compilation, I/O, and CLI usage.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Top-level error type returned by library entry points.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A pattern or expression failed to compile.
    #[error("pattern syntax error at byte {}", .0.offset)]
    Pattern(#[from] PatternError),

    /// The underlying regex engine rejected a term.
    #[error("regex compile error")]
    Regex(#[from] regex::Error),

    /// An I/O failure occurred while reading input or writing output.
    #[error("io error{}", .path.as_ref().map(|p| format!(" ({})", p.display())).unwrap_or_default())]
    Io {
        /// The path involved, if any (absent for stdin/stdout).
        path: Option<PathBuf>,

        /// The underlying I/O error.
        #[source]
        error: io::Error,
    },

    /// Invalid CLI flags or a missing/ambiguous pattern source.
    #[error("usage error: {0}")]
    Usage(String),
}

impl Error {
    /// Construct an [`Error::Io`] tagged with the path that caused it.
    pub fn io(path: impl Into<Option<PathBuf>>, error: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            error,
        }
    }

    /// A short, single-line, bounded description suitable for direct display to users.
    ///
    /// Per the error design, messages are single-line and bounded to 512 bytes.
    pub fn user_message(&self) -> String {
        let msg = self.to_string().replace('\n', " ");
        if msg.len() > 512 {
            msg[..512].to_string()
        } else {
            msg
        }
    }
}

/// The specific kind of failure encountered while compiling a pattern or expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum PatternErrorKind {
    /// A `[a:b:c]` range specifier was malformed.
    Range,
    /// A quoted string lexeme was never closed before EOF.
    UnterminatedQuote,
    /// General pattern grammar violation.
    Syntax,
    /// A `@name(...)` hook referenced an unknown name.
    UnknownHook,
    /// Expression grouping (`{...}`) nested deeper than the supported limit.
    NestingTooDeep,
}

/// A pattern/expression compile failure, carrying the 0-based byte offset
/// within the offending pattern text at which the problem was detected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind} at offset {offset}: {detail}")]
pub struct PatternError {
    /// 0-based byte offset into the pattern text.
    pub offset: usize,
    /// The category of failure.
    pub kind: PatternErrorKind,
    /// A short human-readable description.
    pub detail: String,
}

impl PatternError {
    /// Build a new pattern error at the given offset.
    pub fn new(offset: usize, kind: PatternErrorKind, detail: impl Into<String>) -> Self {
        Self {
            offset,
            kind,
            detail: detail.into(),
        }
    }
}

/// Convenience alias for results produced throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
