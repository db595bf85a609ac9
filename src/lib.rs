//! `htgrep`: search HTML documents with a structured, composable pattern language.

pub mod cli;
pub mod error;
pub mod expr;
pub mod format;
pub mod html;
pub mod io;
pub mod lexer;
pub mod logging;
pub mod pattern;
pub mod range;
pub mod term;
pub mod walk;

use std::path::PathBuf;

use tracing::{debug, warn};

use cli::Cli;
use error::Error;
use expr::ExprNode;
use term::TermFlags;

/// Everything a run needs, threaded explicitly rather than held in
/// module-level state (`spec.md` §9 "Global mutable state → explicit context").
pub struct RunContext {
    pub cli: Cli,
    pub expr: ExprNode,
}

impl RunContext {
    /// Build a run context from parsed CLI options, compiling the pattern
    /// source (literal or `-f PATH`) into an expression tree.
    pub fn new(cli: Cli) -> Result<Self, Error> {
        let pattern_text = match (&cli.pattern, &cli.pattern_file) {
            (Some(text), None) => text.clone().into_bytes(),
            (None, Some(path)) => std::fs::read(path).map_err(|e| Error::io(Some(path.clone()), e))?,
            _ => unreachable!("Cli::validate enforces exactly one pattern source"),
        };

        let defaults = TermFlags {
            case_insensitive: cli.case_insensitive,
            invert: cli.invert,
            whole_word: false,
        };
        let expr = expr::compile(&pattern_text, defaults)?;
        Ok(Self { cli, expr })
    }
}

/// Run the tool end-to-end: acquire input(s), evaluate the compiled
/// expression, and write rendered output to the configured sink.
///
/// Per-file I/O errors are warned and skipped (`spec.md` §7 Propagation);
/// only compile-time failures (already surfaced by [`RunContext::new`]) abort
/// the whole run.
pub fn run(ctx: &RunContext) -> Result<(), Error> {
    let mut sink = io::Sink::open(ctx.cli.output.as_ref())?;
    let is_terminal = ctx.cli.output.is_none() && atty::is(atty::Stream::Stdout);
    let colorize = ctx.cli.should_colorize(is_terminal);

    if ctx.cli.files.is_empty() {
        let input = io::read_stdin()?;
        process_buffer(ctx, &input, None, &mut sink, colorize)?;
        return Ok(());
    }

    let files = walk::expand(&ctx.cli.files, ctx.cli.recurse_mode(), ctx.cli.follow_symlinks);
    for path in files {
        match io::read_file(&path) {
            Ok(input) => {
                if let Err(error) = process_buffer(ctx, input.bytes(), Some(&path), &mut sink, colorize) {
                    warn!(path = %path.display(), %error, "skipping file");
                }
            }
            Err(error) => warn!(path = %path.display(), %error, "skipping file"),
        }
    }
    Ok(())
}

fn process_buffer(
    ctx: &RunContext,
    buffer: &[u8],
    path: Option<&PathBuf>,
    sink: &mut io::Sink,
    colorize: bool,
) -> Result<(), Error> {
    // Fast mode only covers a flat leaf sequence (no alternatives/groups) and
    // has no per-node index to honor `-n`/`-l` with, since it re-parses a
    // streamed buffer between stages rather than keeping one `Document`
    // alive; outside that shape, fall back to the normal executor.
    if ctx.cli.fast && !ctx.cli.show_index && !ctx.cli.list_structure {
        match expr::executor::run_fast(&ctx.expr, buffer) {
            Some((rendered, count)) => {
                if ctx.cli.count {
                    sink.write(count.to_string().as_bytes())?;
                    sink.write(b"\n")?;
                } else if colorize {
                    sink.write(&format::colorize(&rendered))?;
                } else {
                    sink.write(&rendered)?;
                }
                return Ok(());
            }
            None => {
                debug!(
                    path = ?path,
                    "fast mode requires a flat leaf sequence; falling back to the normal executor"
                );
            }
        }
    }

    let doc = html::parse(buffer);
    for node in doc.nodes() {
        if node.truncated {
            debug!(
                path = ?path,
                offset = node.offset_in(buffer),
                tag = %String::from_utf8_lossy(node.tag),
                "node truncated at end of input"
            );
        }
    }

    let matches = expr::executor::run(&ctx.expr, &doc);

    if ctx.cli.count {
        sink.write(matches.len().to_string().as_bytes())?;
        sink.write(b"\n")?;
        return Ok(());
    }

    for entry in &matches {
        if ctx.cli.show_index {
            sink.write(entry.node.to_string().as_bytes())?;
            sink.write(b": ")?;
        }
        let format = if ctx.cli.list_structure {
            Some("%L:%t:%C:%s%n")
        } else {
            entry.format()
        };
        let rendered = format::render(&doc, entry.node, format);
        if colorize {
            sink.write(&format::colorize(&rendered))?;
        } else {
            sink.write(&rendered)?;
        }
    }
    Ok(())
}
