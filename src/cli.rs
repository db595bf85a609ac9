//! Command-line surface: `spec.md` §6 plus the `[FULL]` additions in
//! `SPEC_FULL.md`. Grounded on `vsi::main`'s `clap::Parser` derive style,
//! including a post-parse `validate()` step (as `vsi::CmdPartial::validate`).

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::error::Error;
use crate::logging::LoggingConfig;

/// Search HTML documents with a structured, composable pattern language.
#[derive(Debug, Parser)]
#[clap(name = "htgrep", version, about)]
pub struct Cli {
    /// Case-insensitive matching.
    #[clap(short = 'i')]
    pub case_insensitive: bool,

    /// Invert the tag-term match.
    #[clap(short = 'v')]
    pub invert: bool,

    /// List node structure instead of rendering matches literally.
    #[clap(short = 'l')]
    pub list_structure: bool,

    /// Write output to PATH instead of stdout.
    #[clap(short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Read the expression from PATH instead of the PATTERN argument.
    #[clap(short = 'f', value_name = "PATH")]
    pub pattern_file: Option<PathBuf>,

    /// Extended regex syntax.
    #[clap(short = 'E')]
    pub extended_regex: bool,

    /// Follow symlinks for top-level arguments (non-recursive).
    #[clap(short = 'H')]
    pub follow_symlinks: bool,

    /// Recurse into directories, not following symlinks.
    #[clap(short = 'r')]
    pub recurse: bool,

    /// Recurse into directories, following symlinks.
    #[clap(short = 'R')]
    pub recurse_follow: bool,

    /// Fast mode: linear-only, low-memory pipeline execution.
    #[clap(short = 'F')]
    pub fast: bool,

    /// Print a count of matches instead of emitting them.
    #[clap(short = 'c')]
    pub count: bool,

    /// Prefix each match with its node index.
    #[clap(short = 'n')]
    pub show_index: bool,

    /// Colorize literal output when writing to a terminal.
    #[clap(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    #[clap(flatten)]
    pub logging: LoggingConfig,

    /// The expression pipeline, unless `-f` is given.
    pub pattern: Option<String>,

    /// Files to search; standard input is read when none are given.
    pub files: Vec<PathBuf>,
}

/// When to colorize literal output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl Cli {
    /// Validate flag combinations that `clap`'s declarative attributes can't
    /// express: exactly one pattern source, `-R` taking precedence over `-r`.
    pub fn validate(self) -> Result<Self, Error> {
        match (&self.pattern, &self.pattern_file) {
            (Some(_), Some(_)) => {
                return Err(Error::Usage(
                    "a literal PATTERN and -f PATH are mutually exclusive".into(),
                ))
            }
            (None, None) => return Err(Error::Usage("a pattern is required (PATTERN or -f PATH)".into())),
            _ => {}
        }
        Ok(self)
    }

    /// The effective directory-recursion mode, `-R` winning over `-r`.
    pub fn recurse_mode(&self) -> crate::walk::RecurseMode {
        if self.recurse_follow {
            crate::walk::RecurseMode::RecurseFollow
        } else if self.recurse {
            crate::walk::RecurseMode::Recurse
        } else {
            crate::walk::RecurseMode::None
        }
    }

    /// Whether literal output should be colorized for the given stream.
    pub fn should_colorize(&self, is_terminal: bool) -> bool {
        match self.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => is_terminal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Cli {
        Cli {
            case_insensitive: false,
            invert: false,
            list_structure: false,
            output: None,
            pattern_file: None,
            extended_regex: false,
            follow_symlinks: false,
            recurse: false,
            recurse_follow: false,
            fast: false,
            count: false,
            show_index: false,
            color: ColorMode::Auto,
            logging: LoggingConfig {
                level: crate::logging::LogLevel::Warn,
            },
            pattern: Some("div".into()),
            files: Vec::new(),
        }
    }

    #[test]
    fn requires_exactly_one_pattern_source() {
        let mut cli = base();
        cli.pattern = None;
        assert!(cli.validate().is_err());

        let mut cli = base();
        cli.pattern_file = Some(PathBuf::from("p.htgrep"));
        assert!(cli.validate().is_err());
    }

    #[test]
    fn recurse_follow_wins_over_recurse() {
        let mut cli = base();
        cli.recurse = true;
        cli.recurse_follow = true;
        assert_eq!(cli.recurse_mode(), crate::walk::RecurseMode::RecurseFollow);
    }

    #[test]
    fn color_auto_depends_on_terminal() {
        let cli = base();
        assert!(cli.should_colorize(true));
        assert!(!cli.should_colorize(false));
    }
}
