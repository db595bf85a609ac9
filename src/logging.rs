//! Structured logging configuration, reproducing the shape of `traceconf::TracingConfig`
//! (not a path dependency, since `traceconf` is not published) as a small
//! `#[clap(flatten)]`-able struct.

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Logging options, flattened into the top-level CLI.
#[derive(Debug, Clone, Parser)]
pub struct LoggingConfig {
    /// Set the minimum level for logs. Logs below this level are dropped.
    #[clap(long = "log-level", default_value = "warn")]
    pub level: LogLevel,
}

/// Minimum severity of emitted log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl LoggingConfig {
    /// Install a global `tracing` subscriber writing to stderr at the
    /// configured level. Non-fatal conditions (parser truncation, autoclose
    /// decisions, per-file skip warnings) are emitted at `debug`/`warn`, so
    /// the default `warn` level keeps normal runs quiet.
    pub fn init(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_filter_str()));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
