//! Binary entry point, matching `vsi`/`berkeleydb`'s pattern of a
//! `thiserror`-typed library error surfaced through an `eyre`-based binary
//! for pretty top-level reporting.

use clap::Parser;
use stable_eyre::eyre::{self, Context};

use htgrep::cli::Cli;
use htgrep::RunContext;

fn main() -> eyre::Result<()> {
    stable_eyre::install()?;

    let cli = Cli::parse().validate().map_err(|e| eyre::eyre!("{}", e.user_message()))?;
    cli.logging.init();

    let ctx = RunContext::new(cli).map_err(|e| eyre::eyre!("{}", e.user_message()))?;
    htgrep::run(&ctx).context("run")?;
    Ok(())
}
