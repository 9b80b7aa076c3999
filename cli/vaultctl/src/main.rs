//! `vaultctl` binary entry point.

use clap::Parser;
use std::process::ExitCode;
use tracing::debug;
use vaultctl::{CliConfig, cli::Cli};
use vaultctl_common::{TracingConfig, init_tracing, term};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&TracingConfig::default().verbose(cli.verbose));

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            term::print_fatal(e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load(cli.config.as_deref())?;
    debug!(clusters = config.clusters.len(), "Loaded configuration");

    vaultctl::cli::run(cli.command, &config).await?;
    Ok(())
}
