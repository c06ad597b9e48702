//! rciod entry point

#![deny(clippy::unwrap_used)]

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use rcio_service::{Cli, daemon, logging};
use tracing::info;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    info!("Starting rciod v{}", env!("CARGO_PKG_VERSION"));

    match daemon::run(&cli).await {
        Ok(_report) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            daemon::report_failure(&e);
            Ok(ExitCode::from(daemon::exit_status(&e)))
        }
    }
}
