//! Command line interface

use std::path::PathBuf;

use clap::Parser;

/// Servo output and RC input bridge between pigpiod and a message bus.
#[derive(Debug, Clone, Parser)]
#[command(name = "rciod")]
#[command(about = "Servo output and RC input bridge between pigpiod and a message bus")]
#[command(version)]
pub struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "RCIO_CONFIG", value_name = "PATH")]
    pub config: PathBuf,

    /// pigpiod host, overrides the configuration file
    #[arg(long, env = "RCIO_PIGPIOD_HOST")]
    pub host: Option<String>,

    /// pigpiod port, overrides the configuration file
    #[arg(long, env = "RCIO_PIGPIOD_PORT")]
    pub port: Option<u16>,

    /// Verbose output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Do not bridge the bus to stdin/stdout
    #[arg(long)]
    pub no_stdio: bool,
}
