//! # rcio-service
//!
//! `rciod`: loads the port configuration, starts the I/O engine against
//! pigpiod, bridges the in-process bus to stdio as JSON lines and restores
//! every output when a shutdown signal arrives.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod bridge;
pub mod cli;
pub mod config;
pub mod daemon;
pub mod logging;
pub mod signals;

pub use bridge::{BridgeError, BusMessage, StdioBridge};
pub use cli::Cli;
pub use config::ServiceConfig;
pub use daemon::{run, serve};
pub use signals::ShutdownSignal;
