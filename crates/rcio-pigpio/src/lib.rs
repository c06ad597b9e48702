//! GPIO daemon access for rcio
//!
//! [`GpioDaemon`] is the only seam through which the rest of the workspace
//! touches hardware. [`PigpiodClient`] implements it over the pigpiod socket
//! interface; tests substitute a mock.
//!
//! # Architecture
//!
//! - [`daemon`]: The [`GpioDaemon`] and [`Connect`] traits and their
//!   vocabulary
//! - [`endpoint`]: Daemon address
//! - [`protocol`]: pigpiod command and notification frames, error codes
//! - [`client`]: Blocking socket client and its notification thread

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod client;
pub mod daemon;
pub mod endpoint;
pub mod protocol;

pub use client::{PigpiodClient, PigpiodConnector};
pub use daemon::{Connect, EdgeCallback, EdgeSubscriptionId, GpioDaemon, PinMode, Pull};
pub use endpoint::DaemonEndpoint;

/// Highest line that pigpiod can report edges for.
pub const MAX_MONITORED_LINE: u32 = 31;
