//! # rcio-engine
//!
//! The I/O engine owns the port registry, one GPIO daemon connection and the
//! bus subscriptions, and is the only component that talks to the daemon.
//!
//! ## Data flow
//!
//! ```text
//! daemon edge ──► PulseDecoder ──► bus.publish(<port name>, width_us)
//! bus command ──► PwmDriver::set_pulse ──► daemon.write_pulse
//! ```
//!
//! Edges arrive on the daemon's notification thread and commands on whatever
//! thread publishes to the bus. Each port's state has its own lock; no lock
//! spans ports.
//!
//! ## Lifecycle
//!
//! - [`RcioEngine::start`] connects once, then sets up every port. A
//!   connection failure aborts before any port is touched.
//! - Outputs: mode OUTPUT, driver construction (writes the default), then the
//!   command subscription.
//! - Inputs: mode INPUT, pull-down, then the edge subscription.
//! - [`RcioEngine::shutdown`] (also run on drop, and on a failed start)
//!   cancels all subscriptions, restores every output once, then disconnects.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use rcio_bus::{LocalBus, MessageBus};
//! use rcio_engine::RcioEngine;
//! use rcio_pigpio::DaemonEndpoint;
//! use rcio_test_helpers::prelude::*;
//!
//! let daemon = MockGpioDaemon::new();
//! let bus = Arc::new(LocalBus::new());
//! let mut engine = RcioEngine::start(
//!     &MockConnector::new(daemon.clone()),
//!     &DaemonEndpoint::default(),
//!     mixed_registry()?,
//!     Arc::clone(&bus),
//! )?;
//!
//! bus.publish("left_aileron", 3000)?;
//! assert_eq!(daemon.writes_to(18), vec![1500, 2500]);
//!
//! let report = engine.shutdown();
//! assert!(report.is_clean());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod engine;
pub mod input;
pub mod report;

pub use engine::{EngineState, RcioEngine};
pub use input::InputChannel;
pub use report::ShutdownReport;
