//! Servo output driver for rcio
//!
//! A [`PwmDriver`] owns one output port. Every commanded value is clamped to
//! the servo range and written to the GPIO daemon exactly once. Write
//! failures are logged and counted; the caller always gets the clamped value
//! back and the driver keeps the last width that was written successfully.
//!
//! ## Lifecycle
//!
//! ```text
//! new() ──► Active ──restore()──► Restored
//!   │         │ set_pulse()          │ set_pulse() is dropped
//!   │         ▼                      ▼
//! writes default   writes clamped    writes default once
//! ```
//!
//! ## Example
//!
//! ```rust
//! use rcio_driver::PwmDriver;
//! use rcio_ports::PortId;
//! use rcio_test_helpers::mock::MockGpioDaemon;
//!
//! let daemon = MockGpioDaemon::new();
//! let driver = PwmDriver::new(PortId::new(18), "aileron", 1500, daemon.clone());
//!
//! assert_eq!(driver.set_pulse(100), 500);
//! assert_eq!(driver.set_pulse(3000), 2500);
//! assert_eq!(daemon.writes_to(18), vec![1500, 500, 2500]);
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod driver;
pub mod state;

pub use driver::PwmDriver;
pub use state::{DriverMetrics, DriverStatus};

/// Shortest pulse the driver emits, in µs.
pub const MIN_PULSE_WIDTH_US: i32 = 500;

/// Longest pulse the driver emits, in µs.
pub const MAX_PULSE_WIDTH_US: i32 = 2500;

/// Saturate a commanded width to the servo range.
pub fn clamp_pulse_width(requested: i32) -> i32 {
    requested.clamp(MIN_PULSE_WIDTH_US, MAX_PULSE_WIDTH_US)
}
