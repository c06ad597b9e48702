//! Prelude module for convenient error handling imports.
//!
//! # Example
//!
//! ```
//! use rcio_errors::prelude::*;
//!
//! fn write(line: u32) -> HardwareResult {
//!     Err(HardwareError::unsupported_line(GpioOperation::SubscribeEdges, line))
//! }
//!
//! assert!(write(40).is_err());
//! ```

pub use crate::{
    HardwareResult, Result,
    bus::BusError,
    common::{ErrorCategory, ErrorSeverity, RcioError},
    config::ConfigError,
    decode::DecodeError,
    hardware::{ConnectionError, GpioOperation, HardwareError},
};
