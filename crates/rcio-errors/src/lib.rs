//! Centralized error types for rcio
//!
//! Every crate in the workspace reports failures through the types defined
//! here, so the daemon can decide in one place which failures abort startup
//! and which are logged while the bridge keeps running.
//!
//! # Architecture
//!
//! - [`common`]: Top-level [`RcioError`], categories and severities
//! - [`config`]: Configuration and port registration errors (fatal)
//! - [`hardware`]: GPIO daemon connection (fatal) and per-call hardware errors
//!   (logged, non-fatal)
//! - [`decode`]: Recoverable pulse decoder errors
//! - [`bus`]: Message bus errors
//!
//! # Example
//!
//! ```
//! use rcio_errors::prelude::*;
//!
//! fn check_registry(ports: usize) -> Result<usize> {
//!     if ports == 0 {
//!         return Err(ConfigError::EmptyRegistry.into());
//!     }
//!     Ok(ports)
//! }
//!
//! let err = check_registry(0).unwrap_err();
//! assert!(err.is_fatal());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod bus;
pub mod common;
pub mod config;
pub mod decode;
pub mod hardware;
pub mod prelude;

pub use bus::BusError;
pub use common::{ErrorCategory, ErrorSeverity, RcioError};
pub use config::ConfigError;
pub use decode::DecodeError;
pub use hardware::{ConnectionError, GpioOperation, HardwareError};

/// A specialized `Result` type for rcio operations.
pub type Result<T> = std::result::Result<T, RcioError>;

/// A specialized `Result` type for single GPIO daemon calls.
pub type HardwareResult<T = ()> = std::result::Result<T, HardwareError>;
