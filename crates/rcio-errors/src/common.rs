//! Common error types and classification used across all rcio crates.

use core::fmt;

use crate::{BusError, ConfigError, ConnectionError, DecodeError, HardwareError};

/// Top-level error type that can wrap all rcio sub-errors.
#[derive(Debug, thiserror::Error)]
pub enum RcioError {
    /// Configuration and registration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// GPIO daemon could not be reached
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// A single GPIO daemon call failed
    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),

    /// Pulse decoder errors
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Message bus errors
    #[error("Bus error: {0}")]
    Bus(#[from] BusError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),
}

impl RcioError {
    /// Coarse category, for metrics and log fields.
    pub fn category(&self) -> ErrorCategory {
        match self {
            RcioError::Config(_) => ErrorCategory::Config,
            RcioError::Connection(_) => ErrorCategory::Connection,
            RcioError::Hardware(_) => ErrorCategory::Hardware,
            RcioError::Decode(_) => ErrorCategory::Decode,
            RcioError::Bus(_) => ErrorCategory::Bus,
            RcioError::Io(_) => ErrorCategory::IO,
        }
    }

    /// How loudly this error should be reported.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RcioError::Config(_) | RcioError::Connection(_) => ErrorSeverity::Critical,
            RcioError::Hardware(e) => e.severity(),
            RcioError::Decode(_) => ErrorSeverity::Info,
            RcioError::Bus(_) | RcioError::Io(_) => ErrorSeverity::Error,
        }
    }

    /// Whether this error must abort startup.
    ///
    /// Configuration and connection failures are fatal; everything else is
    /// reported and the bridge keeps running.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RcioError::Config(_) | RcioError::Connection(_))
    }
}

impl From<std::io::Error> for RcioError {
    fn from(e: std::io::Error) -> Self {
        RcioError::Io(e)
    }
}

/// Which layer an [`RcioError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Configuration errors
    Config = 0,
    /// GPIO daemon connection errors
    Connection = 1,
    /// Per-call hardware errors
    Hardware = 2,
    /// Pulse decoding errors
    Decode = 3,
    /// Message bus errors
    Bus = 4,
    /// I/O errors
    IO = 5,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "Config"),
            ErrorCategory::Connection => write!(f, "Connection"),
            ErrorCategory::Hardware => write!(f, "Hardware"),
            ErrorCategory::Decode => write!(f, "Decode"),
            ErrorCategory::Bus => write!(f, "Bus"),
            ErrorCategory::IO => write!(f, "IO"),
        }
    }
}

/// Error severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Informational, expected during normal operation
    Info = 0,
    /// Degraded; the bridge keeps running
    Warning = 1,
    /// The operation failed
    Error = 2,
    /// Critical, the process cannot continue
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
