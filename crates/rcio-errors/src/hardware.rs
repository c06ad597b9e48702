//! GPIO daemon errors.
//!
//! [`ConnectionError`] is fatal and only occurs while establishing the single
//! daemon connection. [`HardwareError`] covers one failed daemon call; callers
//! log it and carry on with the last known state.

use core::fmt;

use crate::common::ErrorSeverity;

/// Daemon operation that produced a [`HardwareError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpioOperation {
    /// Configure a line as input or output
    SetMode,
    /// Configure the pull resistor of a line
    SetPull,
    /// Write a servo pulse width
    WritePulse,
    /// Read the level of all lines in bank 1
    ReadBank,
    /// Start edge notifications for a line
    SubscribeEdges,
    /// Stop edge notifications for a line
    Unsubscribe,
    /// Close the daemon connection
    Disconnect,
}

impl fmt::Display for GpioOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpioOperation::SetMode => write!(f, "set_mode"),
            GpioOperation::SetPull => write!(f, "set_pull"),
            GpioOperation::WritePulse => write!(f, "write_pulse"),
            GpioOperation::ReadBank => write!(f, "read_bank"),
            GpioOperation::SubscribeEdges => write!(f, "subscribe_edges"),
            GpioOperation::Unsubscribe => write!(f, "unsubscribe"),
            GpioOperation::Disconnect => write!(f, "disconnect"),
        }
    }
}

/// A single GPIO daemon call failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HardwareError {
    /// The daemon answered with a negative status code
    #[error("{operation} on line {line} failed: {message} ({code})")]
    Daemon {
        /// Operation that failed
        operation: GpioOperation,
        /// Line the operation targeted
        line: u32,
        /// Status code returned by the daemon
        code: i32,
        /// Human readable translation of `code`
        message: String,
    },

    /// The line cannot be used for this operation
    #[error("Line {line} cannot be used for {operation}")]
    UnsupportedLine {
        /// Operation that was refused
        operation: GpioOperation,
        /// Line that was refused
        line: u32,
    },

    /// The socket to the daemon failed mid-call
    #[error("I/O failure during {operation}: {reason}")]
    Io {
        /// Operation in flight
        operation: GpioOperation,
        /// Underlying I/O failure
        reason: String,
    },

    /// The connection was already closed
    #[error("GPIO daemon connection is closed")]
    Disconnected,
}

impl HardwareError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            HardwareError::Daemon { .. } | HardwareError::UnsupportedLine { .. } => {
                ErrorSeverity::Warning
            }
            HardwareError::Io { .. } | HardwareError::Disconnected => ErrorSeverity::Error,
        }
    }

    /// Operation that failed, if known.
    pub fn operation(&self) -> Option<GpioOperation> {
        match self {
            HardwareError::Daemon { operation, .. }
            | HardwareError::UnsupportedLine { operation, .. }
            | HardwareError::Io { operation, .. } => Some(*operation),
            HardwareError::Disconnected => None,
        }
    }

    /// Create an unsupported line error.
    pub fn unsupported_line(operation: GpioOperation, line: u32) -> Self {
        HardwareError::UnsupportedLine { operation, line }
    }

    /// Create an I/O error for an operation.
    pub fn io(operation: GpioOperation, reason: impl Into<String>) -> Self {
        HardwareError::Io {
            operation,
            reason: reason.into(),
        }
    }
}

/// The GPIO daemon could not be reached or refused the handshake.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// Host name did not resolve
    #[error("Cannot resolve GPIO daemon address {endpoint}: {reason}")]
    Resolve {
        /// `host:port` that was looked up
        endpoint: String,
        /// Resolver failure
        reason: String,
    },

    /// TCP connection failed
    #[error("Cannot connect to GPIO daemon at {endpoint}: {reason}")]
    Unreachable {
        /// `host:port` that was dialed
        endpoint: String,
        /// Socket failure
        reason: String,
    },

    /// The daemon answered but refused a handshake step
    #[error("GPIO daemon at {endpoint} refused {stage}: {message}")]
    Handshake {
        /// `host:port` of the daemon
        endpoint: String,
        /// Handshake step that failed
        stage: String,
        /// Daemon supplied reason
        message: String,
    },
}

impl ConnectionError {
    /// Create an unreachable error.
    pub fn unreachable(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        ConnectionError::Unreachable {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// Endpoint the connection attempt targeted.
    pub fn endpoint(&self) -> &str {
        match self {
            ConnectionError::Resolve { endpoint, .. }
            | ConnectionError::Unreachable { endpoint, .. }
            | ConnectionError::Handshake { endpoint, .. } => endpoint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hardware_error_severity() {
        let err = HardwareError::Daemon {
            operation: GpioOperation::WritePulse,
            line: 18,
            code: -8,
            message: "pulsewidth not 0 or 500-2500".into(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Warning);
        assert_eq!(HardwareError::Disconnected.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_hardware_error_operation() {
        let err = HardwareError::io(GpioOperation::SetPull, "broken pipe");
        assert_eq!(err.operation(), Some(GpioOperation::SetPull));
        assert_eq!(HardwareError::Disconnected.operation(), None);
    }

    #[test]
    fn test_connection_error_endpoint() {
        let err = ConnectionError::unreachable("localhost:8888", "refused");
        assert_eq!(err.endpoint(), "localhost:8888");
        assert!(err.to_string().contains("localhost:8888"));
    }
}
