//! Pulse decoder errors.
//!
//! These never leave the decoder's port: the engine logs them and waits for
//! the next edge.

use crate::common::ErrorSeverity;

/// Recoverable decoder error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A falling edge arrived before any rising edge was seen on the port
    #[error("Falling edge at tick {tick} on port {port} has no preceding rising edge")]
    UnmatchedEdge {
        /// Line the edge was observed on
        port: u32,
        /// Timestamp of the falling edge
        tick: u32,
    },
}

impl DecodeError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Info
    }
}
