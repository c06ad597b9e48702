//! Daemon address

use core::fmt;

use serde::{Deserialize, Serialize};

/// Default pigpiod host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default pigpiod port.
pub const DEFAULT_PORT: u16 = 8888;

/// Where the GPIO daemon listens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonEndpoint {
    /// Host name or address
    pub host: String,
    /// TCP port
    pub port: u16,
}

impl DaemonEndpoint {
    /// Endpoint at `host:port`.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Default for DaemonEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl fmt::Display for DaemonEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
