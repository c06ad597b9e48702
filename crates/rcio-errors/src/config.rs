//! Configuration and port registration errors.
//!
//! All of these abort startup before any hardware interaction.

/// Errors raised while loading configuration or building the port registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Two entries claim the same line number
    #[error("Port {port} is already registered as '{existing}'")]
    DuplicatePort {
        /// Line number claimed twice
        port: u32,
        /// Name of the port that registered the line first
        existing: String,
    },

    /// Two labels sanitize to the same topic name
    #[error("Label '{label}' sanitizes to '{name}', which is already in use")]
    DuplicateName {
        /// Sanitized name in conflict
        name: String,
        /// Raw label of the rejected entry
        label: String,
    },

    /// No port survived registration
    #[error("No configurable ports")]
    EmptyRegistry,

    /// An entry has an empty label
    #[error("Port label must not be empty")]
    EmptyName,

    /// `dir` is neither 0 (output) nor 1 (input)
    #[error("Invalid direction {value} for '{label}': expected 0 (output) or 1 (input)")]
    InvalidDirection {
        /// Raw label of the entry
        label: String,
        /// Value found in the configuration
        value: i64,
    },

    /// `port` is not a usable line number
    #[error("Invalid port number {value} for '{label}'")]
    InvalidPort {
        /// Raw label of the entry
        label: String,
        /// Value found in the configuration
        value: i64,
    },

    /// `default` does not fit a 32-bit pulse width
    #[error("Invalid default pulse width {value} for '{label}'")]
    InvalidDefault {
        /// Raw label of the entry
        label: String,
        /// Value found in the configuration
        value: i64,
    },

    /// The configuration document could not be parsed
    #[error("Parameter parse error: {0}")]
    Parse(String),

    /// The configuration file could not be read
    #[error("Failed to read configuration {path}: {reason}")]
    Read {
        /// Path that was read
        path: String,
        /// Underlying I/O failure
        reason: String,
    },
}

impl ConfigError {
    /// Create a duplicate port error.
    pub fn duplicate_port(port: u32, existing: impl Into<String>) -> Self {
        ConfigError::DuplicatePort {
            port,
            existing: existing.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        ConfigError::Parse(msg.into())
    }

    /// Label of the offending entry, when the error concerns a single entry.
    pub fn label(&self) -> Option<&str> {
        match self {
            ConfigError::DuplicateName { label, .. }
            | ConfigError::InvalidDirection { label, .. }
            | ConfigError::InvalidPort { label, .. }
            | ConfigError::InvalidDefault { label, .. } => Some(label),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_port_display() {
        let err = ConfigError::duplicate_port(18, "left_aileron");
        let msg = err.to_string();
        assert!(msg.contains("18"));
        assert!(msg.contains("left_aileron"));
    }

    #[test]
    fn test_label_accessor() {
        let err = ConfigError::InvalidDirection {
            label: "rudder".into(),
            value: 7,
        };
        assert_eq!(err.label(), Some("rudder"));
        assert_eq!(ConfigError::EmptyRegistry.label(), None);
    }
}
