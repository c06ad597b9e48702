//! Daemon configuration
//!
//! ```yaml
//! daemon:
//!   host: localhost
//!   port: 8888
//! ports:
//!   left-aileron: { port: 18, dir: 0, default: 1500 }
//!   throttle:     { port: 23, dir: 1 }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use rcio_errors::ConfigError;
use rcio_pigpio::DaemonEndpoint;
use rcio_ports::{PortRegistry, RawPortEntry};
use serde::Deserialize;
use tracing::{debug, info};

/// Everything `rciod` reads from its configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Where pigpiod listens
    pub daemon: DaemonEndpoint,
    /// Port entries keyed by label
    pub ports: BTreeMap<String, RawPortEntry>,
}

impl ServiceConfig {
    /// Read and parse a YAML configuration file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] when the file cannot be read,
    /// [`ConfigError::Parse`] when it is not a valid configuration.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::Read {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        let config = Self::from_yaml_str(&content)?;
        info!(
            path = %path.display(),
            daemon = %config.daemon,
            entries = config.ports.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parse a YAML document.
    ///
    /// An empty document yields the default configuration.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed YAML or mistyped fields.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ConfigError::parse(e.to_string()))
    }

    /// Replace the daemon address with values given on the command line.
    pub fn apply_overrides(&mut self, host: Option<String>, port: Option<u16>) {
        if let Some(host) = host {
            debug!(host = %host, "Daemon host overridden");
            self.daemon.host = host;
        }
        if let Some(port) = port {
            debug!(port, "Daemon port overridden");
            self.daemon.port = port;
        }
    }

    /// Build the port registry from the `ports` table.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] raised by [`PortRegistry::from_entries`].
    pub fn registry(&self) -> Result<PortRegistry, ConfigError> {
        PortRegistry::from_entries(&self.ports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcio_ports::{Direction, PortId};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    const SAMPLE: &str = r"
daemon:
  host: raspberrypi.local
ports:
  left-aileron: { port: 18, dir: 0, default: 1200 }
  throttle: { port: 23, dir: 1 }
  comment: { note: not a port }
";

    #[test]
    fn test_parse_sample() -> TestResult {
        let config = ServiceConfig::from_yaml_str(SAMPLE)?;
        assert_eq!(config.daemon.host, "raspberrypi.local");
        assert_eq!(config.daemon.port, 8888);
        assert_eq!(config.ports.len(), 3);

        let registry = config.registry()?;
        assert_eq!(registry.len(), 2);
        let aileron = registry.get(PortId::new(18)).ok_or("port 18 missing")?;
        assert_eq!(aileron.name(), "left_aileron");
        assert_eq!(aileron.default_pulse_width(), Some(1200));
        let throttle = registry.by_name("throttle").ok_or("throttle missing")?;
        assert_eq!(throttle.direction(), Direction::Input);
        Ok(())
    }

    #[test]
    fn test_empty_document_is_default() -> TestResult {
        let config = ServiceConfig::from_yaml_str("  \n")?;
        assert_eq!(config, ServiceConfig::default());
        assert!(matches!(config.registry(), Err(ConfigError::EmptyRegistry)));
        Ok(())
    }

    #[test]
    fn test_mistyped_field_is_parse_error() {
        let result = ServiceConfig::from_yaml_str("ports:\n  a: { port: eighteen, dir: 0 }\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_overrides() -> TestResult {
        let mut config = ServiceConfig::from_yaml_str(SAMPLE)?;
        config.apply_overrides(None, Some(9999));
        assert_eq!(config.daemon.to_string(), "raspberrypi.local:9999");
        config.apply_overrides(Some("10.0.0.2".into()), None);
        assert_eq!(config.daemon.to_string(), "10.0.0.2:9999");
        Ok(())
    }
}
