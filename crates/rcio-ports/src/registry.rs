//! Registry construction and lookup
//!
//! Registration is all-or-nothing: [`PortRegistry::from_entries`] either
//! returns a registry holding every configured port or an error, never a
//! partial registry.

use std::collections::{BTreeMap, HashMap};

use rcio_errors::ConfigError;
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::name::sanitize_name;
use crate::port::{Direction, Port, PortId, PortKind};
use crate::DEFAULT_PULSE_WIDTH_US;

/// One configuration entry, before validation.
///
/// Entries without `port` or `dir` are not port definitions and are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawPortEntry {
    /// GPIO line number
    pub port: Option<i64>,
    /// `0` = output, `1` = input
    pub dir: Option<i64>,
    /// Idle pulse width for outputs, in µs
    pub default: Option<i64>,
}

/// Accumulates ports before they are frozen into a [`PortRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    ports: BTreeMap<PortId, Port>,
    names: HashMap<String, PortId>,
}

impl RegistryBuilder {
    /// Register one port.
    ///
    /// A label that needs sanitizing is accepted with a warning. On error the
    /// builder is left exactly as it was.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EmptyName`] for an empty label
    /// - [`ConfigError::DuplicatePort`] when the line is already registered
    /// - [`ConfigError::DuplicateName`] when the sanitized name is taken
    pub fn register(
        &mut self,
        raw_label: &str,
        id: PortId,
        direction: Direction,
        default_pulse_width: Option<i32>,
    ) -> Result<&Port, ConfigError> {
        if raw_label.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if let Some(existing) = self.ports.get(&id) {
            error!(port = %id, existing = existing.name(), "Multiple port definition");
            return Err(ConfigError::duplicate_port(id.line(), existing.name()));
        }

        let name = sanitize_name(raw_label).into_owned();
        if self.names.contains_key(&name) {
            return Err(ConfigError::DuplicateName {
                name,
                label: raw_label.to_owned(),
            });
        }
        if name != raw_label {
            warn!(label = raw_label, name = %name, "Port name is renamed");
        }

        let kind = match direction {
            Direction::Output => PortKind::Output {
                default_pulse_width: default_pulse_width.unwrap_or(DEFAULT_PULSE_WIDTH_US),
            },
            Direction::Input => {
                if default_pulse_width.is_some() {
                    debug!(port = %id, name = %name, "Ignoring default pulse width on input port");
                }
                PortKind::Input
            }
        };

        self.names.insert(name.clone(), id);
        let port = Port::new(id, name, raw_label.to_owned(), kind);
        Ok(self.ports.entry(id).or_insert(port))
    }

    /// Validate and register one raw configuration entry.
    ///
    /// Returns `Ok(None)` when the entry lacks `port` or `dir`.
    ///
    /// # Errors
    ///
    /// Any error from [`register`](Self::register), plus
    /// [`ConfigError::InvalidDirection`], [`ConfigError::InvalidPort`] and
    /// [`ConfigError::InvalidDefault`] for out-of-range values.
    pub fn register_entry(
        &mut self,
        label: &str,
        entry: &RawPortEntry,
    ) -> Result<Option<&Port>, ConfigError> {
        let (Some(port), Some(dir)) = (entry.port, entry.dir) else {
            warn!(label, "Entry has no port/dir definition, skipping");
            return Ok(None);
        };

        let direction = Direction::from_config(dir).ok_or_else(|| ConfigError::InvalidDirection {
            label: label.to_owned(),
            value: dir,
        })?;
        let Ok(line) = u32::try_from(port) else {
            return Err(ConfigError::InvalidPort {
                label: label.to_owned(),
                value: port,
            });
        };
        let default_pulse_width = match entry.default {
            Some(value) => match i32::try_from(value) {
                Ok(width) => Some(width),
                Err(_) => {
                    return Err(ConfigError::InvalidDefault {
                        label: label.to_owned(),
                        value,
                    });
                }
            },
            None => None,
        };

        self.register(label, PortId::new(line), direction, default_pulse_width)
            .map(Some)
    }

    /// Number of ports registered so far.
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// Whether nothing has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Freeze the registry.
    ///
    /// # Errors
    ///
    /// [`ConfigError::EmptyRegistry`] when no port was registered.
    pub fn build(self) -> Result<PortRegistry, ConfigError> {
        if self.ports.is_empty() {
            error!("No configurable ports");
            return Err(ConfigError::EmptyRegistry);
        }
        Ok(PortRegistry {
            ports: self.ports,
            names: self.names,
        })
    }
}

/// Immutable set of configured ports, ordered by line number.
#[derive(Debug, Clone)]
pub struct PortRegistry {
    ports: BTreeMap<PortId, Port>,
    names: HashMap<String, PortId>,
}

impl PortRegistry {
    /// Start an empty builder.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Build a registry from labelled configuration entries.
    ///
    /// # Errors
    ///
    /// The first error hit by any entry, or [`ConfigError::EmptyRegistry`]
    /// when no entry defines a port. Nothing is kept on error.
    pub fn from_entries<'a, L, I>(entries: I) -> Result<Self, ConfigError>
    where
        L: AsRef<str>,
        I: IntoIterator<Item = (L, &'a RawPortEntry)>,
    {
        let mut builder = Self::builder();
        for (label, entry) in entries {
            let label = label.as_ref();
            debug!(
                label,
                port = ?entry.port,
                dir = ?entry.dir,
                default = ?entry.default,
                "Port entry"
            );
            if let Err(e) = builder.register_entry(label, entry) {
                error!(label, error = %e, "Parameter parse error");
                return Err(e);
            }
        }
        builder.build()
    }

    /// Look up a port by line number.
    pub fn get(&self, id: PortId) -> Option<&Port> {
        self.ports.get(&id)
    }

    /// Look up a port by sanitized name.
    pub fn by_name(&self, name: &str) -> Option<&Port> {
        self.names.get(name).and_then(|id| self.ports.get(id))
    }

    /// All ports, by ascending line number.
    pub fn iter(&self) -> impl Iterator<Item = &Port> {
        self.ports.values()
    }

    /// Output ports, by ascending line number.
    pub fn outputs(&self) -> impl Iterator<Item = &Port> {
        self.iter().filter(|p| p.direction() == Direction::Output)
    }

    /// Input ports, by ascending line number.
    pub fn inputs(&self) -> impl Iterator<Item = &Port> {
        self.iter().filter(|p| p.direction() == Direction::Input)
    }

    /// Number of ports.
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// Always false for a built registry.
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}
