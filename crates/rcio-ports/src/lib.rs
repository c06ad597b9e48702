//! Port registry for rcio
//!
//! A port is one GPIO line, used either as a servo output or as an RC
//! receiver input for the whole lifetime of the process. The registry is
//! built once from configuration and is immutable afterwards.
//!
//! ```
//! use rcio_ports::{Direction, PortId, PortRegistry};
//!
//! let mut builder = PortRegistry::builder();
//! builder.register("left-aileron!", PortId::new(18), Direction::Output, None)?;
//! builder.register("throttle", PortId::new(23), Direction::Input, None)?;
//! let registry = builder.build()?;
//!
//! let aileron = registry.get(PortId::new(18)).ok_or("missing")?;
//! assert_eq!(aileron.name(), "left_aileron_");
//! assert_eq!(aileron.default_pulse_width(), Some(1500));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod name;
pub mod port;
pub mod registry;

pub use name::sanitize_name;
pub use port::{Direction, Port, PortId, PortKind};
pub use registry::{PortRegistry, RawPortEntry, RegistryBuilder};

/// Pulse width used for outputs that do not configure a default, in µs.
pub const DEFAULT_PULSE_WIDTH_US: i32 = 1500;
