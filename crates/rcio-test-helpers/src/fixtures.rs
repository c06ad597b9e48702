//! Port registry fixtures.

use rcio_errors::ConfigError;
use rcio_ports::{Direction, PortId, PortRegistry};

/// Two outputs and two inputs:
///
/// | line | label          | name           | direction | default |
/// |------|----------------|----------------|-----------|---------|
/// | 18   | `left-aileron` | `left_aileron` | output    | 1500    |
/// | 19   | `gear`         | `gear`         | output    | 1000    |
/// | 23   | `throttle`     | `throttle`     | input     |         |
/// | 24   | `rudder`       | `rudder`       | input     |         |
pub fn mixed_registry() -> Result<PortRegistry, ConfigError> {
    let mut builder = PortRegistry::builder();
    builder.register("left-aileron", PortId::new(18), Direction::Output, None)?;
    builder.register("gear", PortId::new(19), Direction::Output, Some(1000))?;
    builder.register("throttle", PortId::new(23), Direction::Input, None)?;
    builder.register("rudder", PortId::new(24), Direction::Input, None)?;
    builder.build()
}

/// One output named `servo` on `line` with the given default.
pub fn single_output_registry(line: u32, default: i32) -> Result<PortRegistry, ConfigError> {
    let mut builder = PortRegistry::builder();
    builder.register("servo", PortId::new(line), Direction::Output, Some(default))?;
    builder.build()
}
