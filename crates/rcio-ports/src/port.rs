//! Port identity and static configuration

use core::fmt;

/// GPIO line number identifying a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortId(u32);

impl PortId {
    /// Wrap a line number.
    pub const fn new(line: u32) -> Self {
        Self(line)
    }

    /// The raw line number.
    pub const fn line(self) -> u32 {
        self.0
    }
}

impl From<u32> for PortId {
    fn from(line: u32) -> Self {
        Self(line)
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signal direction of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Servo output driven from bus commands
    Output,
    /// RC receiver input decoded into bus readings
    Input,
}

impl Direction {
    /// Map the configuration encoding (`0` = output, `1` = input).
    pub fn from_config(value: i64) -> Option<Self> {
        match value {
            0 => Some(Direction::Output),
            1 => Some(Direction::Input),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Output => write!(f, "output"),
            Direction::Input => write!(f, "input"),
        }
    }
}

/// Direction-specific static configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    /// Servo output with the pulse width it idles at
    Output {
        /// Pulse width written at startup and on shutdown, in µs
        default_pulse_width: i32,
    },
    /// RC receiver input
    Input,
}

/// One registered port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    id: PortId,
    name: String,
    label: String,
    kind: PortKind,
}

impl Port {
    pub(crate) fn new(id: PortId, name: String, label: String, kind: PortKind) -> Self {
        Self {
            id,
            name,
            label,
            kind,
        }
    }

    /// Line number.
    pub fn id(&self) -> PortId {
        self.id
    }

    /// Sanitized name, also used as the bus topic.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Label exactly as configured.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether sanitization changed the label.
    pub fn was_renamed(&self) -> bool {
        self.name != self.label
    }

    /// Direction-specific configuration.
    pub fn kind(&self) -> PortKind {
        self.kind
    }

    /// Signal direction.
    pub fn direction(&self) -> Direction {
        match self.kind {
            PortKind::Output { .. } => Direction::Output,
            PortKind::Input => Direction::Input,
        }
    }

    /// Configured idle pulse width; `None` for inputs.
    pub fn default_pulse_width(&self) -> Option<i32> {
        match self.kind {
            PortKind::Output {
                default_pulse_width,
            } => Some(default_pulse_width),
            PortKind::Input => None,
        }
    }
}
