//! Edge events and timestamps

use core::fmt;

use rcio_ports::PortId;

/// Transition observed on an input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Low to high
    Rising,
    /// High to low
    Falling,
}

impl Edge {
    /// Edge that produced the given new line level.
    pub fn from_level(high: bool) -> Self {
        if high { Edge::Rising } else { Edge::Falling }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Rising => write!(f, "rising"),
            Edge::Falling => write!(f, "falling"),
        }
    }
}

/// Microsecond timestamp, wrapping at 2^32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Tick(u32);

impl Tick {
    /// Wrap a raw tick.
    pub const fn new(us: u32) -> Self {
        Self(us)
    }

    /// Raw tick in microseconds.
    pub const fn as_micros(self) -> u32 {
        self.0
    }

    /// Microseconds from `earlier` to `self`, across a counter wrap.
    pub const fn since(self, earlier: Tick) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }
}

impl From<u32> for Tick {
    fn from(us: u32) -> Self {
        Self(us)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0)
    }
}

/// One edge on one port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEvent {
    /// Port the edge was observed on
    pub port: PortId,
    /// Transition type
    pub edge: Edge,
    /// Timestamp of the transition
    pub tick: Tick,
}

impl EdgeEvent {
    /// Build an event.
    pub fn new(port: PortId, edge: Edge, tick: Tick) -> Self {
        Self { port, edge, tick }
    }
}
