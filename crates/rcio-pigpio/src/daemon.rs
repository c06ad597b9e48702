//! GPIO daemon seam

use core::fmt;
use std::sync::Arc;

use rcio_decoder::{Edge, Tick};
use rcio_errors::{ConnectionError, HardwareResult};

use crate::endpoint::DaemonEndpoint;

/// Line mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinMode {
    /// Sampled for edges
    Input,
    /// Driven with servo pulses
    Output,
}

impl PinMode {
    /// pigpio mode code.
    pub const fn code(self) -> u32 {
        match self {
            PinMode::Input => 0,
            PinMode::Output => 1,
        }
    }
}

/// Pull resistor setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pull {
    /// Floating
    Off,
    /// Pulled to ground
    Down,
    /// Pulled to 3V3
    Up,
}

impl Pull {
    /// pigpio pull code.
    pub const fn code(self) -> u32 {
        match self {
            Pull::Off => 0,
            Pull::Down => 1,
            Pull::Up => 2,
        }
    }
}

/// Invoked from the daemon's notification thread for every edge on a line.
pub type EdgeCallback = Box<dyn Fn(Edge, Tick) + Send + Sync + 'static>;

/// Handle for one edge subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeSubscriptionId(u64);

impl EdgeSubscriptionId {
    /// Wrap a raw id.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EdgeSubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge#{}", self.0)
    }
}

/// An open connection to a GPIO daemon.
///
/// Every method is one daemon call. Implementations must accept calls from
/// several threads at once.
pub trait GpioDaemon: Send + Sync {
    /// Configure a line as input or output.
    fn set_mode(&self, line: u32, mode: PinMode) -> HardwareResult;

    /// Configure the pull resistor of a line.
    fn set_pull(&self, line: u32, pull: Pull) -> HardwareResult;

    /// Emit servo pulses of `pulse_width_us` on a line.
    fn write_pulse(&self, line: u32, pulse_width_us: u32) -> HardwareResult;

    /// Deliver both edges of a line to `callback` until unsubscribed.
    fn subscribe_edges(&self, line: u32, callback: EdgeCallback)
    -> HardwareResult<EdgeSubscriptionId>;

    /// Stop an edge subscription. Once this returns the callback is not
    /// invoked again.
    fn unsubscribe(&self, id: EdgeSubscriptionId) -> HardwareResult;

    /// Whether edge notifications still reach the subscriptions.
    ///
    /// Turns false for good once the notification stream is lost.
    fn edges_alive(&self) -> bool {
        true
    }

    /// Close the connection. Later calls fail with
    /// [`HardwareError::Disconnected`](rcio_errors::HardwareError::Disconnected);
    /// disconnecting twice is a no-op.
    fn disconnect(&self) -> HardwareResult;
}

impl<T: GpioDaemon + ?Sized> GpioDaemon for Arc<T> {
    fn set_mode(&self, line: u32, mode: PinMode) -> HardwareResult {
        (**self).set_mode(line, mode)
    }

    fn set_pull(&self, line: u32, pull: Pull) -> HardwareResult {
        (**self).set_pull(line, pull)
    }

    fn write_pulse(&self, line: u32, pulse_width_us: u32) -> HardwareResult {
        (**self).write_pulse(line, pulse_width_us)
    }

    fn subscribe_edges(
        &self,
        line: u32,
        callback: EdgeCallback,
    ) -> HardwareResult<EdgeSubscriptionId> {
        (**self).subscribe_edges(line, callback)
    }

    fn unsubscribe(&self, id: EdgeSubscriptionId) -> HardwareResult {
        (**self).unsubscribe(id)
    }

    fn edges_alive(&self) -> bool {
        (**self).edges_alive()
    }

    fn disconnect(&self) -> HardwareResult {
        (**self).disconnect()
    }
}

/// Opens daemon connections.
pub trait Connect {
    /// Connection type produced.
    type Daemon: GpioDaemon + 'static;

    /// Open one connection to `endpoint`.
    ///
    /// # Errors
    ///
    /// [`ConnectionError`] when the daemon cannot be reached.
    fn connect(&self, endpoint: &DaemonEndpoint) -> Result<Self::Daemon, ConnectionError>;
}
