//! Shutdown outcome

use rcio_errors::HardwareError;
use rcio_ports::PortId;

/// What happened during [`RcioEngine::shutdown`](crate::RcioEngine::shutdown).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Outputs whose restore write succeeded, by line
    pub restored: Vec<PortId>,
    /// Outputs whose restore write failed, with the failure
    pub restore_failures: Vec<(PortId, HardwareError)>,
    /// Edge and bus subscriptions that could not be cancelled
    pub unsubscribe_failures: usize,
    /// Whether the daemon connection closed cleanly
    pub disconnected: bool,
}

impl ShutdownReport {
    /// Every step succeeded.
    pub fn is_clean(&self) -> bool {
        self.restore_failures.is_empty() && self.unsubscribe_failures == 0 && self.disconnected
    }

    /// Outputs a restore write was attempted on.
    pub fn attempted(&self) -> usize {
        self.restored.len().saturating_add(self.restore_failures.len())
    }
}
