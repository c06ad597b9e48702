//! Driver status and counters.

use core::fmt;

/// Lifecycle of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverStatus {
    /// Accepting commands
    #[default]
    Active,
    /// Restore ran; commands are dropped (terminal)
    Restored,
}

impl DriverStatus {
    /// Whether the status is terminal.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Restored)
    }

    /// Status as a string slice.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Restored => "Restored",
        }
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Counters kept by a driver since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverMetrics {
    /// Writes the daemon accepted
    pub writes: u64,
    /// Writes the daemon refused or that failed in transit
    pub write_failures: u64,
    /// Commands that were outside the servo range
    pub clamped: u64,
    /// Commands received after restore
    pub dropped_after_restore: u64,
}

impl DriverMetrics {
    pub(crate) fn record_write(&mut self, ok: bool) {
        if ok {
            self.writes = self.writes.saturating_add(1);
        } else {
            self.write_failures = self.write_failures.saturating_add(1);
        }
    }

    pub(crate) fn record_clamp(&mut self) {
        self.clamped = self.clamped.saturating_add(1);
    }

    pub(crate) fn record_drop(&mut self) {
        self.dropped_after_restore = self.dropped_after_restore.saturating_add(1);
    }

    /// Total write attempts.
    pub fn attempts(&self) -> u64 {
        self.writes.saturating_add(self.write_failures)
    }
}
