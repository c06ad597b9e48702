//! Per-port servo driver

use parking_lot::Mutex;
use rcio_errors::{ErrorSeverity, HardwareResult};
use rcio_pigpio::GpioDaemon;
use rcio_ports::{Port, PortId};
use tracing::{debug, error, info, warn};

use crate::clamp_pulse_width;
use crate::state::{DriverMetrics, DriverStatus};

#[derive(Debug)]
struct OutputState {
    current_pulse_width: i32,
    status: DriverStatus,
    metrics: DriverMetrics,
}

/// Drives one output port.
///
/// All state sits behind one per-port lock, held across the daemon call, so
/// writes to a port never interleave.
#[derive(Debug)]
pub struct PwmDriver<D: GpioDaemon> {
    port: PortId,
    name: String,
    default_pulse_width: i32,
    daemon: D,
    state: Mutex<OutputState>,
}

impl<D: GpioDaemon> PwmDriver<D> {
    /// Create the driver and write the clamped default once.
    ///
    /// A failed initial write is logged; the driver is still usable.
    pub fn new(port: PortId, name: impl Into<String>, default_pulse_width: i32, daemon: D) -> Self {
        let driver = Self {
            port,
            name: name.into(),
            default_pulse_width,
            daemon,
            state: Mutex::new(OutputState {
                current_pulse_width: clamp_pulse_width(default_pulse_width),
                status: DriverStatus::Active,
                metrics: DriverMetrics::default(),
            }),
        };
        driver.set_pulse(default_pulse_width);
        driver
    }

    /// Driver for a registered port; `None` for inputs.
    pub fn for_port(port: &Port, daemon: D) -> Option<Self> {
        let default = port.default_pulse_width()?;
        Some(Self::new(port.id(), port.name(), default, daemon))
    }

    /// Clamp `requested`, write it once and return the clamped width.
    ///
    /// A failed write is logged and counted, never returned. A refusal by the
    /// daemon logs a warning, a lost connection an error. After
    /// [`restore`](Self::restore) the command is dropped without a write.
    pub fn set_pulse(&self, requested: i32) -> i32 {
        let actual = clamp_pulse_width(requested);
        let mut state = self.state.lock();

        if state.status.is_terminal() {
            state.metrics.record_drop();
            debug!(port = %self.port, name = %self.name, requested, "Command after restore dropped");
            return actual;
        }
        if actual != requested {
            state.metrics.record_clamp();
            debug!(port = %self.port, requested, width_us = actual, "Pulse width clamped");
        }

        match self.write(actual) {
            Ok(()) => {
                state.current_pulse_width = actual;
                state.metrics.record_write(true);
            }
            Err(e) => {
                state.metrics.record_write(false);
                if e.severity() < ErrorSeverity::Error {
                    warn!(port = %self.port, name = %self.name, width_us = actual, error = %e, "GPIO daemon error");
                } else {
                    error!(port = %self.port, name = %self.name, width_us = actual, error = %e, "GPIO daemon error");
                }
            }
        }
        actual
    }

    /// Write the default once and stop accepting commands.
    ///
    /// Only the first call writes; later calls return the last known width.
    /// A failure is logged once and not retried.
    ///
    /// # Errors
    ///
    /// The daemon error from the restore write.
    pub fn restore(&self) -> HardwareResult<i32> {
        let mut state = self.state.lock();
        if state.status.is_terminal() {
            return Ok(state.current_pulse_width);
        }
        state.status = DriverStatus::Restored;

        let actual = clamp_pulse_width(self.default_pulse_width);
        match self.write(actual) {
            Ok(()) => {
                state.current_pulse_width = actual;
                state.metrics.record_write(true);
                info!(port = %self.port, name = %self.name, width_us = actual, "Output restored");
                Ok(actual)
            }
            Err(e) => {
                state.metrics.record_write(false);
                error!(port = %self.port, name = %self.name, width_us = actual, error = %e, "Output restore failed");
                Err(e)
            }
        }
    }

    fn write(&self, width_us: i32) -> HardwareResult {
        self.daemon.write_pulse(self.port.line(), width_us.unsigned_abs())
    }

    /// Port driven.
    pub fn port(&self) -> PortId {
        self.port
    }

    /// Port name, also its command topic.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured default, before clamping.
    pub fn default_pulse_width(&self) -> i32 {
        self.default_pulse_width
    }

    /// Last width the daemon accepted, or the clamped default.
    pub fn current_pulse_width(&self) -> i32 {
        self.state.lock().current_pulse_width
    }

    /// Whether the driver still accepts commands.
    pub fn status(&self) -> DriverStatus {
        self.state.lock().status
    }

    /// Snapshot of the write counters.
    pub fn metrics(&self) -> DriverMetrics {
        self.state.lock().metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcio_errors::GpioOperation;
    use rcio_test_helpers::mock::MockGpioDaemon;
    use tracing_test::traced_test;

    #[test]
    fn test_construction_writes_default_once() {
        let daemon = MockGpioDaemon::new();
        let driver = PwmDriver::new(PortId::new(18), "aileron", 1200, daemon.clone());
        assert_eq!(daemon.writes_to(18), vec![1200]);
        assert_eq!(driver.current_pulse_width(), 1200);
        assert_eq!(driver.status(), DriverStatus::Active);
    }

    #[test]
    fn test_out_of_range_default_is_clamped() {
        let daemon = MockGpioDaemon::new();
        let driver = PwmDriver::new(PortId::new(18), "aileron", 9000, daemon.clone());
        assert_eq!(daemon.writes_to(18), vec![2500]);
        assert_eq!(driver.default_pulse_width(), 9000);
        assert_eq!(driver.current_pulse_width(), 2500);
    }

    #[test]
    #[traced_test]
    fn test_failed_write_keeps_last_known_width() {
        let daemon = MockGpioDaemon::new();
        let driver = PwmDriver::new(PortId::new(18), "aileron", 1500, daemon.clone());
        daemon.fail_on(GpioOperation::WritePulse, 18);

        assert_eq!(driver.set_pulse(2000), 2000);
        assert_eq!(driver.current_pulse_width(), 1500);
        assert_eq!(driver.metrics().write_failures, 1);
        assert!(logs_contain("GPIO daemon error"));
    }

    #[test]
    #[traced_test]
    fn test_write_failure_level_follows_severity() {
        let daemon = MockGpioDaemon::new();
        let driver = PwmDriver::new(PortId::new(18), "aileron", 1500, daemon.clone());

        daemon.fail_on(GpioOperation::WritePulse, 18);
        driver.set_pulse(1600);
        logs_assert(|lines: &[&str]| {
            let failures: Vec<_> = lines.iter().filter(|l| l.contains("GPIO daemon error")).collect();
            match failures.as_slice() {
                [only] if only.contains("WARN") => Ok(()),
                other => Err(format!("expected one warning, got {other:?}")),
            }
        });

        assert!(daemon.disconnect().is_ok());
        driver.set_pulse(1700);
        logs_assert(|lines: &[&str]| {
            let failures: Vec<_> = lines.iter().filter(|l| l.contains("GPIO daemon error")).collect();
            match failures.as_slice() {
                [first, second] if first.contains("WARN") && second.contains("ERROR") => Ok(()),
                other => Err(format!("expected a warning then an error, got {other:?}")),
            }
        });
        assert_eq!(driver.metrics().write_failures, 2);
    }

    #[test]
    #[traced_test]
    fn test_commands_after_restore_are_dropped() {
        let daemon = MockGpioDaemon::new();
        let driver = PwmDriver::new(PortId::new(18), "aileron", 1500, daemon.clone());
        assert!(matches!(driver.restore(), Ok(1500)));

        assert_eq!(driver.set_pulse(1800), 1800);
        assert_eq!(daemon.writes_to(18), vec![1500, 1500]);
        assert_eq!(driver.metrics().dropped_after_restore, 1);
        assert!(logs_contain("Command after restore dropped"));
    }
}
