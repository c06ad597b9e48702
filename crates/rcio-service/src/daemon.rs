//! Daemon lifecycle
//!
//! Configuration, engine startup, the stdio bridge and orderly shutdown.
//!
//! Engine startup and shutdown are blocking socket calls made on the calling
//! runtime worker. Nothing else is running on the engine at those points, and
//! the bridge writer only needs a worker during shutdown to drain its queue,
//! which the multi-thread runtime of `rciod` provides.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rcio_bus::LocalBus;
use rcio_engine::{RcioEngine, ShutdownReport};
use rcio_errors::{ErrorCategory, ErrorSeverity, RcioError};
use rcio_pigpio::{Connect, GpioDaemon, PigpiodConnector};
use tracing::{error, info, warn};

use crate::bridge::StdioBridge;
use crate::cli::Cli;
use crate::config::ServiceConfig;
use crate::signals::{self, ShutdownSignal};

/// How often the running daemon checks that input edges still arrive.
pub const HEALTH_CHECK_INTERVAL: Duration = Duration::from_millis(500);

/// Run `rciod` until a shutdown signal arrives.
///
/// # Errors
///
/// Any fatal startup failure: unreadable or invalid configuration, an
/// unreachable daemon, or a subscription that cannot be made.
pub async fn run(cli: &Cli) -> Result<ShutdownReport, RcioError> {
    let mut config = ServiceConfig::load(&cli.config).await?;
    config.apply_overrides(cli.host.clone(), cli.port);

    let bus = Arc::new(LocalBus::new());
    serve(
        &PigpiodConnector,
        &config,
        bus,
        !cli.no_stdio,
        signals::wait_for_shutdown(),
    )
    .await
}

/// Start the engine on `bus`, optionally bridge it to stdio, and run until
/// `shutdown` resolves.
///
/// # Errors
///
/// See [`run`]. Failures after startup are logged, never returned.
pub async fn serve<C, F>(
    connector: &C,
    config: &ServiceConfig,
    bus: Arc<LocalBus>,
    stdio: bool,
    shutdown: F,
) -> Result<ShutdownReport, RcioError>
where
    C: Connect,
    F: Future<Output = std::io::Result<ShutdownSignal>>,
{
    let registry = config.registry()?;
    info!(
        outputs = registry.outputs().count(),
        inputs = registry.inputs().count(),
        "Port registry built"
    );

    let mut engine = RcioEngine::start(connector, &config.daemon, registry, Arc::clone(&bus))?;

    let bridge = if stdio {
        let registry = engine.registry();
        let readings: Vec<&str> = registry.inputs().map(|port| port.name()).collect();
        let commands: Vec<&str> = registry.outputs().map(|port| port.name()).collect();
        Some(StdioBridge::spawn(Arc::clone(&bus), readings, commands)?)
    } else {
        None
    };

    info!("rciod running");
    match watch_until(&engine, shutdown).await {
        Ok(signal) => info!(signal = signal.as_str(), "Shutting down"),
        Err(e) => {
            let e = RcioError::from(e);
            error!(category = %e.category(), error = %e, "Cannot wait for shutdown signals, shutting down");
        }
    }

    let report = engine.shutdown();
    if let Some(bridge) = bridge {
        bridge.shutdown().await;
    }
    bus.close();

    if report.is_clean() {
        info!(restored = report.restored.len(), "rciod stopped");
    } else {
        for (port, e) in &report.restore_failures {
            warn!(port = %port, error = %e, "Output left unrestored");
        }
        warn!(
            unsubscribe_failures = report.unsubscribe_failures,
            disconnected = report.disconnected,
            "rciod stopped with errors"
        );
    }
    Ok(report)
}

/// Wait for `shutdown`, reporting once if input edges stop arriving.
async fn watch_until<D, F>(engine: &RcioEngine<D, LocalBus>, shutdown: F) -> F::Output
where
    D: GpioDaemon + 'static,
    F: Future,
{
    let mut shutdown = std::pin::pin!(shutdown);
    let mut health = tokio::time::interval(HEALTH_CHECK_INTERVAL);
    let mut edges_reported = false;
    loop {
        tokio::select! {
            outcome = &mut shutdown => return outcome,
            _ = health.tick() => {
                if !edges_reported && !engine.inputs_alive() {
                    edges_reported = true;
                    error!(
                        inputs = engine.inputs().count(),
                        "Edge notifications lost, inputs no longer report"
                    );
                }
            }
        }
    }
}

/// Log the error that stopped `rciod` at the level its severity calls for.
pub fn report_failure(error: &RcioError) {
    let category = error.category();
    let fatal = error.is_fatal();
    match error.severity() {
        ErrorSeverity::Critical | ErrorSeverity::Error => {
            error!(%category, fatal, error = %error, "rciod failed");
        }
        ErrorSeverity::Warning => warn!(%category, fatal, error = %error, "rciod failed"),
        ErrorSeverity::Info => info!(%category, fatal, error = %error, "rciod failed"),
    }
}

/// Process exit status for an error that stopped `rciod` (sysexits codes).
pub fn exit_status(error: &RcioError) -> u8 {
    match error.category() {
        ErrorCategory::Config => 78,
        ErrorCategory::Connection => 69,
        ErrorCategory::IO => 74,
        ErrorCategory::Hardware | ErrorCategory::Bus | ErrorCategory::Decode => 70,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcio_errors::{BusError, ConfigError, ConnectionError};
    use tracing_test::traced_test;

    #[test]
    fn test_exit_status_by_category() {
        assert_eq!(exit_status(&ConfigError::EmptyRegistry.into()), 78);
        let unreachable = ConnectionError::unreachable("pi:8888", "refused");
        assert_eq!(exit_status(&unreachable.into()), 69);
        assert_eq!(exit_status(&std::io::Error::other("stdin").into()), 74);
        assert_eq!(exit_status(&BusError::Closed.into()), 70);
    }

    #[test]
    #[traced_test]
    fn test_fatal_failure_is_logged_as_error() {
        report_failure(&ConfigError::EmptyRegistry.into());
        assert!(logs_contain("rciod failed"));
        assert!(logs_contain("fatal=true"));
        assert!(logs_contain("category=Config"));
    }
}
