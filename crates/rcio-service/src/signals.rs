//! Shutdown signals

use tracing::info;

/// Signal that ended the wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// SIGINT or Ctrl+C
    Interrupt,
    /// SIGTERM
    Terminate,
    /// SIGHUP
    Hangup,
}

impl ShutdownSignal {
    /// Conventional signal name.
    pub fn as_str(self) -> &'static str {
        match self {
            ShutdownSignal::Interrupt => "SIGINT",
            ShutdownSignal::Terminate => "SIGTERM",
            ShutdownSignal::Hangup => "SIGHUP",
        }
    }
}

/// Wait for SIGINT, SIGTERM or SIGHUP (Ctrl+C elsewhere).
///
/// # Errors
///
/// An I/O error when a signal handler cannot be installed.
#[cfg(unix)]
pub async fn wait_for_shutdown() -> std::io::Result<ShutdownSignal> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sighup = signal(SignalKind::hangup())?;

    let received = tokio::select! {
        _ = sigterm.recv() => ShutdownSignal::Terminate,
        _ = sigint.recv() => ShutdownSignal::Interrupt,
        _ = sighup.recv() => ShutdownSignal::Hangup,
    };
    info!(signal = received.as_str(), "Received shutdown signal");
    Ok(received)
}

/// Wait for SIGINT, SIGTERM or SIGHUP (Ctrl+C elsewhere).
///
/// # Errors
///
/// An I/O error when the Ctrl+C handler cannot be installed.
#[cfg(not(unix))]
pub async fn wait_for_shutdown() -> std::io::Result<ShutdownSignal> {
    tokio::signal::ctrl_c().await?;
    info!(signal = "Ctrl+C", "Received shutdown signal");
    Ok(ShutdownSignal::Interrupt)
}
