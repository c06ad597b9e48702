//! Engine facade
//!
//! [`RcioEngine`] ties registry, daemon and bus together for the lifetime of
//! the process.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rcio_bus::{MessageBus, SubscriptionId};
use rcio_decoder::DecoderStats;
use rcio_driver::PwmDriver;
use rcio_errors::RcioError;
use rcio_pigpio::{Connect, DaemonEndpoint, GpioDaemon, PinMode, Pull};
use rcio_ports::{Port, PortId, PortKind, PortRegistry};
use tracing::{debug, error, info, warn};

use crate::input::InputChannel;
use crate::report::ShutdownReport;

/// Engine lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Ports are wired and serving
    Running,
    /// Teardown ran; the connection is closed
    ShutDown,
}

/// Owns every port, the daemon connection and the bus subscriptions.
pub struct RcioEngine<D: GpioDaemon + 'static, B: MessageBus + 'static> {
    registry: PortRegistry,
    daemon: Arc<D>,
    bus: Arc<B>,
    outputs: BTreeMap<PortId, Arc<PwmDriver<Arc<D>>>>,
    inputs: BTreeMap<PortId, InputChannel>,
    commands: Vec<(PortId, SubscriptionId)>,
    state: EngineState,
    report: Option<ShutdownReport>,
}

impl<D: GpioDaemon + 'static, B: MessageBus + 'static> RcioEngine<D, B> {
    /// Connect to the daemon and wire every registered port.
    ///
    /// # Errors
    ///
    /// - [`RcioError::Connection`] when the daemon is unreachable; nothing is
    ///   touched
    /// - [`RcioError::Hardware`] or [`RcioError::Bus`] when a subscription
    ///   cannot be made; everything set up so far is torn down
    pub fn start<C>(
        connector: &C,
        endpoint: &DaemonEndpoint,
        registry: PortRegistry,
        bus: Arc<B>,
    ) -> Result<Self, RcioError>
    where
        C: Connect<Daemon = D>,
    {
        info!(endpoint = %endpoint, ports = registry.len(), "Connecting to GPIO daemon");
        let daemon = connector.connect(endpoint).inspect_err(|e| {
            error!(endpoint = %endpoint, error = %e, "GPIO daemon connection failed");
        })?;
        Self::with_daemon(daemon, registry, bus)
    }

    /// Wire every registered port on an already open connection.
    ///
    /// # Errors
    ///
    /// See [`start`](Self::start).
    pub fn with_daemon(daemon: D, registry: PortRegistry, bus: Arc<B>) -> Result<Self, RcioError> {
        let mut engine = Self {
            registry,
            daemon: Arc::new(daemon),
            bus,
            outputs: BTreeMap::new(),
            inputs: BTreeMap::new(),
            commands: Vec::new(),
            state: EngineState::Running,
            report: None,
        };
        // On error `engine` drops here and tears down what was built.
        engine.setup()?;
        info!(
            outputs = engine.outputs.len(),
            inputs = engine.inputs.len(),
            "I/O engine started"
        );
        Ok(engine)
    }

    fn setup(&mut self) -> Result<(), RcioError> {
        let ports: Vec<Port> = self.registry.iter().cloned().collect();
        for port in &ports {
            match port.kind() {
                PortKind::Output { .. } => self.setup_output(port)?,
                PortKind::Input => self.setup_input(port)?,
            }
        }
        Ok(())
    }

    fn setup_output(&mut self, port: &Port) -> Result<(), RcioError> {
        let line = port.id().line();
        if let Err(e) = self.daemon.set_mode(line, PinMode::Output) {
            error!(port = %port.id(), name = port.name(), error = %e, "Failed to set output mode");
        }

        let Some(driver) = PwmDriver::for_port(port, Arc::clone(&self.daemon)) else {
            return Ok(());
        };
        let driver = Arc::new(driver);
        self.outputs.insert(port.id(), Arc::clone(&driver));

        let id = self
            .bus
            .subscribe(
                port.name(),
                Box::new(move |value| {
                    driver.set_pulse(value);
                }),
            )
            .inspect_err(|e| {
                error!(port = %port.id(), topic = port.name(), error = %e, "Failed to subscribe command topic");
            })?;
        self.commands.push((port.id(), id));

        debug!(
            port = %port.id(),
            name = port.name(),
            default = ?port.default_pulse_width(),
            "Output ready"
        );
        Ok(())
    }

    fn setup_input(&mut self, port: &Port) -> Result<(), RcioError> {
        let line = port.id().line();
        if let Err(e) = self.daemon.set_mode(line, PinMode::Input) {
            error!(port = %port.id(), name = port.name(), error = %e, "Failed to set input mode");
        }
        if let Err(e) = self.daemon.set_pull(line, Pull::Down) {
            error!(port = %port.id(), name = port.name(), error = %e, "Failed to set pull-down");
        }

        let mut channel = InputChannel::new(port.id(), port.name());
        let callback = channel.edge_router(Arc::clone(&self.bus));
        let id = self.daemon.subscribe_edges(line, callback).inspect_err(|e| {
            error!(port = %port.id(), name = port.name(), error = %e, "Failed to subscribe edges");
        })?;
        channel.set_subscription(id);
        self.inputs.insert(port.id(), channel);

        debug!(port = %port.id(), name = port.name(), "Input ready");
        Ok(())
    }

    /// Cancel subscriptions, restore every output, then disconnect.
    ///
    /// Every step is attempted regardless of earlier failures. Only the first
    /// call does any work; later calls return the same report.
    pub fn shutdown(&mut self) -> ShutdownReport {
        if let Some(report) = &self.report {
            return report.clone();
        }
        info!("Shutting down I/O engine");
        let mut report = ShutdownReport::default();

        for channel in self.inputs.values_mut() {
            let Some(id) = channel.take_subscription() else {
                continue;
            };
            if let Err(e) = self.daemon.unsubscribe(id) {
                warn!(port = %channel.port(), error = %e, "Failed to cancel edge subscription");
                report.unsubscribe_failures = report.unsubscribe_failures.saturating_add(1);
            }
        }
        for (port, id) in self.commands.drain(..) {
            if let Err(e) = self.bus.unsubscribe(id) {
                warn!(port = %port, error = %e, "Failed to cancel command subscription");
                report.unsubscribe_failures = report.unsubscribe_failures.saturating_add(1);
            }
        }

        for (port, driver) in &self.outputs {
            match driver.restore() {
                Ok(_) => report.restored.push(*port),
                Err(e) => report.restore_failures.push((*port, e)),
            }
        }

        match self.daemon.disconnect() {
            Ok(()) => report.disconnected = true,
            Err(e) => warn!(error = %e, "Failed to disconnect from GPIO daemon"),
        }

        self.state = EngineState::ShutDown;
        info!(
            restored = report.restored.len(),
            failed = report.restore_failures.len(),
            "I/O engine stopped"
        );
        self.report = Some(report.clone());
        report
    }

    /// Command an output directly, bypassing the bus.
    ///
    /// Returns the clamped width, or `None` when `port` is not an output.
    pub fn set_pulse(&self, port: PortId, value: i32) -> Option<i32> {
        self.outputs.get(&port).map(|driver| driver.set_pulse(value))
    }

    /// Last width written to an output.
    pub fn output_pulse_width(&self, port: PortId) -> Option<i32> {
        self.outputs.get(&port).map(|driver| driver.current_pulse_width())
    }

    /// Decoder counters of an input.
    pub fn input_stats(&self, port: PortId) -> Option<DecoderStats> {
        self.inputs.get(&port).map(InputChannel::stats)
    }

    /// Wired input channels, by line.
    pub fn inputs(&self) -> impl Iterator<Item = &InputChannel> {
        self.inputs.values()
    }

    /// Whether input readings can still arrive.
    ///
    /// False once the daemon stops delivering edges while inputs are wired.
    pub fn inputs_alive(&self) -> bool {
        self.inputs.is_empty() || self.daemon.edges_alive()
    }

    /// Ports the engine was started with.
    pub fn registry(&self) -> &PortRegistry {
        &self.registry
    }

    /// Bus commands are read from and readings published on.
    pub fn bus(&self) -> &Arc<B> {
        &self.bus
    }

    /// Lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Whether [`shutdown`](Self::shutdown) has not run yet.
    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }
}

impl<D: GpioDaemon + 'static, B: MessageBus + 'static> Drop for RcioEngine<D, B> {
    fn drop(&mut self) {
        if self.report.is_some() {
            return;
        }
        let report = self.shutdown();
        if !report.is_clean() {
            warn!(
                restore_failures = report.restore_failures.len(),
                unsubscribe_failures = report.unsubscribe_failures,
                "I/O engine teardown incomplete"
            );
        }
    }
}

impl<D: GpioDaemon + 'static, B: MessageBus + 'static> fmt::Debug for RcioEngine<D, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RcioEngine")
            .field("state", &self.state)
            .field("outputs", &self.outputs.keys().collect::<Vec<_>>())
            .field("inputs", &self.inputs.keys().collect::<Vec<_>>())
            .field("commands", &self.commands.len())
            .finish()
    }
}
