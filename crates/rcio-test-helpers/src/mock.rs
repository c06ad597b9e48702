//! Mock GPIO daemon.
//!
//! [`MockGpioDaemon`] records every call and answers from memory. Clones share
//! state, so a test can keep one clone while the code under test owns
//! another. Failures are injected per operation and line; edges are fired by
//! hand with [`MockGpioDaemon::fire_edge`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;
use rcio_decoder::{Edge, Tick};
use rcio_errors::{ConnectionError, GpioOperation, HardwareError, HardwareResult};
use rcio_pigpio::{
    Connect, DaemonEndpoint, EdgeCallback, EdgeSubscriptionId, GpioDaemon, PinMode, Pull,
};

/// Code reported for injected failures (pigpio's "not permitted").
pub const INJECTED_FAILURE_CODE: i32 = -41;

/// One recorded daemon call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaemonCall {
    SetMode { line: u32, mode: PinMode },
    SetPull { line: u32, pull: Pull },
    WritePulse { line: u32, width_us: u32 },
    SubscribeEdges { line: u32 },
    Unsubscribe { line: u32 },
    Disconnect,
}

type SharedCallback = Arc<dyn Fn(Edge, Tick) + Send + Sync>;

#[derive(Default)]
struct MockState {
    calls: Mutex<Vec<DaemonCall>>,
    failures: Mutex<HashSet<(GpioOperation, u32)>>,
    fail_all_writes: AtomicBool,
    subscriptions: Mutex<HashMap<EdgeSubscriptionId, (u32, SharedCallback)>>,
    next_id: AtomicU64,
    disconnected: AtomicBool,
    edges_lost: AtomicBool,
}

/// In-memory [`GpioDaemon`] with a shared call log.
#[derive(Clone, Default)]
pub struct MockGpioDaemon {
    state: Arc<MockState>,
}

impl MockGpioDaemon {
    /// Daemon that accepts every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `operation` on `line` fail from now on.
    pub fn fail_on(&self, operation: GpioOperation, line: u32) {
        self.state.failures.lock().insert((operation, line));
    }

    /// Make `operation` on `line` succeed again.
    pub fn heal(&self, operation: GpioOperation, line: u32) {
        self.state.failures.lock().remove(&(operation, line));
    }

    /// Make every pulse write fail.
    pub fn fail_all_writes(&self) {
        self.state.fail_all_writes.store(true, Ordering::SeqCst);
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<DaemonCall> {
        self.state.calls.lock().clone()
    }

    /// Forget the recorded calls.
    pub fn clear_calls(&self) {
        self.state.calls.lock().clear();
    }

    /// Widths written to `line`, in call order, including failed writes.
    pub fn writes_to(&self, line: u32) -> Vec<u32> {
        self.state
            .calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                DaemonCall::WritePulse { line: l, width_us } if *l == line => Some(*width_us),
                _ => None,
            })
            .collect()
    }

    /// Pulse writes to any line, failed ones included.
    pub fn total_writes(&self) -> usize {
        self.state
            .calls
            .lock()
            .iter()
            .filter(|call| matches!(call, DaemonCall::WritePulse { .. }))
            .count()
    }

    /// Lines with a live edge subscription, sorted.
    pub fn subscribed_lines(&self) -> Vec<u32> {
        let mut lines: Vec<u32> = self
            .state
            .subscriptions
            .lock()
            .values()
            .map(|(line, _)| *line)
            .collect();
        lines.sort_unstable();
        lines
    }

    /// Whether `disconnect` was called.
    pub fn is_disconnected(&self) -> bool {
        self.state.disconnected.load(Ordering::SeqCst)
    }

    /// Drop the notification stream: no edge is delivered from now on.
    pub fn lose_edges(&self) {
        self.state.edges_lost.store(true, Ordering::SeqCst);
    }

    /// Deliver an edge to every subscriber of `line`. Returns how many
    /// callbacks ran.
    pub fn fire_edge(&self, line: u32, edge: Edge, tick: u32) -> usize {
        if self.state.edges_lost.load(Ordering::SeqCst) {
            return 0;
        }
        let callbacks: Vec<SharedCallback> = self
            .state
            .subscriptions
            .lock()
            .values()
            .filter(|(l, _)| *l == line)
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in &callbacks {
            callback(edge, Tick::new(tick));
        }
        callbacks.len()
    }

    /// Fire a rising edge at `start` and a falling edge `width_us` later.
    pub fn fire_pulse(&self, line: u32, start: u32, width_us: u32) {
        self.fire_edge(line, Edge::Rising, start);
        self.fire_edge(line, Edge::Falling, start.wrapping_add(width_us));
    }

    fn record(&self, call: DaemonCall) {
        self.state.calls.lock().push(call);
    }

    fn check(&self, operation: GpioOperation, line: u32) -> HardwareResult {
        if self.is_disconnected() {
            return Err(HardwareError::Disconnected);
        }
        let forced = operation == GpioOperation::WritePulse
            && self.state.fail_all_writes.load(Ordering::SeqCst);
        if forced || self.state.failures.lock().contains(&(operation, line)) {
            return Err(HardwareError::Daemon {
                operation,
                line,
                code: INJECTED_FAILURE_CODE,
                message: "no permission to update gpio".to_string(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for MockGpioDaemon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockGpioDaemon")
            .field("calls", &self.state.calls.lock().len())
            .field("subscribed_lines", &self.subscribed_lines())
            .field("disconnected", &self.is_disconnected())
            .finish()
    }
}

impl GpioDaemon for MockGpioDaemon {
    fn set_mode(&self, line: u32, mode: PinMode) -> HardwareResult {
        self.record(DaemonCall::SetMode { line, mode });
        self.check(GpioOperation::SetMode, line)
    }

    fn set_pull(&self, line: u32, pull: Pull) -> HardwareResult {
        self.record(DaemonCall::SetPull { line, pull });
        self.check(GpioOperation::SetPull, line)
    }

    fn write_pulse(&self, line: u32, pulse_width_us: u32) -> HardwareResult {
        self.record(DaemonCall::WritePulse {
            line,
            width_us: pulse_width_us,
        });
        self.check(GpioOperation::WritePulse, line)
    }

    fn subscribe_edges(
        &self,
        line: u32,
        callback: EdgeCallback,
    ) -> HardwareResult<EdgeSubscriptionId> {
        self.record(DaemonCall::SubscribeEdges { line });
        self.check(GpioOperation::SubscribeEdges, line)?;
        let id = EdgeSubscriptionId::new(self.state.next_id.fetch_add(1, Ordering::SeqCst));
        self.state
            .subscriptions
            .lock()
            .insert(id, (line, Arc::from(callback)));
        Ok(id)
    }

    fn unsubscribe(&self, id: EdgeSubscriptionId) -> HardwareResult {
        let removed = self.state.subscriptions.lock().remove(&id);
        let line = removed.map_or(u32::MAX, |(line, _)| line);
        self.record(DaemonCall::Unsubscribe { line });
        self.check(GpioOperation::Unsubscribe, line)
    }

    fn edges_alive(&self) -> bool {
        !self.state.edges_lost.load(Ordering::SeqCst)
    }

    fn disconnect(&self) -> HardwareResult {
        self.record(DaemonCall::Disconnect);
        self.state.disconnected.store(true, Ordering::SeqCst);
        self.state.subscriptions.lock().clear();
        Ok(())
    }
}

/// Hands out clones of one [`MockGpioDaemon`].
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    daemon: MockGpioDaemon,
    failure: Option<ConnectionError>,
    attempts: Arc<AtomicUsize>,
    endpoints: Arc<Mutex<Vec<DaemonEndpoint>>>,
}

impl MockConnector {
    /// Connector that always hands out `daemon`.
    pub fn new(daemon: MockGpioDaemon) -> Self {
        Self {
            daemon,
            ..Self::default()
        }
    }

    /// Connector whose every attempt fails with `error`.
    pub fn failing(daemon: MockGpioDaemon, error: ConnectionError) -> Self {
        Self {
            daemon,
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Connection attempts so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Endpoints passed to `connect`, in order.
    pub fn endpoints(&self) -> Vec<DaemonEndpoint> {
        self.endpoints.lock().clone()
    }
}

impl Connect for MockConnector {
    type Daemon = MockGpioDaemon;

    fn connect(&self, endpoint: &DaemonEndpoint) -> Result<MockGpioDaemon, ConnectionError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.endpoints.lock().push(endpoint.clone());
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(self.daemon.clone()),
        }
    }
}
