//! Blocking pigpiod socket client
//!
//! One command socket carries every request, serialized behind a mutex. Edge
//! notifications use a second socket, opened on the first subscription, that
//! a dedicated thread reads until disconnect.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;

use parking_lot::{Mutex, RwLock};
use rcio_decoder::{Edge, Tick};
use rcio_errors::{ConnectionError, GpioOperation, HardwareError, HardwareResult};
use tracing::{debug, error, info, trace, warn};

use crate::MAX_MONITORED_LINE;
use crate::daemon::{Connect, EdgeCallback, EdgeSubscriptionId, GpioDaemon, PinMode, Pull};
use crate::endpoint::DaemonEndpoint;
use crate::protocol::{
    CommandFrame, NotificationReport, ResponseFrame, commands, error_text, level_changes,
};

struct Subscription {
    line: u32,
    callback: EdgeCallback,
}

#[derive(Default)]
struct CallbackTable {
    subscriptions: HashMap<EdgeSubscriptionId, Subscription>,
}

impl CallbackTable {
    fn mask(&self) -> u32 {
        self.subscriptions
            .values()
            .fold(0, |mask, sub| mask | (1 << sub.line))
    }

    fn dispatch(&self, line: u32, report: &NotificationReport, edge: Edge) {
        for sub in self.subscriptions.values().filter(|sub| sub.line == line) {
            (sub.callback)(edge, Tick::new(report.tick));
        }
    }
}

struct Notifier {
    handle: u32,
    stream: TcpStream,
    thread: JoinHandle<()>,
}

/// Connection to a pigpiod instance.
pub struct PigpiodClient {
    endpoint: DaemonEndpoint,
    addrs: Vec<SocketAddr>,
    command: Mutex<Option<TcpStream>>,
    notifier: Mutex<Option<Notifier>>,
    table: Arc<RwLock<CallbackTable>>,
    stopping: Arc<AtomicBool>,
    edges_lost: Arc<AtomicBool>,
    next_id: AtomicU64,
}

impl PigpiodClient {
    /// Open the command socket.
    ///
    /// # Errors
    ///
    /// [`ConnectionError::Resolve`] when the host does not resolve,
    /// [`ConnectionError::Unreachable`] when no address accepts the connection.
    pub fn connect(endpoint: &DaemonEndpoint) -> Result<Self, ConnectionError> {
        let addrs: Vec<SocketAddr> = (endpoint.host.as_str(), endpoint.port)
            .to_socket_addrs()
            .map_err(|e| ConnectionError::Resolve {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?
            .collect();
        if addrs.is_empty() {
            return Err(ConnectionError::Resolve {
                endpoint: endpoint.to_string(),
                reason: "no addresses".to_string(),
            });
        }

        let stream = TcpStream::connect(addrs.as_slice())
            .map_err(|e| ConnectionError::unreachable(endpoint.to_string(), e.to_string()))?;
        if let Err(e) = stream.set_nodelay(true) {
            warn!(endpoint = %endpoint, error = %e, "Failed to disable Nagle on command socket");
        }
        info!(endpoint = %endpoint, "Connected to GPIO daemon");

        Ok(Self {
            endpoint: endpoint.clone(),
            addrs,
            command: Mutex::new(Some(stream)),
            notifier: Mutex::new(None),
            table: Arc::new(RwLock::new(CallbackTable::default())),
            stopping: Arc::new(AtomicBool::new(false)),
            edges_lost: Arc::new(AtomicBool::new(false)),
            next_id: AtomicU64::new(1),
        })
    }

    /// Daemon this client talks to.
    pub fn endpoint(&self) -> &DaemonEndpoint {
        &self.endpoint
    }

    /// Whether the command socket is still open.
    pub fn is_connected(&self) -> bool {
        self.command.lock().is_some()
    }

    fn request(&self, operation: GpioOperation, frame: CommandFrame) -> HardwareResult<ResponseFrame> {
        let mut guard = self.command.lock();
        let stream = guard.as_mut().ok_or(HardwareError::Disconnected)?;
        exchange(stream, frame).map_err(|e| HardwareError::io(operation, e.to_string()))
    }

    fn command(&self, operation: GpioOperation, line: u32, frame: CommandFrame) -> HardwareResult<u32> {
        let response = self.request(operation, frame)?;
        if response.result < 0 {
            return Err(HardwareError::Daemon {
                operation,
                line,
                code: response.result,
                message: error_text(response.result).to_string(),
            });
        }
        Ok(response.result_bits())
    }

    fn start_notifier(&self) -> HardwareResult<Notifier> {
        let op = GpioOperation::SubscribeEdges;
        let mut stream = TcpStream::connect(self.addrs.as_slice())
            .map_err(|e| HardwareError::io(op, e.to_string()))?;
        let response = exchange(&mut stream, CommandFrame::new(commands::NOIB, 0, 0))
            .map_err(|e| HardwareError::io(op, e.to_string()))?;
        let Ok(handle) = u32::try_from(response.result) else {
            return Err(HardwareError::Daemon {
                operation: op,
                line: 0,
                code: response.result,
                message: error_text(response.result).to_string(),
            });
        };

        match self.spawn_notify_thread(&stream) {
            Ok((levels, thread)) => {
                debug!(handle, levels, "Notification handle opened");
                Ok(Notifier {
                    handle,
                    stream,
                    thread,
                })
            }
            Err(e) => {
                self.close_handle(handle);
                if let Err(e) = stream.shutdown(Shutdown::Both) {
                    debug!(error = %e, "Notification socket already closed");
                }
                Err(e)
            }
        }
    }

    fn spawn_notify_thread(&self, stream: &TcpStream) -> HardwareResult<(u32, JoinHandle<()>)> {
        let op = GpioOperation::SubscribeEdges;
        // Levels must be known before the first report arrives.
        let levels = self.command(
            GpioOperation::ReadBank,
            0,
            CommandFrame::new(commands::BR1, 0, 0),
        )?;

        let reader = stream
            .try_clone()
            .map_err(|e| HardwareError::io(op, e.to_string()))?;
        let table = Arc::clone(&self.table);
        let stopping = Arc::clone(&self.stopping);
        let lost = Arc::clone(&self.edges_lost);
        let thread = std::thread::Builder::new()
            .name("rcio-pigpio-notify".to_string())
            .spawn(move || notify_loop(reader, levels, &table, &stopping, &lost))
            .map_err(|e| HardwareError::io(op, e.to_string()))?;
        Ok((levels, thread))
    }

    fn close_handle(&self, handle: u32) {
        let frame = CommandFrame::new(commands::NC, handle, 0);
        if let Err(e) = self.command(GpioOperation::Disconnect, 0, frame) {
            warn!(handle, error = %e, "Failed to close notification handle");
        }
    }
}

impl GpioDaemon for PigpiodClient {
    fn set_mode(&self, line: u32, mode: PinMode) -> HardwareResult {
        let frame = CommandFrame::new(commands::MODES, line, mode.code());
        self.command(GpioOperation::SetMode, line, frame).map(drop)
    }

    fn set_pull(&self, line: u32, pull: Pull) -> HardwareResult {
        let frame = CommandFrame::new(commands::PUD, line, pull.code());
        self.command(GpioOperation::SetPull, line, frame).map(drop)
    }

    fn write_pulse(&self, line: u32, pulse_width_us: u32) -> HardwareResult {
        let frame = CommandFrame::new(commands::SERVO, line, pulse_width_us);
        self.command(GpioOperation::WritePulse, line, frame).map(drop)
    }

    fn subscribe_edges(
        &self,
        line: u32,
        callback: EdgeCallback,
    ) -> HardwareResult<EdgeSubscriptionId> {
        if line > MAX_MONITORED_LINE {
            return Err(HardwareError::unsupported_line(
                GpioOperation::SubscribeEdges,
                line,
            ));
        }

        let mut notifier = self.notifier.lock();
        if !self.is_connected() {
            return Err(HardwareError::Disconnected);
        }
        let handle = match notifier.as_ref() {
            Some(n) => n.handle,
            None => {
                let started = self.start_notifier()?;
                let handle = started.handle;
                *notifier = Some(started);
                handle
            }
        };

        let id = EdgeSubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mask = {
            let mut table = self.table.write();
            table
                .subscriptions
                .insert(id, Subscription { line, callback });
            table.mask()
        };

        let frame = CommandFrame::new(commands::NB, handle, mask);
        if let Err(e) = self.command(GpioOperation::SubscribeEdges, line, frame) {
            self.table.write().subscriptions.remove(&id);
            return Err(e);
        }
        debug!(line, id = %id, "Edge subscription started");
        Ok(id)
    }

    fn unsubscribe(&self, id: EdgeSubscriptionId) -> HardwareResult {
        let notifier = self.notifier.lock();
        let (removed, mask) = {
            let mut table = self.table.write();
            let removed = table.subscriptions.remove(&id);
            (removed, table.mask())
        };
        let Some(sub) = removed else {
            debug!(id = %id, "Unknown edge subscription");
            return Ok(());
        };

        if let Some(n) = notifier.as_ref() {
            let frame = CommandFrame::new(commands::NB, n.handle, mask);
            self.command(GpioOperation::Unsubscribe, sub.line, frame)?;
        }
        debug!(line = sub.line, id = %id, "Edge subscription stopped");
        Ok(())
    }

    fn edges_alive(&self) -> bool {
        !self.edges_lost.load(Ordering::Acquire)
    }

    fn disconnect(&self) -> HardwareResult {
        let mut notifier = self.notifier.lock();
        self.stopping.store(true, Ordering::Release);

        let mut result = Ok(());
        if let Some(Notifier {
            handle,
            stream,
            thread,
        }) = notifier.take()
        {
            let frame = CommandFrame::new(commands::NC, handle, 0);
            if let Err(e) = self.command(GpioOperation::Disconnect, 0, frame) {
                warn!(handle, error = %e, "Failed to close notification handle");
                result = Err(e);
            }
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                debug!(error = %e, "Notification socket already closed");
            }
            if thread.join().is_err() {
                error!("Notification thread panicked");
            }
        }
        self.table.write().subscriptions.clear();

        let Some(stream) = self.command.lock().take() else {
            return result;
        };
        if let Err(e) = stream.shutdown(Shutdown::Both) {
            debug!(error = %e, "Command socket already closed");
        }
        info!(endpoint = %self.endpoint, "Disconnected from GPIO daemon");
        result
    }
}

impl Drop for PigpiodClient {
    fn drop(&mut self) {
        if self.command.get_mut().is_none() {
            return;
        }
        if let Err(e) = self.disconnect() {
            warn!(endpoint = %self.endpoint, error = %e, "Disconnect on drop failed");
        }
    }
}

impl fmt::Debug for PigpiodClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PigpiodClient")
            .field("endpoint", &self.endpoint)
            .field("connected", &self.is_connected())
            .field("subscriptions", &self.table.read().subscriptions.len())
            .finish()
    }
}

/// Opens [`PigpiodClient`] connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct PigpiodConnector;

impl Connect for PigpiodConnector {
    type Daemon = PigpiodClient;

    fn connect(&self, endpoint: &DaemonEndpoint) -> Result<PigpiodClient, ConnectionError> {
        PigpiodClient::connect(endpoint)
    }
}

fn exchange(stream: &mut TcpStream, frame: CommandFrame) -> io::Result<ResponseFrame> {
    stream.write_all(&frame.encode())?;
    let mut buffer = [0u8; ResponseFrame::SIZE];
    stream.read_exact(&mut buffer)?;
    Ok(ResponseFrame::decode(&buffer))
}

fn notify_loop(
    mut stream: TcpStream,
    mut levels: u32,
    table: &RwLock<CallbackTable>,
    stopping: &AtomicBool,
    lost: &AtomicBool,
) {
    let mut buffer = [0u8; NotificationReport::SIZE];
    loop {
        if let Err(e) = stream.read_exact(&mut buffer) {
            if !stopping.load(Ordering::Acquire) {
                lost.store(true, Ordering::Release);
                error!(error = %e, "Notification stream closed");
            }
            break;
        }
        let report = NotificationReport::decode(&buffer);
        if !report.is_level_sample() {
            trace!(seqno = report.seqno, flags = report.flags, "Skipping non-level report");
            continue;
        }

        // Dispatch under the read lock so unsubscribe waits for callbacks in flight.
        let table = table.read();
        for (line, edge) in level_changes(levels, report.level, table.mask()) {
            table.dispatch(line, &report, edge);
        }
        levels = report.level;
    }
    debug!("Notification thread stopped");
}
