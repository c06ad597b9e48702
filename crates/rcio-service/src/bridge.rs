//! Bus to stdio bridge
//!
//! One JSON object per line, `{"topic":"throttle","value":1502}`, in both
//! directions. Readings published on input topics go to stdout; lines read
//! from stdin are published on the bus as commands, and only on output
//! topics.

use std::collections::BTreeSet;
use std::io::BufRead;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rcio_bus::{MessageBus, SubscriptionId};
use rcio_errors::{BusError, RcioError};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// How long shutdown waits for queued readings to be written.
pub const FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// One bus publication, as carried over stdio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusMessage {
    /// Topic, i.e. the port name
    pub topic: String,
    /// Pulse width in µs
    pub value: i32,
}

/// A stdio line could not be bridged.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The line is not a bus message
    #[error("Malformed bus message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The topic does not belong to an output port
    #[error("'{0}' is not a command topic")]
    NotACommandTopic(String),

    /// The bus refused the message
    #[error("Bus rejected message: {0}")]
    Bus(#[from] BusError),
}

impl BusMessage {
    /// Message on `topic`.
    pub fn new(topic: impl Into<String>, value: i32) -> Self {
        Self {
            topic: topic.into(),
            value,
        }
    }

    /// Parse one line. Blank lines yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Malformed`] when the line is not a bus message.
    pub fn parse_line(line: &str) -> Result<Option<Self>, BridgeError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(line)?))
    }

    /// Serialize as a single line without the trailing newline.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Malformed`] if serialization fails.
    pub fn to_line(&self) -> Result<String, BridgeError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Subscribe to every topic in `topics`, queueing each value on `tx`.
///
/// On error the subscriptions made so far are cancelled.
///
/// # Errors
///
/// The first [`BusError`] returned by [`MessageBus::subscribe`].
pub fn forward_topics<'a, B, I>(
    bus: &B,
    topics: I,
    tx: &mpsc::UnboundedSender<BusMessage>,
) -> Result<Vec<SubscriptionId>, BusError>
where
    B: MessageBus + ?Sized,
    I: IntoIterator<Item = &'a str>,
{
    let mut subscriptions = Vec::new();
    for topic in topics {
        let tx = tx.clone();
        let owned = topic.to_owned();
        let handler = Box::new(move |value: i32| {
            if tx.send(BusMessage::new(owned.clone(), value)).is_err() {
                debug!(topic = %owned, value, "Stdout writer gone, reading dropped");
            }
        });
        match bus.subscribe(topic, handler) {
            Ok(id) => {
                debug!(topic, subscription = %id, "Forwarding topic to stdout");
                subscriptions.push(id);
            }
            Err(e) => {
                unsubscribe_all(bus, &subscriptions);
                return Err(e);
            }
        }
    }
    Ok(subscriptions)
}

/// Write queued messages to `out`, one line each, until every sender is gone.
///
/// # Errors
///
/// The first I/O error writing to `out`.
pub async fn write_messages<W>(
    mut rx: mpsc::UnboundedReceiver<BusMessage>,
    mut out: W,
) -> std::io::Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut written: u64 = 0;
    while let Some(message) = rx.recv().await {
        let line = match message.to_line() {
            Ok(line) => line,
            Err(e) => {
                warn!(topic = %message.topic, error = %e, "Cannot serialize reading");
                continue;
            }
        };
        out.write_all(line.as_bytes()).await?;
        out.write_all(b"\n").await?;
        out.flush().await?;
        written = written.saturating_add(1);
    }
    Ok(written)
}

/// Publish every bus message read from `reader` until end of input.
///
/// Only topics in `commands` are published. Malformed lines, other topics and
/// rejected publications are logged and skipped. Returns the number of
/// messages published.
///
/// # Errors
///
/// The first I/O error reading from `reader`.
pub fn publish_lines<R, B>(reader: R, bus: &B, commands: &BTreeSet<String>) -> std::io::Result<u64>
where
    R: BufRead,
    B: MessageBus + ?Sized,
{
    let mut published: u64 = 0;
    for line in reader.lines() {
        let line = line?;
        match publish_line(&line, bus, commands) {
            Ok(true) => published = published.saturating_add(1),
            Ok(false) => {}
            Err(e) => warn!(line = %line.trim(), error = %e, "Ignoring stdin line"),
        }
    }
    Ok(published)
}

fn publish_line<B: MessageBus + ?Sized>(
    line: &str,
    bus: &B,
    commands: &BTreeSet<String>,
) -> Result<bool, BridgeError> {
    let Some(message) = BusMessage::parse_line(line)? else {
        return Ok(false);
    };
    if !commands.contains(&message.topic) {
        return Err(BridgeError::NotACommandTopic(message.topic));
    }
    bus.publish(&message.topic, message.value)?;
    Ok(true)
}

fn unsubscribe_all<B: MessageBus + ?Sized>(bus: &B, subscriptions: &[SubscriptionId]) {
    for id in subscriptions {
        if let Err(e) = bus.unsubscribe(*id) {
            warn!(subscription = %id, error = %e, "Failed to cancel stdout forwarding");
        }
    }
}

/// Running stdio bridge.
///
/// The stdin side runs on a plain thread because a blocking read on stdin
/// cannot be cancelled; it is left to die with the process.
pub struct StdioBridge<B: MessageBus + 'static> {
    bus: Arc<B>,
    subscriptions: Vec<SubscriptionId>,
    writer: JoinHandle<std::io::Result<u64>>,
}

impl<B: MessageBus + 'static> StdioBridge<B> {
    /// Bridge `readings` topics to stdout, and stdin to the `commands`
    /// topics.
    ///
    /// # Errors
    ///
    /// [`RcioError::Bus`] when a topic cannot be subscribed,
    /// [`RcioError::Io`] when the stdin thread cannot be spawned. Nothing is
    /// left running on error.
    pub fn spawn<'a, I, C>(bus: Arc<B>, readings: I, commands: C) -> Result<Self, RcioError>
    where
        I: IntoIterator<Item = &'a str>,
        C: IntoIterator<Item = &'a str>,
    {
        let commands: BTreeSet<String> = commands.into_iter().map(str::to_owned).collect();
        let bridge = Self::spawn_writer(Arc::clone(&bus), readings, tokio::io::stdout())?;

        let reader_bus = Arc::clone(&bus);
        let spawned = thread::Builder::new()
            .name("rcio-stdin".into())
            .spawn(move || {
                let stdin = std::io::stdin();
                match publish_lines(stdin.lock(), &*reader_bus, &commands) {
                    Ok(count) => info!(published = count, "Stdin closed"),
                    Err(e) => warn!(error = %e, "Stdin read failed"),
                }
            });
        if let Err(e) = spawned {
            unsubscribe_all(&*bus, &bridge.subscriptions);
            bridge.writer.abort();
            return Err(RcioError::Io(e));
        }
        Ok(bridge)
    }

    /// Forward `topics` to `out` only.
    ///
    /// # Errors
    ///
    /// [`BusError`] when a topic cannot be subscribed.
    pub fn spawn_writer<'a, I, W>(bus: Arc<B>, topics: I, out: W) -> Result<Self, BusError>
    where
        I: IntoIterator<Item = &'a str>,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscriptions = forward_topics(&*bus, topics, &tx)?;
        drop(tx);
        let writer = tokio::spawn(write_messages(rx, out));
        info!(topics = subscriptions.len(), "Stdio bridge running");
        Ok(Self {
            bus,
            subscriptions,
            writer,
        })
    }

    /// Number of forwarded topics.
    pub fn forwarded_topics(&self) -> usize {
        self.subscriptions.len()
    }

    /// Stop forwarding and wait up to [`FLUSH_TIMEOUT`] for queued readings.
    ///
    /// Returns the number of lines written.
    pub async fn shutdown(mut self) -> u64 {
        unsubscribe_all(&*self.bus, &self.subscriptions);
        self.subscriptions.clear();

        match tokio::time::timeout(FLUSH_TIMEOUT, &mut self.writer).await {
            Ok(Ok(Ok(written))) => {
                debug!(written, "Stdout writer finished");
                written
            }
            Ok(Ok(Err(e))) => {
                warn!(error = %e, "Stdout write failed");
                0
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Stdout writer task failed");
                0
            }
            Err(_elapsed) => {
                warn!("Stdout writer did not finish in time");
                self.writer.abort();
                0
            }
        }
    }
}
