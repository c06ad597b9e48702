//! Input port wiring

use std::sync::Arc;

use parking_lot::Mutex;
use rcio_bus::MessageBus;
use rcio_decoder::{DecoderStats, EdgeEvent, PulseDecoder};
use rcio_errors::ErrorSeverity;
use rcio_pigpio::{EdgeCallback, EdgeSubscriptionId};
use rcio_ports::PortId;
use tracing::{debug, trace, warn};

/// Decoder and edge subscription of one input port.
#[derive(Debug)]
pub struct InputChannel {
    port: PortId,
    topic: String,
    decoder: Arc<Mutex<PulseDecoder>>,
    subscription: Option<EdgeSubscriptionId>,
}

impl InputChannel {
    pub(crate) fn new(port: PortId, topic: &str) -> Self {
        Self {
            port,
            topic: topic.to_string(),
            decoder: Arc::new(Mutex::new(PulseDecoder::new(port))),
            subscription: None,
        }
    }

    /// Callback that feeds this port's decoder and publishes each reading on
    /// the port topic.
    pub(crate) fn edge_router<B: MessageBus + 'static>(&self, bus: Arc<B>) -> EdgeCallback {
        let port = self.port;
        let topic = self.topic.clone();
        let decoder = Arc::clone(&self.decoder);

        Box::new(move |edge, tick| {
            let result = decoder.lock().on_event(EdgeEvent::new(port, edge, tick));
            match result {
                Ok(Some(reading)) => {
                    trace!(port = %port, width_us = reading.width_us, "Pulse decoded");
                    if let Err(e) = bus.publish(&topic, reading.bus_value()) {
                        warn!(port = %port, topic = %topic, error = %e, "Failed to publish reading");
                    }
                }
                Ok(None) => {}
                Err(e) if e.severity() > ErrorSeverity::Info => {
                    warn!(port = %port, error = %e, "Edge ignored");
                }
                Err(e) => debug!(port = %port, error = %e, "Edge ignored"),
            }
        })
    }

    pub(crate) fn set_subscription(&mut self, id: EdgeSubscriptionId) {
        self.subscription = Some(id);
    }

    pub(crate) fn take_subscription(&mut self) -> Option<EdgeSubscriptionId> {
        self.subscription.take()
    }

    /// Port decoded.
    pub fn port(&self) -> PortId {
        self.port
    }

    /// Topic readings are published on.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Whether edges are currently delivered.
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Decoder counters.
    pub fn stats(&self) -> DecoderStats {
        self.decoder.lock().stats()
    }
}
