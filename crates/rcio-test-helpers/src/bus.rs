//! Bus helpers.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use rcio_bus::{Handler, LocalBus, MessageBus, SubscriptionId};
use rcio_errors::BusError;

/// Records every value published on one topic.
#[derive(Debug, Clone)]
pub struct BusRecorder {
    topic: String,
    id: SubscriptionId,
    values: Arc<Mutex<Vec<i32>>>,
}

impl BusRecorder {
    /// Subscribe to `topic` on `bus` and start recording.
    pub fn attach(bus: &dyn MessageBus, topic: &str) -> Result<Self, BusError> {
        let values = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&values);
        let id = bus.subscribe(topic, Box::new(move |v| sink.lock().push(v)))?;
        Ok(Self {
            topic: topic.to_string(),
            id,
            values,
        })
    }

    /// Recorded topic.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Subscription held on the bus.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Every value received, in order.
    pub fn values(&self) -> Vec<i32> {
        self.values.lock().clone()
    }

    /// Most recent value.
    pub fn last(&self) -> Option<i32> {
        self.values.lock().last().copied()
    }
}

/// [`LocalBus`] with per-topic failure injection.
#[derive(Debug, Default)]
pub struct FaultyBus {
    inner: LocalBus,
    refuse_subscribe: Mutex<HashSet<String>>,
    refuse_publish: Mutex<HashSet<String>>,
    unsubscribed: Mutex<Vec<SubscriptionId>>,
}

impl FaultyBus {
    /// Bus that accepts everything until told otherwise.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every later subscription to `topic`.
    pub fn refuse_subscribe(&self, topic: &str) {
        self.refuse_subscribe.lock().insert(topic.to_string());
    }

    /// Fail every later publication on `topic`.
    pub fn refuse_publish(&self, topic: &str) {
        self.refuse_publish.lock().insert(topic.to_string());
    }

    /// Wrapped bus.
    pub fn inner(&self) -> &LocalBus {
        &self.inner
    }

    /// Ids passed to `unsubscribe`, in call order.
    pub fn unsubscribed(&self) -> Vec<SubscriptionId> {
        self.unsubscribed.lock().clone()
    }
}

impl MessageBus for FaultyBus {
    fn publish(&self, topic: &str, value: i32) -> Result<(), BusError> {
        if self.refuse_publish.lock().contains(topic) {
            return Err(BusError::delivery(topic, "injected publish failure"));
        }
        self.inner.publish(topic, value)
    }

    fn subscribe(&self, topic: &str, handler: Handler) -> Result<SubscriptionId, BusError> {
        if self.refuse_subscribe.lock().contains(topic) {
            return Err(BusError::delivery(topic, "injected subscribe failure"));
        }
        self.inner.subscribe(topic, handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), BusError> {
        self.unsubscribed.lock().push(id);
        self.inner.unsubscribe(id)
    }
}
