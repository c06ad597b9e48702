//! In-process bus

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::RwLock;
use rcio_errors::BusError;
use tracing::{debug, trace};

use crate::{Handler, MessageBus, SubscriptionId};

type SharedHandler = Arc<dyn Fn(i32) + Send + Sync + 'static>;

#[derive(Default)]
struct Topics {
    handlers: HashMap<String, Vec<(SubscriptionId, SharedHandler)>>,
    topic_of: HashMap<SubscriptionId, String>,
}

/// Synchronous in-process bus.
///
/// Handlers run on the publishing thread, outside the topic table lock, so a
/// handler may publish or subscribe itself.
pub struct LocalBus {
    topics: RwLock<Topics>,
    next_id: AtomicU64,
    closed: AtomicBool,
    published: AtomicU64,
}

impl LocalBus {
    /// Empty, open bus.
    pub fn new() -> Self {
        Self {
            topics: RwLock::new(Topics::default()),
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
            published: AtomicU64::new(0),
        }
    }

    /// Refuse further publications and subscriptions. Existing subscriptions
    /// can still be removed.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!("Local bus closed");
        }
    }

    /// Whether [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Number of handlers registered for `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.read().handlers.get(topic).map_or(0, Vec::len)
    }

    /// Topics with at least one subscriber, sorted.
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self
            .topics
            .read()
            .handlers
            .iter()
            .filter(|(_, subs)| !subs.is_empty())
            .map(|(topic, _)| topic.clone())
            .collect();
        topics.sort();
        topics
    }

    /// Messages accepted since construction.
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    fn check_open(&self, topic: &str) -> Result<(), BusError> {
        if topic.is_empty() {
            return Err(BusError::EmptyTopic);
        }
        if self.is_closed() {
            return Err(BusError::Closed);
        }
        Ok(())
    }
}

impl Default for LocalBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LocalBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalBus")
            .field("topics", &self.topics())
            .field("closed", &self.is_closed())
            .field("published", &self.published())
            .finish()
    }
}

impl MessageBus for LocalBus {
    fn publish(&self, topic: &str, value: i32) -> Result<(), BusError> {
        self.check_open(topic)?;
        let handlers: Vec<SharedHandler> = self
            .topics
            .read()
            .handlers
            .get(topic)
            .map(|subs| subs.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();
        self.published.fetch_add(1, Ordering::Relaxed);

        trace!(topic, value, subscribers = handlers.len(), "Publish");
        for handler in handlers {
            handler(value);
        }
        Ok(())
    }

    fn subscribe(&self, topic: &str, handler: Handler) -> Result<SubscriptionId, BusError> {
        self.check_open(topic)?;
        let id = SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut topics = self.topics.write();
        topics
            .handlers
            .entry(topic.to_string())
            .or_default()
            .push((id, Arc::from(handler)));
        topics.topic_of.insert(id, topic.to_string());
        debug!(topic, id = %id, "Subscribed");
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), BusError> {
        let mut topics = self.topics.write();
        let topic = topics
            .topic_of
            .remove(&id)
            .ok_or(BusError::UnknownSubscription(id.get()))?;
        if let Some(subs) = topics.handlers.get_mut(&topic) {
            subs.retain(|(sub, _)| *sub != id);
            if subs.is_empty() {
                topics.handlers.remove(&topic);
            }
        }
        debug!(topic = %topic, id = %id, "Unsubscribed");
        Ok(())
    }
}
