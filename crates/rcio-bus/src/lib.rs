//! Message bus for rcio
//!
//! Every port has one topic, named after the port. Outputs subscribe to their
//! topic for commands; inputs publish decoded pulse widths on theirs. The
//! payload is a single `i32` in both directions.
//!
//! [`MessageBus`] is the seam; [`LocalBus`] is the in-process implementation
//! the daemon bridges to stdio.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod local;

use core::fmt;
use std::sync::Arc;

use rcio_errors::BusError;

pub use local::LocalBus;

/// Receives every value published on a topic.
pub type Handler = Box<dyn Fn(i32) + Send + Sync + 'static>;

/// Handle for one topic subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Wrap a raw id.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// Topic based publish/subscribe.
pub trait MessageBus: Send + Sync {
    /// Deliver `value` to every current subscriber of `topic`.
    ///
    /// # Errors
    ///
    /// [`BusError`] when the topic is invalid or the bus cannot deliver.
    fn publish(&self, topic: &str, value: i32) -> Result<(), BusError>;

    /// Register `handler` for `topic`.
    ///
    /// # Errors
    ///
    /// [`BusError`] when the topic is invalid or the bus is closed.
    fn subscribe(&self, topic: &str, handler: Handler) -> Result<SubscriptionId, BusError>;

    /// Remove a subscription. Once this returns the handler is not invoked
    /// for new publications.
    ///
    /// # Errors
    ///
    /// [`BusError::UnknownSubscription`] for an id the bus does not hold.
    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), BusError>;
}

impl<T: MessageBus + ?Sized> MessageBus for Arc<T> {
    fn publish(&self, topic: &str, value: i32) -> Result<(), BusError> {
        (**self).publish(topic, value)
    }

    fn subscribe(&self, topic: &str, handler: Handler) -> Result<SubscriptionId, BusError> {
        (**self).subscribe(topic, handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), BusError> {
        (**self).unsubscribe(id)
    }
}
