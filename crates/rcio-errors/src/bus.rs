//! Message bus errors.

/// Errors raised by a message bus implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
    /// Topic names must be non-empty
    #[error("Topic name must not be empty")]
    EmptyTopic,

    /// The subscription id is not known to the bus
    #[error("Unknown subscription {0}")]
    UnknownSubscription(u64),

    /// The bus no longer accepts messages
    #[error("Message bus is closed")]
    Closed,

    /// Transport-specific failure
    #[error("Failed to deliver on topic '{topic}': {reason}")]
    Delivery {
        /// Topic of the failed delivery
        topic: String,
        /// Transport failure
        reason: String,
    },
}

impl BusError {
    /// Create a delivery error.
    pub fn delivery(topic: impl Into<String>, reason: impl Into<String>) -> Self {
        BusError::Delivery {
            topic: topic.into(),
            reason: reason.into(),
        }
    }
}
