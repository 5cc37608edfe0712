//! Broadcast channel for apply outcomes.
//!
//! [`OutcomeBus`] wraps a [`tokio::sync::broadcast`] channel. The
//! change applier publishes one [`ApplyOutcome`] per processed message,
//! and observability collaborators (the outcome logging task, tests)
//! subscribe to receive them. No global listener registry: whoever
//! constructs the applier decides who gets the bus.

use tokio::sync::broadcast;

/// Result of applying one broker message, as seen by observers.
#[derive(Debug, Clone)]
pub enum ApplyOutcome {
    /// Content was upserted and the message committed.
    Stored {
        /// Content id.
        key: String,
        /// Raw path carried by the message, when present.
        path: Option<String>,
    },
    /// Content was deleted and the message committed.
    Deleted {
        /// Content id.
        key: String,
        /// Raw path carried by the message, when present.
        path: Option<String>,
    },
    /// The message could not be processed; it was not committed.
    Failed {
        /// Stage that failed: `decode`, `set`, `del`, or `commit`.
        operation: &'static str,
        /// Content id, when one could be extracted from the message.
        key: Option<String>,
        /// Raw path, when one was carried by the message.
        path: Option<String>,
        /// Human-readable cause.
        error: String,
    },
}

/// Broadcast bus for [`ApplyOutcome`]s.
///
/// When the ring buffer is full, the oldest outcomes are dropped for
/// lagging receivers.
#[derive(Debug, Clone)]
pub struct OutcomeBus {
    sender: broadcast::Sender<ApplyOutcome>,
}

impl OutcomeBus {
    /// Creates a new `OutcomeBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an outcome to all subscribers.
    ///
    /// Returns the number of receivers that got it. With no active
    /// receivers the outcome is silently dropped.
    pub fn publish(&self, outcome: ApplyOutcome) -> usize {
        self.sender.send(outcome).unwrap_or(0)
    }

    /// Creates a new receiver that will see all future outcomes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ApplyOutcome> {
        self.sender.subscribe()
    }

    /// Current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn stored(key: &str) -> ApplyOutcome {
        ApplyOutcome::Stored {
            key: key.to_string(),
            path: Some("/a/".to_string()),
        }
    }

    #[test]
    fn publish_without_receivers_returns_zero() {
        let bus = OutcomeBus::new(16);
        assert_eq!(bus.publish(stored("a")), 0);
    }

    #[tokio::test]
    async fn subscriber_receives_outcome() {
        let bus = OutcomeBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(stored("a"));

        let Ok(ApplyOutcome::Stored { key, .. }) = rx.recv().await else {
            panic!("expected a Stored outcome");
        };
        assert_eq!(key, "a");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_outcome() {
        let bus = OutcomeBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let count = bus.publish(stored("a"));
        assert_eq!(count, 2);

        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
    }

    #[test]
    fn receiver_count_tracks_subscribers() {
        let bus = OutcomeBus::new(16);
        assert_eq!(bus.receiver_count(), 0);

        let rx = bus.subscribe();
        assert_eq!(bus.receiver_count(), 1);

        drop(rx);
        assert_eq!(bus.receiver_count(), 0);
    }
}
