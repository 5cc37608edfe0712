//! The change applier: the consumer loop's per-message state machine.
//!
//! For every delivered message: decode, apply to the content store,
//! and only on success commit the offset, then publish an outcome.
//! Failures never crash the loop; they publish a `Failed` outcome and
//! leave the message uncommitted so the transport redelivers it
//! (at-least-once). Decode failures are the exception: the message is
//! structurally invalid and retrying would not help, so it is logged
//! and skipped while the loop keeps consuming.

use std::sync::Arc;

use super::decoder;
use super::transport::{InboundMessage, MessageTransport};
use crate::domain::{ApplyOutcome, OutcomeBus};
use crate::persistence::ContentStore;

/// Applies decoded change events to the content store and resolves
/// each message's commit strictly before taking the next one.
#[derive(Debug, Clone)]
pub struct ChangeApplier {
    store: Arc<dyn ContentStore>,
    outcomes: OutcomeBus,
}

impl ChangeApplier {
    /// Creates an applier over the given store, publishing outcomes to
    /// the given bus.
    #[must_use]
    pub fn new(store: Arc<dyn ContentStore>, outcomes: OutcomeBus) -> Self {
        Self { store, outcomes }
    }

    /// Consumes the transport until it is drained.
    ///
    /// Messages are processed sequentially: message N's apply and
    /// commit (or failure without commit) are fully resolved before
    /// message N+1 is taken, preserving per-partition ordering.
    pub async fn run<T: MessageTransport>(&self, mut transport: T) {
        while let Some(message) = transport.next().await {
            self.handle(message).await;
        }
        tracing::info!("transport drained; consumer loop stopped");
    }

    /// Processes a single delivered message.
    pub async fn handle(&self, message: InboundMessage) {
        let InboundMessage { raw, ack } = message;
        tracing::debug!("received message");

        let event = match decoder::decode(&raw) {
            Ok(event) => event,
            Err(error) => {
                tracing::warn!(error = %error, "discarding undecodable message");
                self.outcomes.publish(ApplyOutcome::Failed {
                    operation: "decode",
                    key: raw.key_lossy(),
                    path: None,
                    error: error.to_string(),
                });
                return;
            }
        };

        let key = event.key.clone();
        let raw_path = event.path.clone();

        let (operation, result) = match event.content.as_deref() {
            Some(content) => (
                "set",
                self.store
                    .set(&event.key, content, event.path.as_deref().unwrap_or(""))
                    .await,
            ),
            None => ("del", self.store.del(&event.key).await),
        };

        match result {
            Ok(()) => {
                if let Err(error) = ack.commit().await {
                    tracing::error!(key = %key, error = %error, "offset commit failed");
                    self.outcomes.publish(ApplyOutcome::Failed {
                        operation: "commit",
                        key: Some(key),
                        path: raw_path,
                        error: error.to_string(),
                    });
                    return;
                }

                let outcome = if operation == "set" {
                    ApplyOutcome::Stored {
                        key,
                        path: raw_path,
                    }
                } else {
                    ApplyOutcome::Deleted {
                        key,
                        path: raw_path,
                    }
                };
                self.outcomes.publish(outcome);
            }
            Err(error) => {
                // No commit: the transport redelivers the message,
                // which retries transient persistence failures.
                tracing::error!(key = %key, operation, error = %error, "could not apply change");
                self.outcomes.publish(ApplyOutcome::Failed {
                    operation,
                    key: Some(key),
                    path: raw_path,
                    error: error.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::consumer::transport::{CommitAck, RawMessage};
    use crate::domain::{ContentRecord, ContentSummary};
    use crate::error::RelayError;
    use crate::persistence::MemoryStore;

    #[derive(Debug)]
    struct RecordingAck {
        committed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl CommitAck for RecordingAck {
        async fn commit(self: Box<Self>) -> Result<(), RelayError> {
            self.committed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Store that fails every write, for exercising the no-commit path.
    #[derive(Debug)]
    struct BrokenStore;

    #[async_trait]
    impl ContentStore for BrokenStore {
        async fn set(&self, id: &str, _: &str, _: &str) -> Result<(), RelayError> {
            Err(RelayError::persistence("set", id, "backend down"))
        }

        async fn get(&self, _: &str) -> Result<String, RelayError> {
            Ok(String::new())
        }

        async fn get_by_path(&self, _: &str) -> Result<Option<ContentRecord>, RelayError> {
            Ok(None)
        }

        async fn del(&self, id: &str) -> Result<(), RelayError> {
            Err(RelayError::persistence("del", id, "backend down"))
        }

        async fn get_all(&self) -> Result<Vec<ContentSummary>, RelayError> {
            Ok(Vec::new())
        }
    }

    fn message(key: &[u8], payload: &str) -> (InboundMessage, Arc<AtomicBool>) {
        let committed = Arc::new(AtomicBool::new(false));
        let inbound = InboundMessage {
            raw: RawMessage {
                key: Some(key.to_vec()),
                payload: Some(payload.as_bytes().to_vec()),
            },
            ack: Box::new(RecordingAck {
                committed: Arc::clone(&committed),
            }),
        };
        (inbound, committed)
    }

    #[tokio::test]
    async fn upsert_applies_then_commits_then_signals() {
        let store = Arc::new(MemoryStore::new());
        let outcomes = OutcomeBus::new(16);
        let mut rx = outcomes.subscribe();
        let applier = ChangeApplier::new(Arc::clone(&store) as Arc<dyn ContentStore>, outcomes);

        let (inbound, committed) = message(b"a", r#"{"content":"<p>hi</p>","path":"/a/"}"#);
        applier.handle(inbound).await;

        assert!(committed.load(Ordering::SeqCst));
        assert_eq!(store.get("a").await.unwrap(), "<p>hi</p>");

        let Ok(ApplyOutcome::Stored { key, path }) = rx.recv().await else {
            panic!("expected Stored outcome");
        };
        assert_eq!(key, "a");
        assert_eq!(path.as_deref(), Some("/a/"));
    }

    #[tokio::test]
    async fn missing_content_deletes_and_commits() {
        let store = Arc::new(MemoryStore::new());
        store.set("a", "v1", "/a/").await.unwrap();

        let outcomes = OutcomeBus::new(16);
        let mut rx = outcomes.subscribe();
        let applier = ChangeApplier::new(Arc::clone(&store) as Arc<dyn ContentStore>, outcomes);

        let (inbound, committed) = message(b"a", "{}");
        applier.handle(inbound).await;

        assert!(committed.load(Ordering::SeqCst));
        assert_eq!(store.get("a").await.unwrap(), "");

        let Ok(ApplyOutcome::Deleted { key, .. }) = rx.recv().await else {
            panic!("expected Deleted outcome");
        };
        assert_eq!(key, "a");
    }

    #[tokio::test]
    async fn decode_failure_skips_without_commit() {
        let store = Arc::new(MemoryStore::new());
        let outcomes = OutcomeBus::new(16);
        let mut rx = outcomes.subscribe();
        let applier = ChangeApplier::new(Arc::clone(&store) as Arc<dyn ContentStore>, outcomes);

        let committed = Arc::new(AtomicBool::new(false));
        let inbound = InboundMessage {
            raw: RawMessage {
                key: None,
                payload: Some(b"{}".to_vec()),
            },
            ack: Box::new(RecordingAck {
                committed: Arc::clone(&committed),
            }),
        };
        applier.handle(inbound).await;

        assert!(!committed.load(Ordering::SeqCst));
        assert!(store.get_all().await.unwrap().is_empty());

        let Ok(ApplyOutcome::Failed { operation, key, .. }) = rx.recv().await else {
            panic!("expected Failed outcome");
        };
        assert_eq!(operation, "decode");
        assert!(key.is_none());
    }

    #[tokio::test]
    async fn apply_failure_never_commits_and_later_messages_proceed() {
        let outcomes = OutcomeBus::new(16);
        let mut rx = outcomes.subscribe();
        let applier = ChangeApplier::new(Arc::new(BrokenStore), outcomes.clone());

        let (failing, failing_committed) = message(b"n", r#"{"content":"c","path":"/n/"}"#);
        applier.handle(failing).await;

        // The failed message must stay uncommitted.
        assert!(!failing_committed.load(Ordering::SeqCst));
        let Ok(ApplyOutcome::Failed { operation, key, .. }) = rx.recv().await else {
            panic!("expected Failed outcome");
        };
        assert_eq!(operation, "set");
        assert_eq!(key.as_deref(), Some("n"));

        // A healthy store behind the same applier shape keeps going:
        // message N+1 is processed independently of N's failure.
        let healthy = ChangeApplier::new(Arc::new(MemoryStore::new()), outcomes);
        let (next, next_committed) = message(b"n+1", r#"{"content":"c","path":"/x/"}"#);
        healthy.handle(next).await;
        assert!(next_committed.load(Ordering::SeqCst));
    }
}
