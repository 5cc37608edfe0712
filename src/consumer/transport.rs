//! Broker transport abstraction.
//!
//! The relay treats the broker as a black box that delivers ordered
//! messages per partition and accepts a commit call per message.
//! [`MessageTransport`] captures exactly that surface; the change
//! applier is written against it and never sees a concrete client.
//!
//! [`ChannelTransport`] is the in-process implementation used by tests
//! and embedders. A Kafka implementation lives behind the `kafka`
//! feature in [`super::kafka`].

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::RelayError;

/// A raw broker message before decoding: binary key and value payload,
/// either of which the broker may have omitted.
#[derive(Debug, Clone, Default)]
pub struct RawMessage {
    /// Binary message key.
    pub key: Option<Vec<u8>>,
    /// Binary value payload (JSON on the wire).
    pub payload: Option<Vec<u8>>,
}

impl RawMessage {
    /// Best-effort UTF-8 reading of the key, for error reporting on
    /// messages that fail to decode.
    #[must_use]
    pub fn key_lossy(&self) -> Option<String> {
        self.key
            .as_deref()
            .map(|k| String::from_utf8_lossy(k).into_owned())
    }
}

/// Commit handle for a single message.
///
/// Invoking it advances the durable consumption position past the
/// message; a message whose handle is never invoked will be redelivered
/// by the transport (at-least-once delivery).
#[async_trait]
pub trait CommitAck: Send + std::fmt::Debug {
    /// Acknowledges the message to the transport.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Transport`] if the transport rejects the
    /// commit; the message stays uncommitted.
    async fn commit(self: Box<Self>) -> Result<(), RelayError>;
}

/// One delivered message together with its commit handle.
#[derive(Debug)]
pub struct InboundMessage {
    /// The undecoded message.
    pub raw: RawMessage,
    /// Commit handle; consumed at most once.
    pub ack: Box<dyn CommitAck>,
}

/// A single ordered consumption stream.
///
/// `next` suspends until a message arrives and returns `None` once the
/// stream is exhausted (shutdown drains by ceasing delivery and letting
/// in-flight messages complete).
#[async_trait]
pub trait MessageTransport: Send {
    /// Awaits the next message in delivery order.
    async fn next(&mut self) -> Option<InboundMessage>;
}

/// In-process [`MessageTransport`] backed by an unbounded mpsc channel.
#[derive(Debug)]
pub struct ChannelTransport {
    receiver: mpsc::UnboundedReceiver<InboundMessage>,
}

impl ChannelTransport {
    /// Creates a connected sender/transport pair. Dropping the sender
    /// ends the stream.
    #[must_use]
    pub fn channel() -> (mpsc::UnboundedSender<InboundMessage>, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (sender, Self { receiver })
    }
}

#[async_trait]
impl MessageTransport for ChannelTransport {
    async fn next(&mut self) -> Option<InboundMessage> {
        self.receiver.recv().await
    }
}
