//! Kafka implementation of the broker transport (behind the `kafka`
//! feature).
//!
//! Auto-commit is disabled; offsets are committed one message at a time
//! through [`CommitAck`], which is what lets the applier bound
//! at-least-once delivery to the commit-after-write window.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::{Offset, TopicPartitionList};

use super::transport::{CommitAck, InboundMessage, MessageTransport, RawMessage};
use crate::config::BrokerConfig;
use crate::error::RelayError;

/// [`MessageTransport`] over an rdkafka [`StreamConsumer`].
pub struct KafkaTransport {
    consumer: Arc<StreamConsumer>,
}

impl fmt::Debug for KafkaTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KafkaTransport").finish_non_exhaustive()
    }
}

impl KafkaTransport {
    /// Creates a consumer subscribed to the configured topic.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Transport`] when the client cannot be
    /// built or the subscription is rejected.
    pub fn connect(config: &BrokerConfig) -> Result<Self, RelayError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.servers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "false")
            .set("socket.keepalive.enable", "true")
            .set("api.version.request", "true")
            .create()
            .map_err(|e| RelayError::Transport(e.to_string()))?;

        consumer
            .subscribe(&[config.topic.as_str()])
            .map_err(|e| RelayError::Transport(e.to_string()))?;

        tracing::info!(topic = %config.topic, group = %config.group_id, "broker consumer subscribed");
        Ok(Self {
            consumer: Arc::new(consumer),
        })
    }
}

#[async_trait]
impl MessageTransport for KafkaTransport {
    async fn next(&mut self) -> Option<InboundMessage> {
        loop {
            match self.consumer.recv().await {
                Ok(delivered) => {
                    let raw = RawMessage {
                        key: delivered.key().map(<[u8]>::to_vec),
                        payload: delivered.payload().map(<[u8]>::to_vec),
                    };
                    let ack = KafkaAck {
                        consumer: Arc::clone(&self.consumer),
                        topic: delivered.topic().to_string(),
                        partition: delivered.partition(),
                        offset: delivered.offset(),
                    };
                    return Some(InboundMessage {
                        raw,
                        ack: Box::new(ack),
                    });
                }
                Err(error) => {
                    // Client-level hiccups (rebalance, broker restart)
                    // are logged and the stream keeps going.
                    tracing::error!(error = %error, "broker receive failed");
                }
            }
        }
    }
}

/// Commit handle that advances the group offset past one message.
struct KafkaAck {
    consumer: Arc<StreamConsumer>,
    topic: String,
    partition: i32,
    offset: i64,
}

impl fmt::Debug for KafkaAck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KafkaAck")
            .field("topic", &self.topic)
            .field("partition", &self.partition)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CommitAck for KafkaAck {
    async fn commit(self: Box<Self>) -> Result<(), RelayError> {
        let mut offsets = TopicPartitionList::new();
        offsets
            .add_partition_offset(&self.topic, self.partition, Offset::Offset(self.offset + 1))
            .map_err(|e| RelayError::Transport(e.to_string()))?;

        self.consumer
            .commit(&offsets, CommitMode::Async)
            .map_err(|e| RelayError::Transport(e.to_string()))
    }
}
