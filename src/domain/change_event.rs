//! Change events decoded from broker messages.

use serde::{Deserialize, Serialize};

/// A single decoded change event.
///
/// Constructed by the message decoder from one broker message, applied
/// exactly once, then discarded; events are never persisted themselves.
///
/// The presence of `content` is the sole discriminator between upsert
/// and delete: an event without content is a delete request for `key`,
/// even when a `path` is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Maps to [`ContentRecord::id`](super::ContentRecord); always present.
    pub key: String,
    /// Content payload; `None` marks the event as a delete.
    pub content: Option<String>,
    /// Raw (not yet normalized) path; used on upsert, ignored on delete.
    pub path: Option<String>,
}

impl ChangeEvent {
    /// Whether this event requests a delete rather than an upsert.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.content.is_none()
    }
}
