//! Persisted content entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored piece of content.
///
/// `id` is the primary key and unique; `path` is a normalized,
/// non-unique secondary key. Several records may share a path over
/// time, in which case path lookups resolve to the most recently
/// updated one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Stable identifier of the content (broker message key).
    pub id: String,
    /// Normalized path, possibly empty when the upsert carried none.
    pub path: String,
    /// Content payload; may be an empty string.
    pub content: String,
    /// Set by the store on first insert.
    pub created_at: DateTime<Utc>,
    /// Bumped by the store on every upsert.
    pub updated_at: DateTime<Utc>,
}

/// Summary projection returned by full enumeration: `id` and `path`
/// only, never the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSummary {
    /// Stable identifier of the content.
    pub id: String,
    /// Normalized path.
    pub path: String,
}
