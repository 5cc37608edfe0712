//! Volatile in-memory content store.
//!
//! Implements the same contract as the PostgreSQL backend but keeps
//! everything in a process-lifetime map keyed by `id`; path lookups are
//! a linear scan. Intended for tests and constrained/offline operation,
//! not production durability. Construction never fails and needs no
//! connection supervision.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::ContentStore;
use crate::domain::{ContentRecord, ContentSummary, path};
use crate::error::RelayError;

/// In-memory [`ContentStore`] backed by an `RwLock<HashMap>`.
///
/// The lock serializes conflicting writes to the same `id`, so the last
/// applied write wins in arrival order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, ContentRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn set(&self, id: &str, content: &str, raw_path: &str) -> Result<(), RelayError> {
        let normalized = path::normalize(raw_path);
        let now = Utc::now();

        let mut records = self.records.write().await;
        if let Some(record) = records.get_mut(id) {
            record.path = normalized;
            record.content = content.to_string();
            record.updated_at = now;
        } else {
            records.insert(
                id.to_string(),
                ContentRecord {
                    id: id.to_string(),
                    path: normalized,
                    content: content.to_string(),
                    created_at: now,
                    updated_at: now,
                },
            );
        }

        tracing::debug!(id, "content stored in memory");
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<String, RelayError> {
        let records = self.records.read().await;
        Ok(records
            .get(id)
            .map(|record| record.content.clone())
            .unwrap_or_default())
    }

    async fn get_by_path(&self, raw_path: &str) -> Result<Option<ContentRecord>, RelayError> {
        let normalized = path::normalize(raw_path);
        if normalized.is_empty() {
            return Ok(None);
        }

        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|record| record.path == normalized)
            .max_by_key(|record| (record.updated_at, record.created_at))
            .cloned())
    }

    async fn del(&self, id: &str) -> Result<(), RelayError> {
        let mut records = self.records.write().await;
        records.remove(id);
        tracing::debug!(id, "content deleted from memory");
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<ContentSummary>, RelayError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .map(|record| ContentSummary {
                id: record.id.clone(),
                path: record.path.clone(),
            })
            .collect())
    }
}
