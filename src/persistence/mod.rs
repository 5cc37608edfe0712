//! Persistence layer: the content store gateway and its backends.
//!
//! [`ContentStore`] is the single abstraction the consumer loop and the
//! read path talk to. Two implementations exist, selected once at
//! construction: [`PostgresStore`] (durable, `sqlx::PgPool`) and
//! [`MemoryStore`] (volatile, process-lifetime map). The connection
//! supervisor in [`supervisor`] owns retry/backoff for the durable
//! backend's initial connection.

pub mod memory;
pub mod postgres;
pub mod supervisor;

use async_trait::async_trait;

use crate::domain::{ContentRecord, ContentSummary};
use crate::error::RelayError;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use supervisor::{RetryPolicy, connect_with_retry};

/// The content store gateway.
///
/// All writes are idempotent: repeating an upsert with identical
/// arguments or deleting an absent id leaves the store in the same
/// observable state. Misses are valid results, never errors.
///
/// Implementations must serialize conflicting writes to the same `id`
/// so that the last applied write wins in arrival order; the trait
/// itself adds no locking.
#[async_trait]
pub trait ContentStore: Send + Sync + std::fmt::Debug {
    /// Upserts content under `id`, normalizing `path` first.
    ///
    /// Inserts a new record or, if `id` already exists, overwrites
    /// `path`, `content`, and `updated_at` in place.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Persistence`] on backend failure.
    async fn set(&self, id: &str, content: &str, path: &str) -> Result<(), RelayError>;

    /// Returns the content for an exact `id` match, or an empty string
    /// when absent.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Persistence`] on backend failure; a miss
    /// is not an error.
    async fn get(&self, id: &str) -> Result<String, RelayError>;

    /// Returns the most recently updated record whose normalized path
    /// matches `path`, or `None` when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Persistence`] on backend failure; a miss
    /// is not an error.
    async fn get_by_path(&self, path: &str) -> Result<Option<ContentRecord>, RelayError>;

    /// Removes the record for `id` if present; succeeds either way.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Persistence`] on backend failure.
    async fn del(&self, id: &str) -> Result<(), RelayError>;

    /// Returns the `id`/`path` summary of every record, unordered.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Persistence`] on backend failure.
    async fn get_all(&self) -> Result<Vec<ContentSummary>, RelayError>;
}
