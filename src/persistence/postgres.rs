//! Durable PostgreSQL content store.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::supervisor::{RetryPolicy, connect_with_retry};
use super::ContentStore;
use crate::config::RelayConfig;
use crate::domain::{ContentRecord, ContentSummary, path};
use crate::error::RelayError;

/// PostgreSQL-backed [`ContentStore`] using `sqlx::PgPool`.
///
/// Upserts rely on `ON CONFLICT (id) DO UPDATE`, so repeated writes for
/// the same key converge instead of conflicting; the database also
/// serializes concurrent writers to the same row.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store around an already-connected pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to PostgreSQL under the configured retry budget and
    /// runs pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::ConnectionExhausted`] when the retry
    /// budget is spent, or [`RelayError::Persistence`] if migrations
    /// fail after a successful connection.
    pub async fn connect(config: &RelayConfig) -> Result<Self, RelayError> {
        let policy = RetryPolicy {
            attempts: config.connect_attempts,
            delay: config.connect_retry_delay,
        };

        let url = config.database_url.clone();
        let max_connections = config.database_max_connections;
        let acquire_timeout = Duration::from_secs(config.database_connect_timeout_secs);

        let pool = connect_with_retry(policy, move |_| {
            let url = url.clone();
            async move {
                PgPoolOptions::new()
                    .max_connections(max_connections)
                    .acquire_timeout(acquire_timeout)
                    .connect(&url)
                    .await
                    .map_err(|e| RelayError::persistence("connect", "", e))
            }
        })
        .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| RelayError::persistence("migrate", "", e))?;

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl ContentStore for PostgresStore {
    async fn set(&self, id: &str, content: &str, raw_path: &str) -> Result<(), RelayError> {
        let normalized = path::normalize(raw_path);

        sqlx::query(
            "INSERT INTO contents (id, path, content, created_at, updated_at) \
             VALUES ($1, $2, $3, now(), now()) \
             ON CONFLICT (id) DO UPDATE SET \
               path = EXCLUDED.path, \
               content = EXCLUDED.content, \
               updated_at = now()",
        )
        .bind(id)
        .bind(&normalized)
        .bind(content)
        .execute(&self.pool)
        .await
        .map_err(|e| RelayError::persistence("set", id, e))?;

        tracing::debug!(id, path = normalized, "content stored");
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<String, RelayError> {
        let content = sqlx::query_scalar::<_, String>(
            "SELECT content FROM contents WHERE id = $1 LIMIT 1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RelayError::persistence("get", id, e))?;

        Ok(content.unwrap_or_default())
    }

    async fn get_by_path(&self, raw_path: &str) -> Result<Option<ContentRecord>, RelayError> {
        let normalized = path::normalize(raw_path);
        if normalized.is_empty() {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, (String, String, String, DateTime<Utc>, DateTime<Utc>)>(
            "SELECT id, path, content, created_at, updated_at FROM contents \
             WHERE path = $1 ORDER BY updated_at DESC, created_at DESC LIMIT 1",
        )
        .bind(&normalized)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RelayError::persistence("get_by_path", raw_path, e))?;

        Ok(row.map(|(id, path, content, created_at, updated_at)| ContentRecord {
            id,
            path,
            content,
            created_at,
            updated_at,
        }))
    }

    async fn del(&self, id: &str) -> Result<(), RelayError> {
        sqlx::query("DELETE FROM contents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RelayError::persistence("del", id, e))?;

        tracing::debug!(id, "content deleted");
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<ContentSummary>, RelayError> {
        let rows = sqlx::query_as::<_, (String, String)>("SELECT id, path FROM contents")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RelayError::persistence("get_all", "", e))?;

        Ok(rows
            .into_iter()
            .map(|(id, path)| ContentSummary { id, path })
            .collect())
    }
}
