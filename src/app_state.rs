//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::persistence::ContentStore;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Content store gateway; the read path only ever calls its
    /// read operations.
    pub store: Arc<dyn ContentStore>,
    /// `max-age` for served content, in seconds.
    pub content_max_age_secs: u64,
}
