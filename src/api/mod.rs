//! HTTP read path: content by key, raw content by path, summary
//! listing, and health plumbing.
//!
//! The read path is a thin consumer of the content store's read
//! operations; it never touches the consumer loop.

pub mod handlers;

use axum::Router;
use axum::routing::get;

use crate::app_state::AppState;

/// Builds the complete router with all read and health endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .route("/content/{key}", get(handlers::get_content))
        .route("/raw/{*path}", get(handlers::get_raw))
        .route("/contents", get(handlers::list_contents))
        .route("/alive", get(handlers::alive))
        .route("/admin/health", get(handlers::health))
        .route("/admin/healthcheck", get(handlers::alive))
}
