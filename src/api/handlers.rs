//! Read-path endpoint handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::app_state::AppState;
use crate::domain::ContentSummary;
use crate::error::{ErrorResponse, RelayError};

/// Health check response for `GET /admin/health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"UP"` while the process is serving.
    pub status: String,
}

/// `GET /content/{key}` — content for an exact id match.
///
/// A hit renders the stored payload as HTML with a cache header; a
/// miss is a 404, not an error.
///
/// # Errors
///
/// Returns a [`RelayError`] (500) when the store itself fails.
pub async fn get_content(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, RelayError> {
    let content = state.store.get(&key).await?;
    Ok(render(&state, &key, &content))
}

/// `GET /raw/{*path}` — most recently updated content under a path.
///
/// # Errors
///
/// Returns a [`RelayError`] (500) when the store itself fails.
pub async fn get_raw(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, RelayError> {
    match state.store.get_by_path(&path).await? {
        Some(record) => Ok(render(&state, &path, &record.content)),
        None => Ok(miss(&path)),
    }
}

/// `GET /contents` — `id`/`path` summary of every stored record.
///
/// # Errors
///
/// Returns a [`RelayError`] (500) when the store itself fails.
pub async fn list_contents(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContentSummary>>, RelayError> {
    Ok(Json(state.store.get_all().await?))
}

/// `GET /alive` and `GET /admin/healthcheck` — liveness probe.
pub async fn alive() -> StatusCode {
    StatusCode::OK
}

/// `GET /admin/health` — health status body.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP".to_string(),
    })
}

/// Renders stored content as HTML, treating an empty payload as a miss.
fn render(state: &AppState, key: &str, content: &str) -> Response {
    if content.is_empty() {
        return miss(key);
    }

    tracing::debug!(key, "content served");
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/html".to_string()),
            (
                header::CACHE_CONTROL,
                format!("max-age={}", state.content_max_age_secs),
            ),
        ],
        content.to_string(),
    )
        .into_response()
}

fn miss(key: &str) -> Response {
    tracing::debug!(key, "content missed");
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Content with key or path \"{key}\" does not exist."),
        }),
    )
        .into_response()
}
