//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kn_site::CacheError;
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Nothing is served at the given path.
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// Snapshot cache is unavailable.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Content tree could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (binding the listener, serving).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::PageNotFound(path) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Page not found", "path": path}),
            ),
            Self::Cache(CacheError::Closed) => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({"error": self.to_string()}),
            ),
            Self::Cache(_) | Self::Json(_) | Self::Io(_) => {
                tracing::error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": self.to_string()}),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
