//! HTTP request handlers.

use axum::http::Uri;

use crate::error::ServerError;

pub(crate) mod content;
pub(crate) mod folders;
pub(crate) mod home;

/// Fallback for paths no route matches.
pub(crate) async fn not_found(uri: Uri) -> ServerError {
    ServerError::PageNotFound(uri.path().to_owned())
}
