//! Content tree endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use kn_tree::FolderListing;
use md5::{Digest, Md5};

use crate::error::ServerError;
use crate::state::AppState;

/// Handle GET /folders.json.
///
/// Serializes the current snapshot's tree. Responds 304 when the client's
/// `If-None-Match` matches the tree it already has.
pub(crate) async fn get_folders(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let snapshot = state.cache.get().await?;
    let body = serde_json::to_string(&FolderListing {
        root_folder: &snapshot.root,
    })?;

    let etag = compute_etag(&state.version, &body);

    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    Ok((
        [
            (header::ETAG, etag),
            (header::CONTENT_TYPE, "application/json".to_owned()),
            (header::CACHE_CONTROL, "no-cache".to_owned()),
        ],
        body,
    )
        .into_response())
}

/// Compute `ETag` from version and content.
///
/// Uses MD5 hash truncated to 64 bits (16 hex chars).
fn compute_etag(version: &str, content: &str) -> String {
    let hash = Md5::digest(format!("{version}:{content}").as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}
