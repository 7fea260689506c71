//! Content pages and source files below the kind prefixes.
//!
//! `/{kind}s/{folders...}/{name}` first resolves against the current
//! snapshot. A hit renders the page for that entry. Otherwise the path may
//! name an entry's own file (a deck's markdown, anything inside a bundle),
//! which is served from the source directory with the kind prefix
//! stripped. Ignored, hidden and unclassified files are not served.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use kn_config::SiteConfig;
use kn_render::{ContentPage, entry_url, render_content};
use kn_tree::{Resolved, is_source_path, resolve, split_kind_prefix};
use percent_encoding::percent_decode_str;
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::error::ServerError;
use crate::state::AppState;

/// Handle GET /decks/*, /books/* and /bundles/*.
pub(crate) async fn get_content(
    State(state): State<Arc<AppState>>,
    req: Request,
) -> Result<Response, ServerError> {
    let raw_path = req.uri().path().to_owned();
    let Ok(path) = percent_decode_str(&raw_path).decode_utf8() else {
        return Err(ServerError::PageNotFound(raw_path));
    };

    let snapshot = state.cache.get().await?;
    if let Some(found) = resolve(&path, &snapshot.root) {
        let page = content_page(&snapshot.site, &found);
        return Ok(Html(render_content(&page)).into_response());
    }
    if !is_source_path(&path, &snapshot.root) {
        return Err(ServerError::PageNotFound(raw_path));
    }

    serve_source_file(&state, req, &raw_path).await
}

fn content_page<'a>(site: &'a SiteConfig, found: &Resolved<'a>) -> ContentPage<'a> {
    let crumbs = found.breadcrumb().get(1..).unwrap_or_default();
    let source_url = if found.kind.is_document() {
        entry_url("/", found.kind, crumbs, found.entry.source_name(), "")
    } else {
        entry_url("/", found.kind, crumbs, &found.entry.name, "/index.html")
    };

    ContentPage {
        site,
        kind: found.kind,
        title: &found.entry.title,
        source_url,
        home_url: "/".to_owned(),
    }
}

/// Serve a file from the source directory, relative to the kind prefix.
async fn serve_source_file(
    state: &AppState,
    req: Request,
    raw_path: &str,
) -> Result<Response, ServerError> {
    let Some((_, rest)) = split_kind_prefix(raw_path) else {
        return Err(ServerError::PageNotFound(raw_path.to_owned()));
    };

    let (mut parts, body) = req.into_parts();
    let mut uri = format!("/{rest}");
    if let Some(query) = parts.uri.query() {
        uri.push('?');
        uri.push_str(query);
    }
    parts.uri = uri
        .parse::<Uri>()
        .map_err(|_| ServerError::PageNotFound(raw_path.to_owned()))?;
    let req = Request::from_parts(parts, body);

    let response = match ServeDir::new(&state.source_dir).oneshot(req).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    if response.status() == StatusCode::NOT_FOUND {
        return Err(ServerError::PageNotFound(raw_path.to_owned()));
    }
    Ok(response.into_response())
}
