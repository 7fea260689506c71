//! Home page.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use kn_render::{HomeData, LinkMode, render_home};

use crate::error::ServerError;
use crate::state::AppState;

/// Handle GET /.
pub(crate) async fn get_home(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, ServerError> {
    let snapshot = state.cache.get().await?;
    Ok(Html(render_home(&HomeData::new(
        &snapshot.site,
        LinkMode::Live,
    ))))
}
