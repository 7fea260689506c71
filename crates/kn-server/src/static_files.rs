//! Extra static paths from configuration.
//!
//! Each configured path is exposed at `/{name}`: directories through
//! [`ServeDir`], single files through [`ServeFile`].

use std::collections::HashSet;
use std::sync::Arc;

use axum::Router;
use kn_config::StaticPath;
use kn_tree::ContentKind;
use tower_http::services::{ServeDir, ServeFile};

use crate::state::AppState;

/// URL segments owned by built-in routes.
const RESERVED: [&str; 1] = ["folders.json"];

/// Create router serving the configured static paths.
///
/// Names that clash with built-in routes or with an earlier entry are
/// skipped with a warning.
pub(crate) fn static_router(paths: &[StaticPath]) -> Router<Arc<AppState>> {
    let mut router = Router::new();
    let mut seen = HashSet::new();

    for static_path in paths {
        let first_segment = static_path.name.split('/').next().unwrap_or_default();
        let reserved = RESERVED.contains(&static_path.name.as_str())
            || ContentKind::ALL
                .iter()
                .any(|kind| kind.url_segment() == first_segment);
        if reserved || !seen.insert(static_path.name.clone()) {
            tracing::warn!(name = %static_path.name, "Static path skipped because its URL is already in use");
            continue;
        }

        let route = format!("/{}", static_path.name);
        if static_path.path.is_dir() {
            router = router.nest_service(&route, ServeDir::new(&static_path.path));
        } else {
            if !static_path.path.is_file() {
                tracing::warn!(path = %static_path.path.display(), "Static path does not exist");
            }
            router = router.route_service(&route, ServeFile::new(&static_path.path));
        }
    }

    router
}
