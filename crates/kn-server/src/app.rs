//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use kn_config::StaticPath;
use kn_tree::ContentKind;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;
use crate::static_files;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `static_paths` - Extra files and directories exposed at the site root
pub(crate) fn create_router(state: Arc<AppState>, static_paths: &[StaticPath]) -> Router {
    let mut router = Router::new()
        .route("/", get(handlers::home::get_home))
        .route("/folders.json", get(handlers::folders::get_folders));

    for kind in ContentKind::ALL {
        router = router.route(
            &format!("{}{{*path}}", kind.url_prefix()),
            get(handlers::content::get_content),
        );
    }

    router
        .merge(static_files::static_router(static_paths))
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use kn_config::SiteConfig;
    use kn_site::{FsSnapshotSource, RefreshPolicy, SnapshotCache};
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    struct TestApp {
        _dir: tempfile::TempDir,
        source: std::path::PathBuf,
        cache: SnapshotCache,
        router: Router,
    }

    async fn test_app() -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src");
        write(
            &source.join(".folder.yaml"),
            "book: [guide.md]\nbundle: [api]\n",
        );
        write(&source.join("guide.md"), "# Guide");
        write(&source.join("api/index.html"), "<h1>API</h1>");
        write(
            &source.join("talks/.folder.yaml"),
            "deck: [intro.md, my talk.md]\nignore: [secret.md, drafts]\n",
        );
        write(&source.join("talks/intro.md"), "# Intro");
        write(&source.join("talks/secret.md"), "SECRET");
        write(&source.join("talks/unlisted.md"), "# Unlisted");
        write(&source.join("talks/drafts/plan.md"), "# Plan");
        write(&source.join("talks/my talk.md"), "# Mine");
        write(&dir.path().join("assets/logo.svg"), "<svg/>");
        write(&dir.path().join("favicon.ico"), "icon");

        let site = SiteConfig {
            name: "Team Talks".to_owned(),
            title: "Talks".to_owned(),
            ..SiteConfig::default()
        };
        let cache = SnapshotCache::start(
            FsSnapshotSource::new(&source, site),
            RefreshPolicy::every(std::time::Duration::from_secs(3600)),
        )
        .await
        .unwrap();

        let state = Arc::new(AppState {
            cache: cache.clone(),
            source_dir: source.clone(),
            version: "0.1.0".to_owned(),
        });
        let static_paths = [
            StaticPath {
                name: "assets".to_owned(),
                path: dir.path().join("assets"),
            },
            StaticPath {
                name: "favicon.ico".to_owned(),
                path: dir.path().join("favicon.ico"),
            },
        ];
        let router = create_router(state, &static_paths);

        TestApp {
            _dir: dir,
            source,
            cache,
            router,
        }
    }

    async fn get(router: &Router, uri: &str) -> Response {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        router.clone().oneshot(request).await.unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_home_page() {
        let app = test_app().await;
        let response = get(&app.router, "/").await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("<title>Talks</title>"));
        assert!(html.contains("<h1>Team Talks</h1>"));
        assert!(html.contains(r#""static":false"#));
    }

    #[tokio::test]
    async fn test_folders_json_and_etag() {
        let app = test_app().await;
        let response = get(&app.router, "/folders.json").await;

        assert_eq!(response.status(), StatusCode::OK);
        let etag = response.headers()[header::ETAG].clone();
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["rootFolder"]["name"], "/");
        assert_eq!(json["rootFolder"]["subfolders"][0]["name"], "talks");

        let request = Request::builder()
            .uri("/folders.json")
            .header(header::IF_NONE_MATCH, etag)
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_deck_page() {
        let app = test_app().await;
        let response = get(&app.router, "/decks/talks/intro").await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("data-markdown=\"/decks/talks/intro.md\""));
        assert!(html.contains("<title>intro - Talks</title>"));
    }

    #[tokio::test]
    async fn test_percent_encoded_path() {
        let app = test_app().await;
        let response = get(&app.router, "/decks/talks/my%20talk").await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("data-markdown=\"/decks/talks/my%20talk.md\""));

        let source = get(&app.router, "/decks/talks/my%20talk.md").await;
        assert_eq!(source.status(), StatusCode::OK);
        assert_eq!(body_text(source).await, "# Mine");
    }

    #[tokio::test]
    async fn test_book_and_bundle_pages() {
        let app = test_app().await;

        let book = get(&app.router, "/books/guide").await;
        assert_eq!(book.status(), StatusCode::OK);
        assert!(body_text(book).await.contains(r#"homepage: "/books/guide.md""#));

        let bundle = get(&app.router, "/bundles/api").await;
        assert_eq!(bundle.status(), StatusCode::OK);
        assert!(
            body_text(bundle)
                .await
                .contains("<iframe src=\"/bundles/api/index.html\"")
        );

        let index = get(&app.router, "/bundles/api/index.html").await;
        assert_eq!(index.status(), StatusCode::OK);
        assert_eq!(body_text(index).await, "<h1>API</h1>");
    }

    #[tokio::test]
    async fn test_source_file_below_prefix() {
        let app = test_app().await;
        let response = get(&app.router, "/decks/talks/intro.md").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "# Intro");
    }

    #[tokio::test]
    async fn test_only_entry_files_are_served() {
        let app = test_app().await;

        for uri in [
            "/decks/talks/secret.md",
            "/books/talks/drafts/plan.md",
            "/decks/talks/drafts/plan.md",
            "/decks/talks/unlisted.md",
            "/decks/talks/.folder.yaml",
            "/books/.folder.yaml",
            "/books/talks/intro.md",
            "/bundles/guide.md",
        ] {
            assert_eq!(
                get(&app.router, uri).await.status(),
                StatusCode::NOT_FOUND,
                "{uri}"
            );
        }
    }

    #[tokio::test]
    async fn test_resolution_is_kind_restricted() {
        let app = test_app().await;

        let response = get(&app.router, "/books/talks/intro").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["error"], "Page not found");
        assert_eq!(json["path"], "/books/talks/intro");

        assert_eq!(
            get(&app.router, "/decks/guide").await.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get(&app.router, "/decks/talks/missing").await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let app = test_app().await;
        let response = get(&app.router, "/slides/intro").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_static_paths() {
        let app = test_app().await;

        let logo = get(&app.router, "/assets/logo.svg").await;
        assert_eq!(logo.status(), StatusCode::OK);
        assert_eq!(body_text(logo).await, "<svg/>");

        let icon = get(&app.router, "/favicon.ico").await;
        assert_eq!(icon.status(), StatusCode::OK);
        assert_eq!(body_text(icon).await, "icon");
    }

    #[tokio::test]
    async fn test_security_headers() {
        let app = test_app().await;
        let response = get(&app.router, "/").await;

        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert_eq!(response.headers()["x-frame-options"], "SAMEORIGIN");
    }

    #[tokio::test]
    async fn test_refresh_is_visible_to_requests() {
        let app = test_app().await;
        assert_eq!(
            get(&app.router, "/decks/talks/outro").await.status(),
            StatusCode::NOT_FOUND
        );

        write(
            &app.source.join("talks/.folder.yaml"),
            "deck: [intro.md, outro.md]\n",
        );
        write(&app.source.join("talks/outro.md"), "# Outro");
        app.cache.refresh().await.unwrap();

        assert_eq!(
            get(&app.router, "/decks/talks/outro").await.status(),
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_closed_cache_is_unavailable() {
        let app = test_app().await;
        app.cache.shutdown().await;

        let response = get(&app.router, "/").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
