//! HTTP server for keynote.
//!
//! Serves the live site on top of a [`SnapshotCache`]:
//! - `GET /`: home page
//! - `GET /folders.json`: current content tree
//! - `GET /{decks,books,bundles}/...`: content pages and source files
//! - configured static paths
//!
//! # Quick Start
//!
//! ```no_run
//! use kn_config::Config;
//! use kn_server::{ServerConfig, run_server};
//! use kn_site::{FsSnapshotSource, RefreshPolicy, SnapshotCache};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load(None, None)?;
//! let cache = SnapshotCache::start(
//!     FsSnapshotSource::from_config(&config),
//!     RefreshPolicy::from_config(&config.refresh),
//! )
//! .await?;
//!
//! run_server(ServerConfig::from_config(&config, "0.1.0".to_owned()), cache).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum router (kn-server)
//!                        │
//!                        ├─► get() ──► SnapshotCache owner task (kn-site)
//!                        │                  │
//!                        │                  └─► periodic rescan (kn-tree)
//!                        │
//!                        ├─► resolve + render (kn-tree, kn-render)
//!                        │
//!                        └─► source and static files (tower-http)
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;
mod static_files;

use std::path::PathBuf;
use std::sync::Arc;

use kn_config::{Config, StaticPath};
use kn_site::SnapshotCache;
use state::AppState;

pub use error::ServerError;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Content source directory.
    pub source_dir: PathBuf,
    /// Extra files and directories exposed at the site root.
    pub static_paths: Vec<StaticPath>,
    /// Application version (for cache invalidation).
    pub version: String,
}

impl ServerConfig {
    /// Create server configuration from a loaded config.
    ///
    /// # Arguments
    ///
    /// * `config` - keynote configuration
    /// * `version` - Application version
    #[must_use]
    pub fn from_config(config: &Config, version: String) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            source_dir: config.content_resolved.source_dir.clone(),
            static_paths: config.static_resolved.clone(),
            version,
        }
    }
}

/// Run the server until Ctrl-C, then stop the snapshot cache.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or serving fails.
pub async fn run_server(config: ServerConfig, cache: SnapshotCache) -> Result<(), ServerError> {
    serve_until(config, cache, shutdown_signal()).await
}

/// Serve until `shutdown` completes. The cache is stopped on every exit path.
async fn serve_until(
    config: ServerConfig,
    cache: SnapshotCache,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    let state = Arc::new(AppState {
        cache: cache.clone(),
        source_dir: config.source_dir,
        version: config.version,
    });
    let app = app::create_router(state, &config.static_paths);
    let (host, port) = (config.host, config.port);

    let served = async move {
        let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
        tracing::info!(address = %listener.local_addr()?, "Starting server");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok::<_, ServerError>(())
    }
    .await;

    cache.shutdown().await;
    served
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
