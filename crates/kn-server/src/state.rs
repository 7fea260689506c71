//! Application state.
//!
//! Shared state for all request handlers.

use std::path::PathBuf;

use kn_site::SnapshotCache;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Source of content snapshots.
    pub(crate) cache: SnapshotCache,
    /// Content root, served for files below the kind prefixes.
    pub(crate) source_dir: PathBuf,
    /// Application version for cache invalidation.
    pub(crate) version: String,
}
