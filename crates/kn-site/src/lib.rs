//! Live content state for keynote.
//!
//! A [`Snapshot`] pairs the site branding with one fully built content
//! tree. The [`SnapshotCache`] owns the current snapshot, refreshes it in
//! the background and hands out immutable `Arc<Snapshot>` values to any
//! number of concurrent readers.
//!
//! # Quick Start
//!
//! ```no_run
//! use kn_config::Config;
//! use kn_site::{FsSnapshotSource, RefreshPolicy, SnapshotCache};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load(None, None)?;
//! let source = FsSnapshotSource::from_config(&config);
//! let cache = SnapshotCache::start(source, RefreshPolicy::from_config(&config.refresh)).await?;
//!
//! let snapshot = cache.get().await?;
//! println!("generation {}", snapshot.generation);
//! # Ok(())
//! # }
//! ```

mod cache;
mod snapshot;

pub use cache::{CacheError, INBOX_CAPACITY, RefreshPolicy, SnapshotCache};
pub use snapshot::{FsSnapshotSource, LoadError, Snapshot, SnapshotSource};
