//! Snapshots and the sources that produce them.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use kn_config::{Config, ConfigError, SiteConfig};
use kn_tree::{BuildError, Folder, TreeBuilder};

/// Error produced while loading a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Site configuration could not be reloaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Content root could not be scanned.
    #[error(transparent)]
    Build(#[from] BuildError),
    /// The blocking load task panicked or was cancelled.
    #[error("Load task failed: {0}")]
    Task(String),
}

/// Site branding and content tree captured by one scan.
#[derive(Debug)]
pub struct Snapshot {
    /// Branding strings.
    pub site: SiteConfig,
    /// Root of the content tree.
    pub root: Folder,
    /// Position in the sequence of successful loads, starting at 1.
    pub generation: u64,
    /// When the scan finished.
    pub loaded_at: DateTime<Utc>,
}

impl Snapshot {
    /// Create a snapshot stamped with the current time.
    ///
    /// The generation is assigned by the cache when the snapshot is published.
    #[must_use]
    pub fn new(site: SiteConfig, root: Folder) -> Self {
        Self {
            site,
            root,
            generation: 0,
            loaded_at: Utc::now(),
        }
    }
}

/// Something that can produce a fresh snapshot on demand.
///
/// `load` runs on a blocking thread and may perform filesystem I/O.
pub trait SnapshotSource: Send + Sync + 'static {
    /// Produce a complete snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be built.
    fn load(&self) -> Result<Snapshot, LoadError>;
}

/// Loads snapshots from a content directory and an optional `site.yaml`.
#[derive(Clone, Debug)]
pub struct FsSnapshotSource {
    source_dir: PathBuf,
    builder: TreeBuilder,
    config_path: Option<PathBuf>,
    site: SiteConfig,
}

impl FsSnapshotSource {
    /// Source with fixed branding and the default descriptor.
    #[must_use]
    pub fn new(source_dir: impl Into<PathBuf>, site: SiteConfig) -> Self {
        Self {
            source_dir: source_dir.into(),
            builder: TreeBuilder::new(),
            config_path: None,
            site,
        }
    }

    /// Source described by a loaded configuration.
    ///
    /// When the configuration came from a file, branding is re-read from
    /// that file on every load.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            source_dir: config.content_resolved.source_dir.clone(),
            builder: TreeBuilder::new().with_descriptor(&config.content_resolved.descriptor),
            config_path: config.config_path.clone(),
            site: config.site.clone(),
        }
    }

    /// Re-read branding from `path` on every load.
    #[must_use]
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Use a custom tree builder.
    #[must_use]
    pub fn with_builder(mut self, builder: TreeBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Content root directory.
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }
}

impl SnapshotSource for FsSnapshotSource {
    fn load(&self) -> Result<Snapshot, LoadError> {
        let site = match &self.config_path {
            Some(path) => Config::load_site(path)?,
            None => self.site.clone(),
        };
        let root = self.builder.build_root(&self.source_dir)?;
        Ok(Snapshot::new(site, root))
    }
}
