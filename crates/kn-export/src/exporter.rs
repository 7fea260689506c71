//! Static site exporter.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use kn_config::{Config, SiteConfig, StaticPath};
use kn_render::{ContentPage, HomeData, LinkMode, entry_url, render_content, render_home};
use kn_tree::{BuildError, ContentKind, Folder, FolderListing, TreeBuilder};

/// Convert Duration to milliseconds as f64.
fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Error returned by the exporter. Any error aborts the export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Source directory could not be scanned.
    #[error(transparent)]
    Build(#[from] BuildError),
    /// Output would be written into the content it is generated from.
    #[error("Output directory {} is inside source directory {}", output.display(), source_dir.display())]
    OutputInsideSource {
        /// Output directory.
        output: PathBuf,
        /// Source directory.
        source_dir: PathBuf,
    },
    /// Filesystem operation failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Content tree could not be serialized.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

fn io_error(path: &Path, source: io::Error) -> ExportError {
    ExportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Counts of what an export produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Folders mirrored, summed over all kinds.
    pub folders: usize,
    /// Rendered HTML pages, including the home page.
    pub pages: usize,
    /// Deck and book sources copied.
    pub documents: usize,
    /// Bundle directories copied.
    pub bundles: usize,
    /// Extra static paths copied.
    pub static_paths: usize,
}

/// Writes a static copy of the site.
#[derive(Clone, Debug)]
pub struct Exporter {
    source_dir: PathBuf,
    output_dir: PathBuf,
    base_path: String,
    builder: TreeBuilder,
    static_paths: Vec<StaticPath>,
}

impl Exporter {
    /// Export `source_dir` into `output_dir`, served from `/`.
    #[must_use]
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            base_path: "/".to_owned(),
            builder: TreeBuilder::new(),
            static_paths: Vec::new(),
        }
    }

    /// Exporter described by a loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.content_resolved.source_dir,
            &config.export_resolved.output_dir,
        )
        .with_base_path(&config.export_resolved.base_path)
        .with_builder(TreeBuilder::new().with_descriptor(&config.content_resolved.descriptor))
        .with_static_paths(config.static_resolved.clone())
    }

    /// URL prefix the export will be served under.
    #[must_use]
    pub fn with_base_path(mut self, base_path: &str) -> Self {
        self.base_path = format!("{}/", base_path.trim_end_matches('/'));
        self
    }

    /// Use a custom tree builder.
    #[must_use]
    pub fn with_builder(mut self, builder: TreeBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Extra files and directories copied to the output root.
    #[must_use]
    pub fn with_static_paths(mut self, static_paths: Vec<StaticPath>) -> Self {
        self.static_paths = static_paths;
        self
    }

    /// Output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Scan the source and write the site.
    ///
    /// Previously exported `index.html`, `folders.json` and kind
    /// directories are removed first. Other files in the output directory
    /// are left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be scanned or any file
    /// cannot be written. Output may be partially written.
    pub fn export(&self, site: &SiteConfig) -> Result<ExportSummary, ExportError> {
        let start = Instant::now();

        let root = self.builder.build_root(&self.source_dir)?;
        self.prepare_output()?;

        let mut summary = ExportSummary::default();

        let home = render_home(&HomeData::new(
            site,
            LinkMode::Static {
                base_path: self.base_path.clone(),
            },
        ));
        write_file(&self.output_dir.join("index.html"), home.as_bytes())?;
        summary.pages += 1;

        let listing = serde_json::to_vec(&FolderListing { root_folder: &root })?;
        write_file(&self.output_dir.join("folders.json"), &listing)?;

        for kind in ContentKind::ALL {
            let dir = self.output_dir.join(kind.url_segment());
            self.export_folder(site, &root, kind, &dir, &mut summary)?;
        }

        for static_path in &self.static_paths {
            copy_path(&static_path.path, &self.output_dir.join(&static_path.name))?;
            summary.static_paths += 1;
        }

        tracing::info!(
            output = %self.output_dir.display(),
            pages = summary.pages,
            documents = summary.documents,
            bundles = summary.bundles,
            elapsed_ms = elapsed_ms(start),
            "Static site exported"
        );
        Ok(summary)
    }

    /// Create the output directory and remove output of earlier exports.
    fn prepare_output(&self) -> Result<(), ExportError> {
        let output = resolve_path(&self.output_dir).map_err(|e| io_error(&self.output_dir, e))?;
        let source_dir =
            fs::canonicalize(&self.source_dir).map_err(|e| io_error(&self.source_dir, e))?;
        if output.starts_with(&source_dir) {
            return Err(ExportError::OutputInsideSource { output, source_dir });
        }

        fs::create_dir_all(&self.output_dir).map_err(|e| io_error(&self.output_dir, e))?;

        let stale = ["index.html", "folders.json"]
            .into_iter()
            .chain(ContentKind::ALL.map(ContentKind::url_segment));
        for name in stale {
            remove_path(&self.output_dir.join(name))?;
        }
        Ok(())
    }

    /// Mirror `folder` into `dir`, writing the entries of one kind.
    fn export_folder(
        &self,
        site: &SiteConfig,
        folder: &Folder,
        kind: ContentKind,
        dir: &Path,
        summary: &mut ExportSummary,
    ) -> Result<(), ExportError> {
        fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
        summary.folders += 1;

        let descriptor = folder.fs_path().join(self.builder.descriptor());
        if descriptor.is_file() {
            copy_file(&descriptor, &dir.join(self.builder.descriptor()))?;
        }

        let crumbs = folder.breadcrumb.get(1..).unwrap_or_default();
        for entry in folder.entries.iter().filter(|e| e.kind == kind) {
            let source = folder.entry_path(entry);
            let target = dir.join(entry.source_name());

            if kind.is_document() {
                copy_file(&source, &target)?;
                summary.documents += 1;

                let page = render_content(&ContentPage {
                    site,
                    kind,
                    title: &entry.title,
                    source_url: entry_url(&self.base_path, kind, crumbs, entry.source_name(), ""),
                    home_url: self.base_path.clone(),
                });
                write_file(&dir.join(format!("{}.html", entry.name)), page.as_bytes())?;
                summary.pages += 1;
            } else {
                copy_dir(&source, &target)?;
                summary.bundles += 1;
            }
            tracing::debug!(path = %target.display(), %kind, "Exported entry");
        }

        for subfolder in &folder.subfolders {
            self.export_folder(site, subfolder, kind, &dir.join(&subfolder.name), summary)?;
        }
        Ok(())
    }
}

/// Canonical form of a path that may not exist yet.
///
/// The nearest existing ancestor is canonicalized (resolving symlinks and
/// `..`); the missing tail is then applied lexically.
fn resolve_path(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut existing = absolute.as_path();
    let mut tail = Vec::new();
    let mut resolved = loop {
        match fs::canonicalize(existing) {
            Ok(resolved) => break resolved,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let Some(parent) = existing.parent() else {
                    return Err(e);
                };
                if let Some(name) = existing.file_name() {
                    tail.push(name.to_owned());
                } else if existing.ends_with("..") {
                    tail.push("..".into());
                }
                existing = parent;
            }
            Err(e) => return Err(e),
        }
    };

    for name in tail.into_iter().rev() {
        if name == ".." {
            resolved.pop();
        } else {
            resolved.push(name);
        }
    }
    Ok(resolved)
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), ExportError> {
    fs::write(path, contents).map_err(|e| io_error(path, e))
}

fn copy_file(source: &Path, target: &Path) -> Result<(), ExportError> {
    fs::copy(source, target).map_err(|e| io_error(source, e))?;
    Ok(())
}

/// Copy a directory tree, following symlinks.
fn copy_dir(source: &Path, target: &Path) -> Result<(), ExportError> {
    fs::create_dir_all(target).map_err(|e| io_error(target, e))?;
    for entry in fs::read_dir(source).map_err(|e| io_error(source, e))? {
        let entry = entry.map_err(|e| io_error(source, e))?;
        let path = entry.path();
        let dest = target.join(entry.file_name());
        if path.is_dir() {
            copy_dir(&path, &dest)?;
        } else {
            copy_file(&path, &dest)?;
        }
    }
    Ok(())
}

/// Copy a file or directory, creating parent directories of `target`.
fn copy_path(source: &Path, target: &Path) -> Result<(), ExportError> {
    if source.is_dir() {
        return copy_dir(source, target);
    }
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }
    copy_file(source, target)
}

/// Remove a file or directory if it exists.
fn remove_path(path: &Path) -> Result<(), ExportError> {
    let result = match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => Err(e),
    };
    result.map_err(|e| io_error(path, e))
}
