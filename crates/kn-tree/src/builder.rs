//! Content tree construction by filesystem walking.
//!
//! Each directory is scanned in name order. Children are classified by the
//! directory's descriptor (see [`ClassificationRules`]):
//!
//! - hidden (`.`-prefixed) and ignored names are dropped first
//! - directories listed as bundles become [`ContentKind::Bundle`] entries and
//!   are not descended into; unlisted directories become subfolders
//! - markdown files listed as decks or books become entries
//! - everything else is dropped with a log line
//!
//! Problems below the root never abort a build; the affected child is
//! skipped and the rest of the tree is still produced.

use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::kind::ContentKind;
use crate::node::{Entry, Folder, ROOT_SENTINEL};
use crate::rules::ClassificationRules;

/// Marker prefix for hidden files and directories.
const HIDDEN_PREFIX: char = '.';

/// Default classification descriptor filename.
pub const DEFAULT_DESCRIPTOR: &str = ".folder.yaml";

/// Default document source extension.
pub const DEFAULT_DOCUMENT_EXTENSION: &str = "md";

/// Error returned when the content root cannot be scanned.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Root directory could not be read.
    #[error("Content directory not readable: {}: {source}", path.display())]
    Unreadable {
        /// Root directory.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Root path exists but is not a directory.
    #[error("Content root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

/// Builds [`Folder`] trees from a content directory.
#[derive(Clone, Debug)]
pub struct TreeBuilder {
    descriptor: String,
    document_extension: String,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self {
            descriptor: DEFAULT_DESCRIPTOR.to_owned(),
            document_extension: DEFAULT_DOCUMENT_EXTENSION.to_owned(),
        }
    }
}

impl TreeBuilder {
    /// Create a builder with the default descriptor name and `.md` documents.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different descriptor filename.
    #[must_use]
    pub fn with_descriptor(mut self, descriptor: impl Into<String>) -> Self {
        self.descriptor = descriptor.into();
        self
    }

    /// Descriptor filename consulted in every directory.
    #[must_use]
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Build the tree rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` is not a readable directory.
    pub fn build_root(&self, dir: &Path) -> Result<Folder, BuildError> {
        let unreadable = |source| BuildError::Unreadable {
            path: dir.to_path_buf(),
            source,
        };

        let metadata = fs::metadata(dir).map_err(unreadable)?;
        if !metadata.is_dir() {
            return Err(BuildError::NotADirectory(dir.to_path_buf()));
        }
        fs::read_dir(dir).map_err(unreadable)?;

        Ok(self.build(dir, ROOT_SENTINEL, vec![ROOT_SENTINEL.to_owned()]))
    }

    /// Build the folder for `dir`, recursing into unclassified subdirectories.
    ///
    /// An unreadable directory yields an empty folder.
    #[must_use]
    pub fn build(&self, dir: &Path, name: &str, breadcrumb: Vec<String>) -> Folder {
        let mut folder = Folder::new(dir, name, breadcrumb);
        let rules = ClassificationRules::load(&dir.join(&self.descriptor));

        let children = match read_children(dir) {
            Ok(children) => children,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "Skipping unreadable directory");
                return folder;
            }
        };

        for (child_name, child_path) in children {
            if child_name.starts_with(HIDDEN_PREFIX) {
                continue;
            }
            if rules.is_ignored(&child_name) {
                tracing::debug!(path = %child_path.display(), "Ignored by descriptor");
                continue;
            }

            let kind = rules.classify(&child_name);

            // Follows symlinks; the content tree is assumed to be acyclic.
            let metadata = match fs::metadata(&child_path) {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::warn!(path = %child_path.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            if metadata.is_dir() {
                match kind {
                    Some(ContentKind::Bundle) => {
                        if let Some(entry) = bundle_entry(&child_name, &child_path, &metadata) {
                            push_entry(&mut folder, entry);
                        }
                    }
                    Some(kind) => {
                        tracing::warn!(
                            path = %child_path.display(),
                            %kind,
                            "Directory ignored because it is classified as a document"
                        );
                    }
                    None => {
                        let mut sub_breadcrumb = folder.breadcrumb.clone();
                        sub_breadcrumb.push(child_name.clone());
                        let subfolder = self.build(&child_path, &child_name, sub_breadcrumb);
                        folder.subfolders.push(subfolder);
                    }
                }
            } else if metadata.is_file() {
                if let Some(entry) = self.document_entry(&child_name, &child_path, &metadata, kind) {
                    push_entry(&mut folder, entry);
                }
            }
        }

        sort_entries(&mut folder.entries);
        folder
    }

    /// Entry for a regular file, if it is a classified document.
    fn document_entry(
        &self,
        file_name: &str,
        path: &Path,
        metadata: &fs::Metadata,
        kind: Option<ContentKind>,
    ) -> Option<Entry> {
        let Some(name) = self.strip_document_extension(file_name) else {
            tracing::debug!(path = %path.display(), "File ignored because its type is not supported");
            return None;
        };

        let kind = match kind {
            Some(kind) if kind.is_document() => kind,
            Some(kind) => {
                tracing::warn!(
                    path = %path.display(),
                    %kind,
                    "File ignored because it is classified as a directory kind"
                );
                return None;
            }
            None => {
                tracing::debug!(path = %path.display(), "File ignored because it is not classified");
                return None;
            }
        };

        let created_at = match change_time(metadata) {
            Ok(time) => time,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping file without change time");
                return None;
            }
        };

        Some(Entry::new(name, kind, created_at, file_name).with_description(read_description(path)))
    }

    /// Document name without its extension, or `None` if it has another type.
    fn strip_document_extension<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        let stem = file_name
            .strip_suffix(self.document_extension.as_str())?
            .strip_suffix('.')?;
        (!stem.is_empty()).then_some(stem)
    }
}

/// Entry for a bundle directory.
fn bundle_entry(name: &str, path: &Path, metadata: &fs::Metadata) -> Option<Entry> {
    match change_time(metadata) {
        Ok(created_at) => Some(Entry::new(name, ContentKind::Bundle, created_at, name)),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Skipping bundle without change time");
            None
        }
    }
}

/// Append an entry unless its name is already taken in this folder.
fn push_entry(folder: &mut Folder, entry: Entry) {
    if folder.entries.iter().any(|e| e.name == entry.name) {
        tracing::warn!(
            path = %folder.entry_path(&entry).display(),
            name = %entry.name,
            "Entry ignored because its name is already used"
        );
        return;
    }
    folder.entries.push(entry);
}

/// Sort entries newest first, keeping scan order for equal times.
pub(crate) fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Directory children as (name, path) pairs, sorted by name.
///
/// Children with non-UTF-8 names cannot be addressed by URL and are skipped.
fn read_children(dir: &Path) -> io::Result<Vec<(String, PathBuf)>> {
    let mut children = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        match entry.file_name().into_string() {
            Ok(name) => children.push((name, entry.path())),
            Err(raw) => {
                tracing::warn!(name = ?raw, "Skipping entry with non UTF-8 name");
            }
        }
    }
    children.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(children)
}

/// Inode change time of a file.
#[cfg(unix)]
fn change_time(metadata: &fs::Metadata) -> io::Result<DateTime<Utc>> {
    use std::os::unix::fs::MetadataExt;

    let nanos = u32::try_from(metadata.ctime_nsec()).unwrap_or(0);
    DateTime::from_timestamp(metadata.ctime(), nanos)
        .ok_or_else(|| io::Error::other("change time out of range"))
}

/// Modification time of a file (no change time outside Unix).
#[cfg(not(unix))]
fn change_time(metadata: &fs::Metadata) -> io::Result<DateTime<Utc>> {
    metadata.modified().map(DateTime::from)
}

/// Description from a first line of the form `[//]: # (text)`.
fn read_description(path: &Path) -> Option<String> {
    let file = fs::File::open(path).ok()?;
    let mut line = String::new();
    BufReader::new(file).read_line(&mut line).ok()?;
    parse_description(line.trim_end())
}

fn parse_description(line: &str) -> Option<String> {
    let text = line.strip_prefix("[//]: # (")?.strip_suffix(')')?.trim();
    (!text.is_empty()).then(|| text.to_owned())
}
