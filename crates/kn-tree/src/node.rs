//! Content tree nodes.
//!
//! A [`Folder`] mirrors one directory of the content source; its
//! [`Entry`] values are the decks, books and bundles found there.
//! Filesystem locations are kept for reloading and export only and are
//! never serialized.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::kind::ContentKind;

/// Breadcrumb segment and name of the root folder.
pub const ROOT_SENTINEL: &str = "/";

/// Display title for a file or directory name.
#[must_use]
pub fn title_from_name(name: &str) -> String {
    name.replace('-', " ")
}

/// A leaf content item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Base name, without the document suffix for file-backed kinds.
    pub name: String,
    /// Name with separators replaced by spaces.
    pub title: String,
    /// Content kind.
    pub kind: ContentKind,
    /// Filesystem change time.
    pub created_at: DateTime<Utc>,
    /// Description taken from a leading markdown comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// File or directory name on disk.
    #[serde(skip)]
    source_name: String,
}

impl Entry {
    /// Create an entry.
    ///
    /// `source_name` is the name on disk (`intro.md` for a deck named `intro`).
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: ContentKind,
        created_at: DateTime<Utc>,
        source_name: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            title: title_from_name(&name),
            name,
            kind,
            created_at,
            description: None,
            source_name: source_name.into(),
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// File or directory name on disk.
    #[must_use]
    pub fn source_name(&self) -> &str {
        &self.source_name
    }
}

/// A directory node of the content tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    #[serde(skip)]
    path: PathBuf,
    /// Directory name ([`ROOT_SENTINEL`] for the root).
    pub name: String,
    /// Name with separators replaced by spaces.
    pub title: String,
    /// Names from the root (sentinel) down to this folder.
    pub breadcrumb: Vec<String>,
    /// Child folders in scan order.
    pub subfolders: Vec<Folder>,
    /// Entries, newest first.
    pub entries: Vec<Entry>,
}

impl Folder {
    /// Create an empty folder.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, breadcrumb: Vec<String>) -> Self {
        let name = name.into();
        Self {
            path: path.into(),
            title: title_from_name(&name),
            name,
            breadcrumb,
            subfolders: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Directory this folder was scanned from.
    #[must_use]
    pub fn fs_path(&self) -> &Path {
        &self.path
    }

    /// On-disk location of one of this folder's entries.
    #[must_use]
    pub fn entry_path(&self, entry: &Entry) -> PathBuf {
        self.path.join(entry.source_name())
    }

    /// Child folder with the given name.
    #[must_use]
    pub fn subfolder(&self, name: &str) -> Option<&Folder> {
        self.subfolders.iter().find(|f| f.name == name)
    }

    /// Entry with the given name and kind.
    #[must_use]
    pub fn entry(&self, name: &str, kind: ContentKind) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|e| e.kind == kind && e.name == name)
    }

    /// Breadcrumb below the root sentinel, joined with `/` (empty for the root).
    #[must_use]
    pub fn url_path(&self) -> String {
        self.breadcrumb.get(1..).unwrap_or_default().join("/")
    }

    /// Depth-first iterator over this folder and all descendants.
    pub fn iter(&self) -> impl Iterator<Item = &Folder> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let folder = stack.pop()?;
            stack.extend(folder.subfolders.iter().rev());
            Some(folder)
        })
    }
}

/// JSON document describing a whole content tree (`folders.json`).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderListing<'a> {
    /// Root of the tree.
    pub root_folder: &'a Folder,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn crumb(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_owned()).collect()
    }

    fn sample_tree() -> Folder {
        let mut root = Folder::new("/src", ROOT_SENTINEL, crumb(&["/"]));
        let mut talks = Folder::new("/src/talks", "talks", crumb(&["/", "talks"]));
        talks.subfolders.push(Folder::new(
            "/src/talks/2024",
            "2024",
            crumb(&["/", "talks", "2024"]),
        ));
        root.subfolders.push(talks);
        root.subfolders
            .push(Folder::new("/src/misc", "misc", crumb(&["/", "misc"])));
        root.entries.push(Entry::new(
            "getting-started",
            ContentKind::Book,
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            "getting-started.md",
        ));
        root
    }

    #[test]
    fn test_title_replaces_dashes() {
        assert_eq!(title_from_name("what-is-a-deck"), "what is a deck");
        assert_eq!(title_from_name("plain"), "plain");
    }

    #[test]
    fn test_entry_path_uses_source_name() {
        let root = sample_tree();
        let entry = &root.entries[0];
        assert_eq!(
            root.entry_path(entry),
            PathBuf::from("/src/getting-started.md")
        );
    }

    #[test]
    fn test_entry_lookup_is_kind_restricted() {
        let root = sample_tree();
        assert!(root.entry("getting-started", ContentKind::Book).is_some());
        assert!(root.entry("getting-started", ContentKind::Deck).is_none());
    }

    #[test]
    fn test_url_path() {
        let root = sample_tree();
        assert_eq!(root.url_path(), "");
        let nested = root.subfolder("talks").unwrap().subfolder("2024").unwrap();
        assert_eq!(nested.url_path(), "talks/2024");
    }

    #[test]
    fn test_iter_is_depth_first() {
        let root = sample_tree();
        let names: Vec<_> = root.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["/", "talks", "2024", "misc"]);
    }

    #[test]
    fn test_listing_hides_filesystem_paths() {
        let root = sample_tree();
        let json = serde_json::to_value(FolderListing { root_folder: &root }).unwrap();

        let folder = &json["rootFolder"];
        assert_eq!(folder["name"], "/");
        assert_eq!(folder["breadcrumb"], serde_json::json!(["/"]));
        assert_eq!(folder["subfolders"][0]["title"], "talks");
        assert_eq!(folder["entries"][0]["title"], "getting started");
        assert_eq!(folder["entries"][0]["kind"], "book");
        assert!(folder["entries"][0]["createdAt"].is_string());
        assert!(folder.get("path").is_none());
        assert!(folder["entries"][0].get("sourceName").is_none());
        assert!(folder["entries"][0].get("description").is_none());
    }
}
