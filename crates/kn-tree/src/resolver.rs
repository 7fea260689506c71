//! URL path resolution against a content tree.
//!
//! A content URL has the shape `/{kind}s/{folder}/.../{entry}`. The kind
//! prefix selects the [`ContentKind`], the middle segments walk subfolders
//! from the root, and the last segment names an entry of that kind.
//! Segments are compared exactly; there is no case folding or partial
//! matching.

use crate::kind::ContentKind;
use crate::node::{Entry, Folder};

/// A successfully resolved content URL.
#[derive(Clone, Copy, Debug)]
pub struct Resolved<'a> {
    /// Kind selected by the URL prefix.
    pub kind: ContentKind,
    /// The addressed entry.
    pub entry: &'a Entry,
    /// Folder containing the entry.
    pub folder: &'a Folder,
}

impl Resolved<'_> {
    /// Breadcrumb from the root sentinel down to the containing folder.
    #[must_use]
    pub fn breadcrumb(&self) -> &[String] {
        &self.folder.breadcrumb
    }

    /// Path of the entry below its kind prefix (e.g. `talks/2024/intro`).
    #[must_use]
    pub fn relative_path(&self) -> String {
        let folder_path = self.folder.url_path();
        if folder_path.is_empty() {
            self.entry.name.clone()
        } else {
            format!("{folder_path}/{}", self.entry.name)
        }
    }
}

/// Split a URL path into its content kind and the remainder after the prefix.
#[must_use]
pub fn split_kind_prefix(url_path: &str) -> Option<(ContentKind, &str)> {
    ContentKind::ALL
        .into_iter()
        .find_map(|kind| url_path.strip_prefix(kind.url_prefix()).map(|rest| (kind, rest)))
}

/// Resolve a decoded URL path to an entry of `root`.
///
/// Returns `None` when the prefix is unknown or any hop is missing.
#[must_use]
pub fn resolve<'a>(url_path: &str, root: &'a Folder) -> Option<Resolved<'a>> {
    let (kind, rest) = split_kind_prefix(url_path)?;

    let segments: Vec<&str> = rest.split('/').collect();
    let (last, parents) = segments.split_last()?;

    let mut folder = root;
    for segment in parents {
        folder = folder.subfolder(segment)?;
    }

    let entry = folder.entry(last, kind)?;
    Some(Resolved {
        kind,
        entry,
        folder,
    })
}

/// Whether a decoded URL path addresses a file that belongs to an entry.
///
/// Under a document prefix only the entry's own source file qualifies
/// (`/decks/talks/intro.md`). Under `/bundles/` any path below a bundle
/// directory qualifies. Ignored, hidden and unclassified files never do.
#[must_use]
pub fn is_source_path(url_path: &str, root: &Folder) -> bool {
    let Some((kind, rest)) = split_kind_prefix(url_path) else {
        return false;
    };
    let segments: Vec<&str> = rest.split('/').collect();
    if segments.iter().any(|s| matches!(*s, "." | "..")) {
        return false;
    }
    let Some((last, parents)) = segments.split_last() else {
        return false;
    };

    let mut folder = root;
    if kind.is_document() {
        for segment in parents {
            let Some(next) = folder.subfolder(segment) else {
                return false;
            };
            folder = next;
        }
        return folder
            .entries
            .iter()
            .any(|e| e.kind == kind && e.source_name() == *last);
    }

    for segment in parents {
        if folder.entry(segment, kind).is_some() {
            return true;
        }
        let Some(next) = folder.subfolder(segment) else {
            return false;
        };
        folder = next;
    }
    false
}
