//! Per-directory classification descriptors.
//!
//! A descriptor (by default `.folder.yaml`) names which children of its
//! directory are decks, books or bundles, and which are ignored:
//!
//! ```yaml
//! deck: [intro.md, roadmap.md]
//! book: [handbook.md]
//! bundle: [api-reference]
//! ignore: [drafts]
//! ```

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::Path;

use serde::Deserialize;

use crate::kind::ContentKind;

/// Descriptor file as written on disk.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Descriptor {
    deck: Vec<String>,
    book: Vec<String>,
    bundle: Vec<String>,
    ignore: Vec<String>,
}

impl Descriptor {
    fn names(&self, kind: ContentKind) -> &[String] {
        match kind {
            ContentKind::Deck => &self.deck,
            ContentKind::Book => &self.book,
            ContentKind::Bundle => &self.bundle,
        }
    }
}

/// Classification lookup table for one directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassificationRules {
    kinds: HashMap<String, ContentKind>,
    ignore: HashSet<String>,
}

impl ClassificationRules {
    /// Load rules from a descriptor file.
    ///
    /// A missing, unreadable or malformed descriptor yields empty rules.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Unreadable descriptor");
                return Self::default();
            }
        };

        match Self::parse(&content) {
            Ok(rules) => rules,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Malformed descriptor");
                Self::default()
            }
        }
    }

    /// Parse rules from descriptor YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed.
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let descriptor: Descriptor = serde_yaml::from_str(content)?;
        Ok(Self::from_descriptor(&descriptor))
    }

    fn from_descriptor(descriptor: &Descriptor) -> Self {
        let mut kinds = HashMap::new();
        for kind in ContentKind::CLASSIFICATION_ORDER {
            for name in descriptor.names(kind) {
                // Earlier kinds in the classification order win.
                kinds.entry(name.clone()).or_insert(kind);
            }
        }

        Self {
            kinds,
            ignore: descriptor.ignore.iter().cloned().collect(),
        }
    }

    /// Whether a child name is on the ignore list.
    #[must_use]
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore.contains(name)
    }

    /// Kind a child name is classified as, if any.
    #[must_use]
    pub fn classify(&self, name: &str) -> Option<ContentKind> {
        self.kinds.get(name).copied()
    }

    /// Whether the rules classify or ignore nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty() && self.ignore.is_empty()
    }
}
