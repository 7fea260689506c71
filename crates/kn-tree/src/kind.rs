//! Content kinds and their URL prefixes.

use serde::{Deserialize, Serialize};

/// The kind of a leaf content item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Slide deck backed by a single markdown file.
    Deck,
    /// Long-form document backed by a single markdown file.
    Book,
    /// Pre-built multi-page document backed by a directory.
    Bundle,
}

impl ContentKind {
    /// Every kind, in URL routing order.
    pub const ALL: [Self; 3] = [Self::Deck, Self::Book, Self::Bundle];

    /// Order in which classification lists are consulted.
    ///
    /// A name listed under several kinds gets the first kind here.
    pub const CLASSIFICATION_ORDER: [Self; 3] = [Self::Book, Self::Bundle, Self::Deck];

    /// Lowercase kind name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deck => "deck",
            Self::Book => "book",
            Self::Bundle => "bundle",
        }
    }

    /// URL segment all content of this kind lives under (`decks`, `books`, ...).
    #[must_use]
    pub fn url_segment(self) -> &'static str {
        match self {
            Self::Deck => "decks",
            Self::Book => "books",
            Self::Bundle => "bundles",
        }
    }

    /// URL prefix including both slashes (`/decks/`, ...).
    #[must_use]
    pub fn url_prefix(self) -> &'static str {
        match self {
            Self::Deck => "/decks/",
            Self::Book => "/books/",
            Self::Bundle => "/bundles/",
        }
    }

    /// Whether this kind is backed by a single document file.
    #[must_use]
    pub fn is_document(self) -> bool {
        matches!(self, Self::Deck | Self::Book)
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
