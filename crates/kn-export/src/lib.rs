//! Static export of a keynote content tree.
//!
//! The exporter scans the source once and writes a self-contained site:
//!
//! ```text
//! {output}/
//! +-- index.html       # home page, static links
//! +-- folders.json     # serialized content tree
//! +-- decks/           # one mirror of the source tree per kind
//! |   +-- talks/
//! |       +-- .folder.yaml
//! |       +-- intro.md
//! |       +-- intro.html
//! +-- books/
//! +-- bundles/
//!     +-- api/         # bundle directory copied as is
//! ```
//!
//! Each mirror keeps the directory's classification descriptor, so scanning
//! a mirror with the same rules reproduces the tree for that kind.

mod exporter;

pub use exporter::{ExportError, ExportSummary, Exporter};
