//! Content tree building and path resolution for keynote.
//!
//! This crate provides:
//! - [`TreeBuilder`]: scans a content directory into a [`Folder`] tree,
//!   classifying children with per-directory [`ClassificationRules`]
//! - [`resolve`]: maps a content URL such as `/books/guides/setup` onto an
//!   [`Entry`] of that tree
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//! use kn_tree::{TreeBuilder, resolve};
//!
//! let root = TreeBuilder::new().build_root(Path::new("src"))?;
//! if let Some(found) = resolve("/decks/intro", &root) {
//!     println!("{}", found.entry.title);
//! }
//! # Ok(())
//! # }
//! ```

mod builder;
mod kind;
mod node;
mod resolver;
mod rules;

pub use builder::{BuildError, DEFAULT_DESCRIPTOR, DEFAULT_DOCUMENT_EXTENSION, TreeBuilder};
pub use kind::ContentKind;
pub use node::{Entry, Folder, FolderListing, ROOT_SENTINEL, title_from_name};
pub use resolver::{Resolved, is_source_path, resolve, split_kind_prefix};
pub use rules::ClassificationRules;
