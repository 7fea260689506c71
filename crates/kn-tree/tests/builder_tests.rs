//! Builder behavior against real directory fixtures.

use std::fs;
use std::path::Path;

use kn_tree::{BuildError, ContentKind, Folder, TreeBuilder, resolve};
use pretty_assertions::assert_eq;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn entry_names(folder: &Folder) -> Vec<&str> {
    let mut names: Vec<_> = folder.entries.iter().map(|e| e.name.as_str()).collect();
    names.sort_unstable();
    names
}

/// Root with one deck, one book, one bundle and a subfolder holding one deck.
fn sample_source() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        &root.join(".folder.yaml"),
        "deck: [what-is-a-deck.md]\nbook: [what-is-a-book.md]\nbundle: [this-is-a-bundle]\n",
    );
    write(&root.join("what-is-a-deck.md"), "# Deck\n\n---\n\nSlide two");
    write(&root.join("what-is-a-book.md"), "[//]: # (All about books)\n# Book");
    write(&root.join("this-is-a-bundle/index.html"), "<h1>Bundle</h1>");
    write(&root.join("talks/.folder.yaml"), "deck: [rust-intro.md]\n");
    write(&root.join("talks/rust-intro.md"), "# Rust");
    dir
}

#[test]
fn test_build_sample_tree() {
    let source = sample_source();
    let root = TreeBuilder::new().build_root(source.path()).unwrap();

    assert_eq!(root.name, "/");
    assert_eq!(root.breadcrumb, vec!["/".to_owned()]);
    assert_eq!(root.subfolders.len(), 1);
    assert_eq!(
        entry_names(&root),
        vec!["this-is-a-bundle", "what-is-a-book", "what-is-a-deck"]
    );

    let talks = &root.subfolders[0];
    assert_eq!(talks.name, "talks");
    assert_eq!(talks.breadcrumb, vec!["/".to_owned(), "talks".to_owned()]);
    assert_eq!(entry_names(talks), vec!["rust-intro"]);
    assert!(talks.subfolders.is_empty());
}

#[test]
fn test_entry_fields() {
    let source = sample_source();
    let root = TreeBuilder::new().build_root(source.path()).unwrap();

    let book = root.entry("what-is-a-book", ContentKind::Book).unwrap();
    assert_eq!(book.title, "what is a book");
    assert_eq!(book.source_name(), "what-is-a-book.md");
    assert_eq!(book.description.as_deref(), Some("All about books"));
    assert_eq!(root.entry_path(book), source.path().join("what-is-a-book.md"));

    let bundle = root.entry("this-is-a-bundle", ContentKind::Bundle).unwrap();
    assert_eq!(bundle.source_name(), "this-is-a-bundle");
    assert!(bundle.description.is_none());
}

#[test]
fn test_breadcrumb_tracks_depth() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("a/b/c/.folder.yaml"), "deck: [x.md]\n");
    write(&dir.path().join("a/b/c/x.md"), "# X");
    write(&dir.path().join("a/d/empty.txt"), "");

    let root = TreeBuilder::new().build_root(dir.path()).unwrap();

    fn check(folder: &Folder, depth: usize) {
        // The root sentinel occupies the first breadcrumb slot.
        assert_eq!(folder.breadcrumb.len(), depth + 1);
        assert_eq!(folder.breadcrumb.last(), Some(&folder.name));
        for sub in &folder.subfolders {
            assert_eq!(&sub.breadcrumb[..depth + 1], &folder.breadcrumb[..]);
            check(sub, depth + 1);
        }
    }
    check(&root, 0);
    assert_eq!(root.iter().count(), 5);
}

#[test]
fn test_entries_sorted_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    write(
        &dir.path().join(".folder.yaml"),
        "deck: [first.md, second.md, third.md]\n",
    );
    for name in ["first.md", "second.md", "third.md"] {
        write(&dir.path().join(name), "# Slide");
        std::thread::sleep(std::time::Duration::from_millis(20));
    }

    let root = TreeBuilder::new().build_root(dir.path()).unwrap();

    assert_eq!(root.entries.len(), 3);
    for pair in root.entries.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }
}

#[test]
fn test_book_file_yields_single_entry() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join(".folder.yaml"), "book: [x.md]\n");
    write(&dir.path().join("x.md"), "# X");

    let root = TreeBuilder::new().build_root(dir.path()).unwrap();

    assert_eq!(root.entries.len(), 1);
    assert_eq!(root.entries[0].name, "x");
    assert_eq!(root.entries[0].kind, ContentKind::Book);
}

#[test]
fn test_bundle_is_not_descended() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join(".folder.yaml"), "bundle: [manual]\n");
    write(&dir.path().join("manual/.folder.yaml"), "deck: [inner.md]\n");
    write(&dir.path().join("manual/inner.md"), "# Inner");
    write(&dir.path().join("manual/chapter/page.html"), "<p>page</p>");

    let root = TreeBuilder::new().build_root(dir.path()).unwrap();

    assert!(root.subfolders.is_empty());
    assert_eq!(root.entries.len(), 1);
    assert_eq!(root.entries[0].kind, ContentKind::Bundle);
    assert_eq!(root.entries[0].name, "manual");
}

#[test]
fn test_ignore_wins_over_classification() {
    let dir = tempfile::tempdir().unwrap();
    write(
        &dir.path().join(".folder.yaml"),
        "deck: [draft.md]\nbook: [notes.md]\nbundle: [site]\nignore: [draft.md, notes.md, site, scratch]\n",
    );
    write(&dir.path().join("draft.md"), "# Draft");
    write(&dir.path().join("notes.md"), "# Notes");
    write(&dir.path().join("site/index.html"), "");
    write(&dir.path().join("scratch/.folder.yaml"), "deck: [a.md]\n");
    write(&dir.path().join("scratch/a.md"), "# A");

    let root = TreeBuilder::new().build_root(dir.path()).unwrap();

    assert!(root.entries.is_empty());
    assert!(root.subfolders.is_empty());
}

#[test]
fn test_hidden_children_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write(
        &dir.path().join(".folder.yaml"),
        "deck: [.secret.md]\nbundle: [.cache]\n",
    );
    write(&dir.path().join(".secret.md"), "# Secret");
    write(&dir.path().join(".cache/index.html"), "");
    write(&dir.path().join(".git/HEAD"), "ref: refs/heads/main");

    let root = TreeBuilder::new().build_root(dir.path()).unwrap();

    assert!(root.entries.is_empty());
    assert!(root.subfolders.is_empty());
}

#[test]
fn test_invalid_classifications_are_dropped() {
    let dir = tempfile::tempdir().unwrap();
    write(
        &dir.path().join(".folder.yaml"),
        "deck: [slides, notes.txt]\nbook: [chapters]\nbundle: [single.md]\n",
    );
    // Directories claimed as documents.
    write(&dir.path().join("slides/a.md"), "# A");
    write(&dir.path().join("chapters/b.md"), "# B");
    // Unsupported suffix, file claimed as bundle, unclassified markdown.
    write(&dir.path().join("notes.txt"), "notes");
    write(&dir.path().join("single.md"), "# Single");
    write(&dir.path().join("unlisted.md"), "# Unlisted");

    let root = TreeBuilder::new().build_root(dir.path()).unwrap();

    assert!(root.entries.is_empty());
    assert!(root.subfolders.is_empty());
}

#[test]
fn test_duplicate_names_keep_first_in_scan_order() {
    let dir = tempfile::tempdir().unwrap();
    write(
        &dir.path().join(".folder.yaml"),
        "deck: [intro.md]\nbundle: [intro]\n",
    );
    write(&dir.path().join("intro/index.html"), "");
    write(&dir.path().join("intro.md"), "# Intro");

    let root = TreeBuilder::new().build_root(dir.path()).unwrap();

    // "intro" sorts before "intro.md", so the bundle is scanned first.
    assert_eq!(root.entries.len(), 1);
    assert_eq!(root.entries[0].kind, ContentKind::Bundle);
}

#[test]
fn test_missing_descriptor_yields_only_folders() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("a.md"), "# A");
    write(&dir.path().join("nested/b.md"), "# B");

    let root = TreeBuilder::new().build_root(dir.path()).unwrap();

    assert!(root.entries.is_empty());
    assert_eq!(root.subfolders.len(), 1);
    assert!(root.subfolders[0].entries.is_empty());
}

#[test]
fn test_malformed_descriptor_is_treated_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join(".folder.yaml"), "deck: [unclosed");
    write(&dir.path().join("a.md"), "# A");

    let root = TreeBuilder::new().build_root(dir.path()).unwrap();

    assert!(root.entries.is_empty());
}

#[test]
fn test_custom_descriptor_name() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("rules.yaml"), "deck: [a.md]\n");
    write(&dir.path().join(".folder.yaml"), "book: [a.md]\n");
    write(&dir.path().join("a.md"), "# A");

    let root = TreeBuilder::new()
        .with_descriptor("rules.yaml")
        .build_root(dir.path())
        .unwrap();

    assert_eq!(root.entries.len(), 1);
    assert_eq!(root.entries[0].kind, ContentKind::Deck);
}

#[test]
fn test_build_is_repeatable() {
    let source = sample_source();
    let builder = TreeBuilder::new();

    let first = builder.build_root(source.path()).unwrap();
    let second = builder.build_root(source.path()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_missing_root_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = TreeBuilder::new()
        .build_root(&dir.path().join("missing"))
        .unwrap_err();
    assert!(matches!(err, BuildError::Unreadable { .. }));
}

#[test]
fn test_file_root_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("file.md");
    write(&file, "# Not a dir");

    let err = TreeBuilder::new().build_root(&file).unwrap_err();
    assert!(matches!(err, BuildError::NotADirectory(_)));
}

#[test]
fn test_resolve_built_tree() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("a/.folder.yaml"), "book: [b.md]\ndeck: [c.md]\n");
    write(&dir.path().join("a/b.md"), "# B");
    write(&dir.path().join("a/c.md"), "# C");

    let root = TreeBuilder::new().build_root(dir.path()).unwrap();

    let found = resolve("/books/a/b", &root).unwrap();
    assert_eq!(found.entry.kind, ContentKind::Book);
    assert_eq!(found.breadcrumb(), ["/", "a"]);
    assert!(resolve("/decks/a/b", &root).is_none());
    assert!(resolve("/books/b", &root).is_none());
}
