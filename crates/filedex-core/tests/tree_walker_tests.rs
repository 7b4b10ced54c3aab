//! Integration tests for the folder-spec tree walkers.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use filedex_core::tree::{DeleteMode, FolderSpec, create_tree, delete_tree, delete_tree_wildcard};
use proptest::prelude::*;
use tempfile::TempDir;
use walkdir::WalkDir;

/// All directories under `base`, relative to it, sorted.
fn dir_snapshot(base: &Path) -> BTreeSet<PathBuf> {
    WalkDir::new(base)
        .min_depth(1)
        .into_iter()
        .map(|entry| entry.expect("walk base"))
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| entry.path().strip_prefix(base).unwrap().to_path_buf())
        .collect()
}

fn spec(json: &str) -> FolderSpec {
    FolderSpec::from_json(json).expect("valid spec json")
}

#[test]
fn test_create_tree_concrete_scenario() {
    let tmp = TempDir::new().unwrap();
    create_tree(tmp.path(), &spec(r#"["a", ["b", "c"], "d"]"#)).unwrap();

    let expected: BTreeSet<PathBuf> = ["a", "a/b", "a/c", "d"]
        .iter()
        .map(PathBuf::from)
        .collect();
    assert_eq!(dir_snapshot(tmp.path()), expected);
}

#[test]
fn test_create_tree_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let s = spec(r#"["a", ["b", ["deep"], "c"], "d"]"#);

    create_tree(tmp.path(), &s).unwrap();
    let first = dir_snapshot(tmp.path());

    create_tree(tmp.path(), &s).unwrap();
    assert_eq!(dir_snapshot(tmp.path()), first);
}

#[test]
fn test_create_tree_leaves_existing_content_alone() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("a")).unwrap();
    fs::write(tmp.path().join("a/file.txt"), b"payload").unwrap();

    create_tree(tmp.path(), &spec(r#"["a", ["b"]]"#)).unwrap();

    assert_eq!(fs::read(tmp.path().join("a/file.txt")).unwrap(), b"payload");
    assert!(tmp.path().join("a/b").is_dir());
}

#[test]
fn test_delete_tree_force_removes_created_tree() {
    let tmp = TempDir::new().unwrap();
    let s = spec(r#"["a", ["b", "c"], "d"]"#);
    create_tree(tmp.path(), &s).unwrap();

    delete_tree(tmp.path(), &s, DeleteMode::Force).unwrap();

    assert!(dir_snapshot(tmp.path()).is_empty());
    assert!(tmp.path().is_dir());
}

#[test]
fn test_delete_tree_preserve_concrete_scenario() {
    // B/p/q empty: q goes, then p goes because the group was the tail.
    let tmp = TempDir::new().unwrap();
    let s = spec(r#"["p", ["q"]]"#);
    create_tree(tmp.path(), &s).unwrap();

    delete_tree(tmp.path(), &s, DeleteMode::Preserve).unwrap();
    assert!(!tmp.path().join("p").exists());
}

#[test]
fn test_delete_tree_preserve_keeps_parent_with_survivors() {
    let tmp = TempDir::new().unwrap();
    let s = spec(r#"["p", ["q"]]"#);
    create_tree(tmp.path(), &s).unwrap();
    fs::write(tmp.path().join("p/other.txt"), b"keep me").unwrap();

    delete_tree(tmp.path(), &s, DeleteMode::Preserve).unwrap();

    assert!(!tmp.path().join("p/q").exists());
    assert!(tmp.path().join("p/other.txt").exists());
}

#[test]
fn test_delete_tree_preserve_skips_non_empty_leaf() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("p")).unwrap();
    fs::write(tmp.path().join("p/file.txt"), b"").unwrap();

    delete_tree(tmp.path(), &spec(r#"["p"]"#), DeleteMode::Preserve).unwrap();
    assert!(tmp.path().join("p").is_dir());

    delete_tree(tmp.path(), &spec(r#"["p"]"#), DeleteMode::Force).unwrap();
    assert!(!tmp.path().join("p").exists());
}

#[test]
fn test_delete_tree_preserve_keeps_non_tail_parent() {
    // ["p", ["q"], "r"]: the group is not the tail element, so p survives
    // even though it ends up empty.
    let tmp = TempDir::new().unwrap();
    let s = spec(r#"["p", ["q"], "r"]"#);
    create_tree(tmp.path(), &s).unwrap();

    delete_tree(tmp.path(), &s, DeleteMode::Preserve).unwrap();

    assert!(tmp.path().join("p").is_dir());
    assert!(!tmp.path().join("p/q").exists());
    assert!(!tmp.path().join("r").exists());
}

#[test]
fn test_delete_tree_skips_missing_paths() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("real")).unwrap();

    delete_tree(
        tmp.path(),
        &spec(r#"["ghost", ["deeper"], "real"]"#),
        DeleteMode::Force,
    )
    .unwrap();

    assert!(!tmp.path().join("real").exists());
}

#[test]
fn test_wildcard_removes_children_of_base_except_kept() {
    let tmp = TempDir::new().unwrap();
    for name in ["a", "b", "c"] {
        fs::create_dir(tmp.path().join(name)).unwrap();
    }
    fs::write(tmp.path().join("file.txt"), b"").unwrap();

    delete_tree_wildcard(tmp.path(), &spec(r#"["*", ["a"]]"#)).unwrap();

    assert!(tmp.path().join("a").is_dir());
    assert!(!tmp.path().join("b").exists());
    assert!(!tmp.path().join("c").exists());
    // files are untouched by the wildcard
    assert!(tmp.path().join("file.txt").exists());
}

#[test]
fn test_wildcard_removes_siblings_of_cursor() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("a/x")).unwrap();
    fs::create_dir_all(tmp.path().join("a/y")).unwrap();
    fs::create_dir_all(tmp.path().join("a/z")).unwrap();

    // descend into a/x, then remove x's siblings
    delete_tree_wildcard(tmp.path(), &spec(r#"["a", "x", "*"]"#)).unwrap();

    assert!(tmp.path().join("a/x").is_dir());
    assert!(!tmp.path().join("a/y").exists());
    assert!(!tmp.path().join("a/z").exists());
}

#[test]
fn test_wildcard_parent_token_moves_cursor_up() {
    let tmp = TempDir::new().unwrap();
    for name in ["a", "b", "c"] {
        fs::create_dir(tmp.path().join(name)).unwrap();
    }
    fs::create_dir(tmp.path().join("a/sub")).unwrap();

    // a -> a/sub -> back to a; "*" then works on a's siblings
    delete_tree_wildcard(tmp.path(), &spec(r#"["a", "sub", "..", "*", ["b"]]"#)).unwrap();

    assert!(tmp.path().join("a").is_dir());
    assert!(tmp.path().join("b").is_dir());
    assert!(!tmp.path().join("c").exists());
}

#[test]
fn test_wildcard_never_escapes_base() {
    let outer = TempDir::new().unwrap();
    let base = outer.path().join("base");
    fs::create_dir(&base).unwrap();
    fs::create_dir(outer.path().join("sibling_of_base")).unwrap();
    fs::create_dir(base.join("inner")).unwrap();

    // ".." at the base stays put; "*" then targets the base's children
    delete_tree_wildcard(&base, &spec(r#"["..", "*"]"#)).unwrap();

    assert!(outer.path().join("sibling_of_base").is_dir());
    assert!(base.is_dir());
    assert!(!base.join("inner").exists());
}

// ---- property coverage ----

#[derive(Debug, Clone)]
struct GenEntry {
    name: String,
    children: Vec<GenEntry>,
}

fn to_nodes(entries: &[GenEntry]) -> Vec<serde_json::Value> {
    let mut nodes = Vec::new();
    for entry in entries {
        nodes.push(serde_json::Value::String(entry.name.clone()));
        if !entry.children.is_empty() {
            nodes.push(serde_json::Value::Array(to_nodes(&entry.children)));
        }
    }
    nodes
}

fn gen_entries() -> impl Strategy<Value = Vec<GenEntry>> {
    let name = "[a-z]{1,6}";
    let leaf = name.prop_map(|name| GenEntry {
        name,
        children: Vec::new(),
    });
    prop::collection::vec(
        leaf.prop_recursive(3, 12, 3, |inner| {
            ("[a-z]{1,6}", prop::collection::vec(inner, 0..3)).prop_map(|(name, children)| {
                GenEntry { name, children }
            })
        }),
        1..4,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_create_is_idempotent_and_force_delete_inverts(entries in gen_entries()) {
        let tmp = TempDir::new().unwrap();
        let json = serde_json::Value::Array(to_nodes(&entries)).to_string();
        let s = FolderSpec::from_json(&json).unwrap();

        create_tree(tmp.path(), &s).unwrap();
        let first = dir_snapshot(tmp.path());

        create_tree(tmp.path(), &s).unwrap();
        prop_assert_eq!(dir_snapshot(tmp.path()), first);

        delete_tree(tmp.path(), &s, DeleteMode::Force).unwrap();
        prop_assert!(dir_snapshot(tmp.path()).is_empty());
        prop_assert!(tmp.path().is_dir());
    }
}
