//! Deleting a directory hierarchy described by a folder spec.
//!
//! The folder-spec notation has two deletion dialects. The primary one is
//! mode-based: [`delete_tree`] walks the parsed spec and removes
//! childless entries, either only-if-empty ([`DeleteMode::Preserve`]) or
//! recursively ([`DeleteMode::Force`]). The legacy dialect recognizes the
//! literal tokens `"*"` and `".."` and is exposed separately through
//! [`delete_tree_wildcard`]; the two grammars are never mixed in one call.
//!
//! Deletion is best-effort per entry: paths that do not exist (or are not
//! empty when emptiness is required) are skipped and logged, never raised,
//! so bulk cleanup cannot abort on partial absence. The base directory
//! itself is never deleted regardless of mode.

use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, instrument, warn};

use super::spec::{FolderEntry, FolderSpec, SpecNode, TreeError};

/// How aggressively the mode-based delete walker removes directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Remove a directory only when it is empty.
    Preserve,
    /// Remove a directory together with its contents.
    Force,
}

/// Error returned when parsing an invalid delete mode string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDeleteModeError(pub(crate) String);

impl fmt::Display for ParseDeleteModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown delete mode: {}", self.0)
    }
}

impl std::error::Error for ParseDeleteModeError {}

impl FromStr for DeleteMode {
    type Err = ParseDeleteModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preserve" => Ok(DeleteMode::Preserve),
            "force" => Ok(DeleteMode::Force),
            _ => Err(ParseDeleteModeError(s.to_owned())),
        }
    }
}

impl DeleteMode {
    /// Convert to the surface string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeleteMode::Preserve => "preserve",
            DeleteMode::Force => "force",
        }
    }
}

impl fmt::Display for DeleteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delete the directories described by `spec` under `base` (mode dialect).
///
/// Childless entries are removed outright: under [`DeleteMode::Preserve`]
/// only when empty, under [`DeleteMode::Force`] together with their
/// contents. An entry with children is recursed into first; afterwards the
/// emptied parent is removed under `Force`, or under `Preserve` only when
/// its group was the tail element of the flat sequence. A missing base
/// directory makes the whole call a logged no-op.
#[instrument(skip_all, fields(base = %base.display(), mode = %mode))]
pub fn delete_tree(base: &Path, spec: &FolderSpec, mode: DeleteMode) -> Result<(), TreeError> {
    let tree = spec.parse()?;
    if !base.is_dir() {
        debug!("base directory does not exist, nothing to delete");
        return Ok(());
    }
    delete_entries(base, base, &tree.entries, mode)
}

fn delete_entries(
    base: &Path,
    cursor: &Path,
    entries: &[FolderEntry],
    mode: DeleteMode,
) -> Result<(), TreeError> {
    for entry in entries {
        let target = cursor.join(&entry.name);
        if target == base {
            warn!(path = %target.display(), "refusing to delete the base directory");
            continue;
        }
        if !target.exists() {
            debug!(path = %target.display(), "path does not exist, skipping");
            continue;
        }
        if entry.children.is_empty() {
            remove_directory(&target, mode)?;
        } else {
            delete_entries(base, &target, &entry.children, mode)?;
            if mode == DeleteMode::Force || entry.tail_group {
                remove_if_empty(&target)?;
            }
        }
    }
    Ok(())
}

fn remove_directory(path: &Path, mode: DeleteMode) -> Result<(), TreeError> {
    match mode {
        DeleteMode::Force => match std::fs::remove_dir_all(path) {
            Ok(()) => debug!(path = %path.display(), "removed directory tree"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "path vanished, skipping");
            }
            Err(e) => return Err(e.into()),
        },
        DeleteMode::Preserve => remove_if_empty(path)?,
    }
    Ok(())
}

fn remove_if_empty(path: &Path) -> Result<(), TreeError> {
    match std::fs::remove_dir(path) {
        Ok(()) => debug!(path = %path.display(), "removed empty directory"),
        Err(e) if e.kind() == io::ErrorKind::DirectoryNotEmpty => {
            debug!(path = %path.display(), "directory not empty, preserved");
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "path vanished, skipping");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Delete directories under `base` using the legacy wildcard grammar.
///
/// Plain names move the cursor down without deleting. `".."` moves the
/// cursor to its parent, never above `base`. `"*"` removes every existing
/// directory alongside the cursor (the cursor's siblings, or the children
/// of `base` while the cursor still sits at the base); a group directly
/// following `"*"` is consumed as the list of names to keep. A group after
/// a plain name recurses with the advanced cursor and restores it
/// afterwards. Removal is recursive and best-effort.
#[instrument(skip_all, fields(base = %base.display()))]
pub fn delete_tree_wildcard(base: &Path, spec: &FolderSpec) -> Result<(), TreeError> {
    if !base.is_dir() {
        debug!("base directory does not exist, nothing to delete");
        return Ok(());
    }
    walk_wildcard(base, base, &spec.0)
}

fn walk_wildcard(base: &Path, cursor: &Path, nodes: &[SpecNode]) -> Result<(), TreeError> {
    let mut cursor = cursor.to_path_buf();
    let mut idx = 0;
    while idx < nodes.len() {
        match &nodes[idx] {
            SpecNode::Name(token) if token == ".." => {
                if cursor == base {
                    warn!("already at the base directory, ignoring '..'");
                } else if let Some(parent) = cursor.parent().map(Path::to_path_buf) {
                    cursor = parent;
                }
            }
            SpecNode::Name(token) if token == "*" => {
                let mut keep: HashSet<String> = HashSet::new();
                if let Some(SpecNode::Group(group)) = nodes.get(idx + 1) {
                    keep = group
                        .iter()
                        .filter_map(|node| match node {
                            SpecNode::Name(name) => Some(name.clone()),
                            SpecNode::Group(_) => None,
                        })
                        .collect();
                    idx += 1;
                }
                remove_siblings(base, &cursor, &keep)?;
            }
            SpecNode::Name(name) => {
                cursor = cursor.join(name);
            }
            SpecNode::Group(children) => {
                if idx == 0 {
                    return Err(TreeError::InvalidStructure(
                        "group has no preceding folder name to attach to".to_owned(),
                    ));
                }
                walk_wildcard(base, &cursor, children)?;
            }
        }
        idx += 1;
    }
    Ok(())
}

fn remove_siblings(base: &Path, cursor: &Path, keep: &HashSet<String>) -> Result<(), TreeError> {
    let scope: PathBuf = if cursor == base {
        base.to_path_buf()
    } else {
        cursor.parent().unwrap_or(base).to_path_buf()
    };
    if !scope.is_dir() {
        debug!(scope = %scope.display(), "scope does not exist, skipping wildcard");
        return Ok(());
    }
    for dir_entry in std::fs::read_dir(&scope)? {
        let dir_entry = dir_entry?;
        let path = dir_entry.path();
        if !path.is_dir() || path == *cursor || path == *base {
            continue;
        }
        let name = dir_entry.file_name().to_string_lossy().into_owned();
        if keep.contains(&name) {
            debug!(path = %path.display(), "kept by exception list");
            continue;
        }
        match std::fs::remove_dir_all(&path) {
            Ok(()) => debug!(path = %path.display(), "removed directory tree"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "path vanished, skipping");
            }
            Err(e) => warn!(path = %path.display(), error = %e, "failed to remove directory"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_mode_from_str() {
        assert_eq!("preserve".parse::<DeleteMode>().unwrap(), DeleteMode::Preserve);
        assert_eq!("force".parse::<DeleteMode>().unwrap(), DeleteMode::Force);

        let err = "recursive".parse::<DeleteMode>().unwrap_err();
        assert_eq!(err.to_string(), "unknown delete mode: recursive");
    }

    #[test]
    fn test_delete_missing_base_is_noop() {
        let tmp = tempfile::TempDir::new().unwrap();
        let spec = FolderSpec::from_json(r#"["a"]"#).unwrap();
        delete_tree(&tmp.path().join("absent"), &spec, DeleteMode::Force).unwrap();
    }
}
