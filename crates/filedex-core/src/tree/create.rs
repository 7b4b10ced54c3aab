//! Creating a directory hierarchy from a folder spec.

use std::io;
use std::path::Path;

use tracing::{debug, instrument, trace};

use super::spec::{FolderEntry, FolderSpec, TreeError};

/// Create the directory hierarchy described by `spec` under `base`.
///
/// `base` must already exist; callers that need intermediate directories
/// use [`crate::fsio::ensure_dir_exists`] first. The walk is idempotent:
/// directories that already exist are left alone, so re-running the same
/// spec performs no destructive action and raises no error.
///
/// # Examples
///
/// ```no_run
/// use filedex_core::tree::{FolderSpec, create_tree};
/// use std::path::Path;
///
/// let spec = FolderSpec::from_json(r#"["a", ["b", "c"], "d"]"#).unwrap();
/// // yields a, a/b, a/c and d under the base
/// create_tree(Path::new("/tmp/x"), &spec).unwrap();
/// ```
#[instrument(skip_all, fields(base = %base.display()))]
pub fn create_tree(base: &Path, spec: &FolderSpec) -> Result<(), TreeError> {
    let tree = spec.parse()?;
    if !base.is_dir() {
        return Err(TreeError::BaseNotFound(base.to_path_buf()));
    }
    create_entries(base, &tree.entries)
}

fn create_entries(cursor: &Path, entries: &[FolderEntry]) -> Result<(), TreeError> {
    for entry in entries {
        let path = cursor.join(&entry.name);
        match std::fs::create_dir(&path) {
            Ok(()) => debug!(path = %path.display(), "created directory"),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                trace!(path = %path.display(), "directory already exists");
            }
            Err(e) => return Err(e.into()),
        }
        create_entries(&path, &entry.children)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_missing_base_fails() {
        let tmp = TempDir::new().unwrap();
        let spec = FolderSpec::from_json(r#"["a"]"#).unwrap();
        let err = create_tree(&tmp.path().join("absent"), &spec).unwrap_err();
        assert!(matches!(err, TreeError::BaseNotFound(_)));
    }

    #[test]
    fn test_create_empty_spec_is_noop() {
        let tmp = TempDir::new().unwrap();
        create_tree(tmp.path(), &FolderSpec::default()).unwrap();
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }
}
