//! Filesystem collaborators: ensure-path-exists, metadata, substring
//! search over directory listings, and timestamped backup copies.
//!
//! These are thin layers over the host filesystem; the registry and the
//! tree walkers delegate existence checks and physical operations here or
//! to `std::fs` directly.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::Local;
use tracing::debug;
use walkdir::WalkDir;

/// Create `path` and all missing intermediate directories. Idempotent.
pub fn ensure_dir_exists(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

/// The kind of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
}

impl EntryKind {
    fn of(file_type: fs::FileType) -> Self {
        if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_symlink() {
            EntryKind::Symlink
        } else {
            EntryKind::File
        }
    }

    /// Convert to a display string.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
            EntryKind::Symlink => "symlink",
        }
    }
}

/// Size, timestamps and kind of a filesystem entry.
///
/// Creation and modification times are `None` on platforms or filesystems
/// that do not record them.
#[derive(Debug, Clone)]
pub struct EntryMetadata {
    pub len: u64,
    pub created: Option<SystemTime>,
    pub modified: Option<SystemTime>,
    pub kind: EntryKind,
}

/// Stat an entry without following symlinks.
pub fn stat(path: &Path) -> io::Result<EntryMetadata> {
    let meta = fs::symlink_metadata(path)?;
    Ok(EntryMetadata {
        len: meta.len(),
        created: meta.created().ok(),
        modified: meta.modified().ok(),
        kind: EntryKind::of(meta.file_type()),
    })
}

/// Entries under `dir` whose file name contains `needle`, sorted.
///
/// Non-recursive search reads the immediate listing; recursive search
/// walks the whole subtree.
pub fn search_entries(dir: &Path, needle: &str, recursive: bool) -> io::Result<Vec<PathBuf>> {
    let mut matches = Vec::new();
    if recursive {
        for entry in WalkDir::new(dir).min_depth(1) {
            let entry = entry.map_err(io::Error::other)?;
            if entry.file_name().to_string_lossy().contains(needle) {
                matches.push(entry.into_path());
            }
        }
    } else {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_name().to_string_lossy().contains(needle) {
                matches.push(entry.path());
            }
        }
    }
    matches.sort();
    Ok(matches)
}

/// Copy `path` to a timestamped sibling (`<stem>_backup_<stamp>.<ext>`)
/// and return the backup path. A numeric suffix disambiguates when two
/// backups land on the same second.
pub fn backup_copy(path: &Path) -> io::Result<PathBuf> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path.extension().map(|e| e.to_string_lossy().into_owned());
    let stamp = Local::now().format("%Y%m%dT%H%M%S").to_string();

    let mut n = 0u32;
    loop {
        let base = if n == 0 {
            format!("{stem}_backup_{stamp}")
        } else {
            format!("{stem}_backup_{stamp}_{n}")
        };
        let file_name = match &ext {
            Some(ext) => format!("{base}.{ext}"),
            None => base,
        };
        let candidate = path.with_file_name(file_name);
        if !candidate.exists() {
            fs::copy(path, &candidate)?;
            debug!(source = %path.display(), backup = %candidate.display(), "created backup copy");
            return Ok(candidate);
        }
        n += 1;
    }
}
