//! Keyed file registry: symbolic keys for filesystem entries.
//!
//! A [`FileRegistry`] maps short symbolic keys to absolute paths, supports
//! single-hop aliases, and tracks a temporary class of entries that are
//! purged by the shutdown sweep (see [`lifecycle`]). File creation goes
//! through the naming-collision resolver in [`policy`]; all other keyed
//! operations resolve the key (passing through alias indirection) before
//! touching the filesystem.
//!
//! # Concurrency
//!
//! All state sits behind a single mutex covering each public operation, so
//! a registry can be shared across threads; there is no finer-grained
//! locking because no operation suspends. Cloning a `FileRegistry` yields
//! another handle to the same state.

pub mod lifecycle;
pub mod policy;

// Re-export commonly used types
pub use lifecycle::{ShutdownSweep, register_sweeper, run_shutdown_sweeps};
pub use policy::{
    LogNaming, NamingPolicy, ParseLogNamingError, ParseNamingPolicyError, Resolution,
    next_log_file_name, resolve_collision,
};

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::fsio::{self, EntryMetadata};

/// Errors that can occur during registry operations.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A key, alias, file or directory was absent when required to exist.
    #[error("key not found: {0}")]
    NotFound(String),

    /// A name collides with an existing key or alias, or an alias target
    /// is not a registered key.
    #[error("name conflict: {0}")]
    Conflict(String),

    /// An unrecognized policy or mode string.
    #[error("invalid mode: {0}")]
    InvalidMode(String),

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Lifecycle class of a registered file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    /// A plain managed file.
    Regular,
    /// Purged by the shutdown sweep.
    Temporary,
    /// A log file created through a [`LogNaming`] mode.
    Log,
}

impl FileClass {
    /// Convert to a display string.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileClass::Regular => "regular",
            FileClass::Temporary => "temporary",
            FileClass::Log => "log",
        }
    }
}

impl fmt::Display for FileClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered file: key, absolute path and lifecycle class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// The symbolic key, unique within the registry.
    pub key: String,
    /// The absolute path of the managed file.
    pub path: PathBuf,
    /// Lifecycle class.
    pub class: FileClass,
}

#[derive(Debug, Default)]
struct RegistryState {
    records: HashMap<String, FileRecord>,
    temporary: HashSet<String>,
    aliases: HashMap<String, String>,
}

impl RegistryState {
    fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map_or(name, String::as_str)
    }

    fn insert(&mut self, record: FileRecord) {
        if record.class == FileClass::Temporary {
            self.temporary.insert(record.key.clone());
        } else {
            self.temporary.remove(&record.key);
        }
        self.records.insert(record.key.clone(), record);
    }

    fn drop_aliases_of(&mut self, key: &str) {
        self.aliases.retain(|_, target| target != key);
    }

    /// Remove every currently-temporary entry, unlinking its file.
    /// Already-removed keys and already-missing files are skipped.
    fn sweep(&mut self) -> usize {
        let keys: Vec<String> = self.temporary.drain().collect();
        let mut removed = 0;
        for key in keys {
            let Some(record) = self.records.remove(&key) else {
                debug!(key = %key, "temporary key already removed, skipping");
                continue;
            };
            self.drop_aliases_of(&key);
            match fs::remove_file(&record.path) {
                Ok(()) => {
                    debug!(key = %key, path = %record.path.display(), "removed temporary file");
                    removed += 1;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(key = %key, path = %record.path.display(), "temporary file already gone");
                }
                Err(e) => {
                    warn!(key = %key, path = %record.path.display(), error = %e, "failed to remove temporary file");
                }
            }
        }
        removed
    }
}

/// Process-local registry of keyed files.
///
/// # Examples
///
/// ```
/// use filedex_core::registry::{FileRegistry, NamingPolicy};
/// # let tmp = tempfile::TempDir::new().unwrap();
/// # let dir = tmp.path();
///
/// let registry = FileRegistry::new();
/// let record = registry.create_file(dir, "report.txt", NamingPolicy::Unique).unwrap();
/// assert_eq!(record.key, "report");
///
/// registry.add_alias("summary", "report").unwrap();
/// assert_eq!(registry.resolve_key("summary"), "report");
/// ```
#[derive(Debug, Clone)]
pub struct FileRegistry {
    inner: Arc<Mutex<RegistryState>>,
}

impl FileRegistry {
    /// Create an empty registry and register its sweep handle with the
    /// process-wide shutdown roster.
    pub fn new() -> Self {
        let registry = FileRegistry {
            inner: Arc::new(Mutex::new(RegistryState::default())),
        };
        register_sweeper(registry.sweep_handle());
        registry
    }

    /// A weak handle that can sweep this registry's temporary entries.
    pub fn sweep_handle(&self) -> ShutdownSweep {
        ShutdownSweep::new(Arc::downgrade(&self.inner))
    }

    fn state(&self) -> MutexGuard<'_, RegistryState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ========================================================================
    // Record and alias management
    // ========================================================================

    /// Insert or overwrite the record for `key`.
    ///
    /// No uniqueness enforcement happens here beyond what
    /// [`resolve_collision`] already guaranteed for derived keys.
    pub fn register(&self, key: &str, path: &Path, class: FileClass) {
        let mut state = self.state();
        state.insert(FileRecord {
            key: key.to_owned(),
            path: path.to_owned(),
            class,
        });
        debug!(key, class = class.as_str(), "registered file record");
    }

    /// Resolve an alias to its single-hop target key; a non-alias input is
    /// returned unchanged. Whether the returned key has a record is checked
    /// at the point of use, not here.
    pub fn resolve_key(&self, name_or_alias: &str) -> String {
        self.state().resolve(name_or_alias).to_owned()
    }

    /// Register `alias` for `original_key`.
    ///
    /// Fails with [`RegistryError::Conflict`] when `original_key` is not a
    /// registered key (aliases are single-hop, so an alias is not a valid
    /// target either), or when `alias` is already a key or an alias.
    pub fn add_alias(&self, alias: &str, original_key: &str) -> Result<(), RegistryError> {
        let mut state = self.state();
        if state.records.contains_key(alias) || state.aliases.contains_key(alias) {
            return Err(RegistryError::Conflict(format!(
                "'{alias}' is already a key or an alias"
            )));
        }
        if !state.records.contains_key(original_key) {
            return Err(RegistryError::Conflict(format!(
                "'{original_key}' is not a registered key"
            )));
        }
        state.aliases.insert(alias.to_owned(), original_key.to_owned());
        debug!(alias, key = original_key, "added alias");
        Ok(())
    }

    /// Remove the record for a key (or alias target), unlink its file, and
    /// drop every alias pointing at it.
    ///
    /// Fails with [`RegistryError::NotFound`] when the key has no record or
    /// its file is already absent from disk; the record is left in place in
    /// the latter case.
    #[instrument(skip(self))]
    pub fn remove(&self, key_or_alias: &str) -> Result<(), RegistryError> {
        let mut state = self.state();
        let key = state.resolve(key_or_alias).to_owned();
        let path = state
            .records
            .get(&key)
            .map(|record| record.path.clone())
            .ok_or_else(|| RegistryError::NotFound(key.clone()))?;
        if !path.exists() {
            return Err(RegistryError::NotFound(format!(
                "file for key '{key}' is missing from disk"
            )));
        }
        fs::remove_file(&path)?;
        state.records.remove(&key);
        state.temporary.remove(&key);
        state.drop_aliases_of(&key);
        info!(key = %key, path = %path.display(), "removed file and record");
        Ok(())
    }

    /// Rename the file behind a key and move its record to the new key.
    ///
    /// `new_name` is the new file name; when it carries no extension the
    /// old one is kept. The new key is the new file stem. Aliases that
    /// targeted the old key are retargeted to the new key, and temp-class
    /// marking carries over. Fails with [`RegistryError::Conflict`] when
    /// the new key is already taken.
    #[instrument(skip(self))]
    pub fn rename(&self, key_or_alias: &str, new_name: &str) -> Result<FileRecord, RegistryError> {
        let mut state = self.state();
        let old_key = state.resolve(key_or_alias).to_owned();
        let old = state
            .records
            .get(&old_key)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(old_key.clone()))?;

        let new_file_name = if Path::new(new_name).extension().is_some() {
            new_name.to_owned()
        } else if let Some(ext) = old.path.extension() {
            format!("{new_name}.{}", ext.to_string_lossy())
        } else {
            new_name.to_owned()
        };
        let new_key = Path::new(&new_file_name)
            .file_stem()
            .map_or_else(|| new_file_name.clone(), |s| s.to_string_lossy().into_owned());
        if new_key != old_key
            && (state.records.contains_key(&new_key) || state.aliases.contains_key(&new_key))
        {
            return Err(RegistryError::Conflict(format!(
                "'{new_key}' is already a key or an alias"
            )));
        }
        let new_path = old.path.with_file_name(&new_file_name);

        fs::rename(&old.path, &new_path)?;
        state.records.remove(&old_key);
        if state.temporary.remove(&old_key) {
            state.temporary.insert(new_key.clone());
        }
        for target in state.aliases.values_mut() {
            if *target == old_key {
                *target = new_key.clone();
            }
        }
        let record = FileRecord {
            key: new_key.clone(),
            path: new_path,
            class: old.class,
        };
        state.records.insert(new_key.clone(), record.clone());
        info!(old_key = %old_key, new_key = %new_key, "renamed file");
        Ok(record)
    }

    // ========================================================================
    // File creation
    // ========================================================================

    /// Create a regular file in `dir`, resolving collisions per `policy`,
    /// and register the result.
    #[instrument(skip(self, dir), fields(dir = %dir.display()))]
    pub fn create_file(
        &self,
        dir: &Path,
        name: &str,
        policy: NamingPolicy,
    ) -> Result<FileRecord, RegistryError> {
        self.create_with_class(dir, name, policy, FileClass::Regular)
    }

    /// Create a temporary file; its key joins the temporary set and the
    /// shutdown sweep will remove the file.
    #[instrument(skip(self, dir), fields(dir = %dir.display()))]
    pub fn create_temp_file(
        &self,
        dir: &Path,
        name: &str,
        policy: NamingPolicy,
    ) -> Result<FileRecord, RegistryError> {
        self.create_with_class(dir, name, policy, FileClass::Temporary)
    }

    /// Create a log file named per `naming`; collisions (same-day date
    /// logs) resolve with a unique suffix.
    #[instrument(skip(self, dir), fields(dir = %dir.display()))]
    pub fn create_log_file(
        &self,
        dir: &Path,
        naming: LogNaming,
    ) -> Result<FileRecord, RegistryError> {
        let name = next_log_file_name(dir, naming)?;
        self.create_with_class(dir, &name, NamingPolicy::Unique, FileClass::Log)
    }

    fn create_with_class(
        &self,
        dir: &Path,
        name: &str,
        policy: NamingPolicy,
        class: FileClass,
    ) -> Result<FileRecord, RegistryError> {
        fsio::ensure_dir_exists(dir)?;
        let resolution = resolve_collision(&dir.join(name), policy)?;
        if resolution.write_empty_file {
            File::create(&resolution.path)?;
        }
        let record = FileRecord {
            key: resolution.key,
            path: resolution.path,
            class,
        };
        self.state().insert(record.clone());
        debug!(key = %record.key, path = %record.path.display(), class = class.as_str(), "created file");
        Ok(record)
    }

    // ========================================================================
    // Keyed file operations
    // ========================================================================

    /// The absolute path behind a key or alias.
    pub fn path_of(&self, key_or_alias: &str) -> Result<PathBuf, RegistryError> {
        Ok(self.record_of(key_or_alias)?.path)
    }

    /// The full record behind a key or alias.
    pub fn record_of(&self, key_or_alias: &str) -> Result<FileRecord, RegistryError> {
        let state = self.state();
        let key = state.resolve(key_or_alias);
        state
            .records
            .get(key)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(key.to_owned()))
    }

    /// Read the file behind a key.
    pub fn read(&self, key_or_alias: &str) -> Result<Vec<u8>, RegistryError> {
        let path = self.path_of(key_or_alias)?;
        Ok(fs::read(path)?)
    }

    /// Replace the contents of the file behind a key.
    pub fn write(&self, key_or_alias: &str, contents: &[u8]) -> Result<(), RegistryError> {
        let path = self.path_of(key_or_alias)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Append to the file behind a key.
    pub fn append(&self, key_or_alias: &str, contents: &[u8]) -> Result<(), RegistryError> {
        let path = self.path_of(key_or_alias)?;
        let mut file = OpenOptions::new().append(true).open(path)?;
        file.write_all(contents)?;
        Ok(())
    }

    /// Size, timestamps and kind of the file behind a key.
    pub fn metadata(&self, key_or_alias: &str) -> Result<EntryMetadata, RegistryError> {
        let path = self.path_of(key_or_alias)?;
        Ok(fsio::stat(&path)?)
    }

    /// Copy the file behind a key to a timestamped backup sibling and
    /// return the backup path.
    pub fn backup(&self, key_or_alias: &str) -> Result<PathBuf, RegistryError> {
        let path = self.path_of(key_or_alias)?;
        Ok(fsio::backup_copy(&path)?)
    }

    /// Stream the file behind a key through a gzip encoder to a `.gz`
    /// sibling and return the compressed path.
    #[cfg(feature = "async")]
    pub async fn compress(&self, key_or_alias: &str) -> Result<PathBuf, RegistryError> {
        let src = self.path_of(key_or_alias)?;
        let mut dst = src.clone().into_os_string();
        dst.push(".gz");
        Ok(crate::compress::gzip_file_async(src, PathBuf::from(dst)).await?)
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Whether a record exists for the (alias-resolved) key.
    pub fn contains(&self, key_or_alias: &str) -> bool {
        let state = self.state();
        state.records.contains_key(state.resolve(key_or_alias))
    }

    /// Whether the (alias-resolved) key is marked temporary.
    pub fn is_temporary(&self, key_or_alias: &str) -> bool {
        let state = self.state();
        state.temporary.contains(state.resolve(key_or_alias))
    }

    /// All registered keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let state = self.state();
        let mut keys: Vec<String> = state.records.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// All keys currently marked temporary, sorted.
    pub fn temporary_keys(&self) -> Vec<String> {
        let state = self.state();
        let mut keys: Vec<String> = state.temporary.iter().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of registered records.
    pub fn len(&self) -> usize {
        self.state().records.len()
    }

    /// Whether the registry holds no records.
    pub fn is_empty(&self) -> bool {
        self.state().records.is_empty()
    }

    /// Remove every currently-temporary entry now. Safe to call repeatedly;
    /// returns the number of files removed.
    pub fn sweep_temporary(&self) -> usize {
        self.state().sweep()
    }
}

impl Default for FileRegistry {
    fn default() -> Self {
        Self::new()
    }
}
