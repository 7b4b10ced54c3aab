//! Naming-collision policies and log-file naming.
//!
//! [`resolve_collision`] decides what happens when a desired file path is
//! already taken. It is reused identically by basic-file, temp-file and
//! log-file creation; log files additionally derive their desired name
//! from a [`LogNaming`] mode before resolution.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::Local;
use tracing::debug;

use super::RegistryError;

/// Strategy governing what happens when a target file path already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingPolicy {
    /// Keep an existing file as-is, including its contents.
    Preserve,
    /// Truncate any existing content.
    Overwrite,
    /// Append an increasing numeric suffix until an unused path is found.
    Unique,
}

/// Error returned when parsing an invalid naming policy string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNamingPolicyError(pub(crate) String);

impl fmt::Display for ParseNamingPolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown naming policy: {}", self.0)
    }
}

impl std::error::Error for ParseNamingPolicyError {}

impl From<ParseNamingPolicyError> for RegistryError {
    fn from(e: ParseNamingPolicyError) -> Self {
        RegistryError::InvalidMode(e.0)
    }
}

impl FromStr for NamingPolicy {
    type Err = ParseNamingPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preserve" => Ok(NamingPolicy::Preserve),
            "overwrite" => Ok(NamingPolicy::Overwrite),
            "unique" => Ok(NamingPolicy::Unique),
            _ => Err(ParseNamingPolicyError(s.to_owned())),
        }
    }
}

impl NamingPolicy {
    /// Convert to the surface string.
    pub fn as_str(&self) -> &'static str {
        match self {
            NamingPolicy::Preserve => "preserve",
            NamingPolicy::Overwrite => "overwrite",
            NamingPolicy::Unique => "unique",
        }
    }
}

impl fmt::Display for NamingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Naming mode for log-file creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogNaming {
    /// `log_<YYYY-MM-DD>.txt` from the current local date.
    Date,
    /// `log_<N>.txt` where `N` is one greater than the highest existing
    /// numeric suffix among `log_<number>.txt` siblings, or `0`.
    Increment,
}

/// Error returned when parsing an invalid log naming string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLogNamingError(pub(crate) String);

impl fmt::Display for ParseLogNamingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown log naming mode: {}", self.0)
    }
}

impl std::error::Error for ParseLogNamingError {}

impl From<ParseLogNamingError> for RegistryError {
    fn from(e: ParseLogNamingError) -> Self {
        RegistryError::InvalidMode(e.0)
    }
}

impl FromStr for LogNaming {
    type Err = ParseLogNamingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(LogNaming::Date),
            "increment" => Ok(LogNaming::Increment),
            _ => Err(ParseLogNamingError(s.to_owned())),
        }
    }
}

impl LogNaming {
    /// Convert to the surface string.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogNaming::Date => "date",
            LogNaming::Increment => "increment",
        }
    }
}

impl fmt::Display for LogNaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of collision resolution for a desired path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The path to actually use.
    pub path: PathBuf,
    /// Whether an empty file should be written at [`Resolution::path`]
    /// (truncating any existing content).
    pub write_empty_file: bool,
    /// The registry key derived from the final file name.
    pub key: String,
}

/// Decide the final path for `desired` under `policy`.
///
/// Under [`NamingPolicy::Unique`] the numeric suffix is inserted before
/// the extension, starting at 1, and the derived key carries the same
/// suffix: with `report.txt` and `report_1.txt` taken, the next resolution
/// yields `report_2.txt` and key `report_2`.
pub fn resolve_collision(desired: &Path, policy: NamingPolicy) -> io::Result<Resolution> {
    let stem = file_stem_of(desired);
    match policy {
        NamingPolicy::Preserve => {
            let exists = desired.exists();
            Ok(Resolution {
                path: desired.to_path_buf(),
                write_empty_file: !exists,
                key: stem,
            })
        }
        NamingPolicy::Overwrite => Ok(Resolution {
            path: desired.to_path_buf(),
            write_empty_file: true,
            key: stem,
        }),
        NamingPolicy::Unique => {
            if !desired.exists() {
                return Ok(Resolution {
                    path: desired.to_path_buf(),
                    write_empty_file: true,
                    key: stem,
                });
            }
            let ext = desired.extension().map(|e| e.to_string_lossy().into_owned());
            let mut n = 1u64;
            loop {
                let key = format!("{stem}_{n}");
                let file_name = match &ext {
                    Some(ext) => format!("{key}.{ext}"),
                    None => key.clone(),
                };
                let candidate = desired.with_file_name(&file_name);
                if !candidate.exists() {
                    debug!(path = %candidate.display(), "resolved unique path");
                    return Ok(Resolution {
                        path: candidate,
                        write_empty_file: true,
                        key,
                    });
                }
                n += 1;
            }
        }
    }
}

/// Derive the next log file name in `dir` for the given naming mode.
pub fn next_log_file_name(dir: &Path, naming: LogNaming) -> io::Result<String> {
    match naming {
        LogNaming::Date => Ok(format!("log_{}.txt", Local::now().format("%Y-%m-%d"))),
        LogNaming::Increment => {
            let mut next = 0u64;
            if dir.is_dir() {
                for entry in fs::read_dir(dir)? {
                    let entry = entry?;
                    let name = entry.file_name();
                    let Some(name) = name.to_str() else { continue };
                    if let Some(n) = parse_log_number(name) {
                        next = next.max(n + 1);
                    }
                }
            }
            Ok(format!("log_{next}.txt"))
        }
    }
}

fn parse_log_number(name: &str) -> Option<u64> {
    name.strip_prefix("log_")?.strip_suffix(".txt")?.parse().ok()
}

fn file_stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_policy_from_str() {
        assert_eq!("preserve".parse::<NamingPolicy>().unwrap(), NamingPolicy::Preserve);
        assert_eq!("overwrite".parse::<NamingPolicy>().unwrap(), NamingPolicy::Overwrite);
        assert_eq!("unique".parse::<NamingPolicy>().unwrap(), NamingPolicy::Unique);

        let err = "keep".parse::<NamingPolicy>().unwrap_err();
        assert_eq!(err.to_string(), "unknown naming policy: keep");
    }

    #[test]
    fn test_preserve_existing_file_is_kept() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("report.txt");
        fs::write(&path, b"content").unwrap();

        let resolution = resolve_collision(&path, NamingPolicy::Preserve).unwrap();
        assert_eq!(resolution.path, path);
        assert!(!resolution.write_empty_file);
        assert_eq!(resolution.key, "report");
    }

    #[test]
    fn test_preserve_missing_file_writes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("report.txt");

        let resolution = resolve_collision(&path, NamingPolicy::Preserve).unwrap();
        assert!(resolution.write_empty_file);
    }

    #[test]
    fn test_overwrite_always_writes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("report.txt");
        fs::write(&path, b"content").unwrap();

        let resolution = resolve_collision(&path, NamingPolicy::Overwrite).unwrap();
        assert_eq!(resolution.path, path);
        assert!(resolution.write_empty_file);
    }

    #[test]
    fn test_unique_skips_taken_suffixes() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("report.txt"), b"").unwrap();
        fs::write(tmp.path().join("report_1.txt"), b"").unwrap();

        let resolution =
            resolve_collision(&tmp.path().join("report.txt"), NamingPolicy::Unique).unwrap();
        assert_eq!(resolution.path, tmp.path().join("report_2.txt"));
        assert_eq!(resolution.key, "report_2");
        assert!(resolution.write_empty_file);
    }

    #[test]
    fn test_unique_without_extension() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("notes"), b"").unwrap();

        let resolution = resolve_collision(&tmp.path().join("notes"), NamingPolicy::Unique).unwrap();
        assert_eq!(resolution.path, tmp.path().join("notes_1"));
        assert_eq!(resolution.key, "notes_1");
    }

    #[test]
    fn test_log_name_increment_starts_at_zero() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(
            next_log_file_name(tmp.path(), LogNaming::Increment).unwrap(),
            "log_0.txt"
        );
    }

    #[test]
    fn test_log_name_increment_continues_from_highest() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("log_0.txt"), b"").unwrap();
        fs::write(tmp.path().join("log_7.txt"), b"").unwrap();
        fs::write(tmp.path().join("log_notes.txt"), b"").unwrap();

        assert_eq!(
            next_log_file_name(tmp.path(), LogNaming::Increment).unwrap(),
            "log_8.txt"
        );
    }

    #[test]
    fn test_log_name_date_shape() {
        let tmp = TempDir::new().unwrap();
        let name = next_log_file_name(tmp.path(), LogNaming::Date).unwrap();
        assert!(name.starts_with("log_"));
        assert!(name.ends_with(".txt"));
        // log_YYYY-MM-DD.txt
        assert_eq!(name.len(), "log_0000-00-00.txt".len());
    }
}
