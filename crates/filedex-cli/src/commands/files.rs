//! File commands - registry-backed creation plus path utilities.

use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::Args as ClapArgs;
use tracing::instrument;

use filedex_core::compress::gzip_file;
use filedex_core::fsio;
use filedex_core::registry::{FileRegistry, LogNaming, NamingPolicy};

#[derive(ClapArgs, Clone)]
pub struct TouchArgs {
    /// Directory the file is created in (created if missing)
    pub dir: PathBuf,

    /// Desired file name
    pub name: String,

    /// Naming policy: preserve, overwrite or unique
    #[arg(long, default_value = "preserve")]
    pub policy: String,

    /// Mark the file temporary; the shutdown sweep removes it when the
    /// process exits
    #[arg(long)]
    pub temp: bool,
}

#[instrument(level = "info", name = "cmd::touch", skip_all, fields(name = %args.name))]
pub fn touch(args: &TouchArgs, registry: &FileRegistry) -> Result<()> {
    let policy: NamingPolicy = args.policy.parse()?;
    let record = if args.temp {
        registry.create_temp_file(&args.dir, &args.name, policy)?
    } else {
        registry.create_file(&args.dir, &args.name, policy)?
    };
    println!("{}\t{}", record.key, record.path.display());
    Ok(())
}

#[derive(ClapArgs, Clone)]
pub struct LogArgs {
    /// Directory the log file is created in (created if missing)
    pub dir: PathBuf,

    /// Naming mode: date or increment
    #[arg(long, default_value = "increment")]
    pub naming: String,
}

#[instrument(level = "info", name = "cmd::log", skip_all, fields(dir = %args.dir.display()))]
pub fn log(args: &LogArgs, registry: &FileRegistry) -> Result<()> {
    let naming: LogNaming = args.naming.parse()?;
    let record = registry.create_log_file(&args.dir, naming)?;
    println!("{}\t{}", record.key, record.path.display());
    Ok(())
}

#[derive(ClapArgs, Clone)]
pub struct LsArgs {
    /// Directory to search
    pub dir: PathBuf,

    /// Substring the entry name must contain (empty matches everything)
    #[arg(default_value = "")]
    pub needle: String,

    /// Walk the whole subtree instead of the immediate listing
    #[arg(short, long)]
    pub recursive: bool,
}

#[instrument(level = "info", name = "cmd::ls", skip_all, fields(dir = %args.dir.display()))]
pub fn ls(args: &LsArgs) -> Result<()> {
    let matches = fsio::search_entries(&args.dir, &args.needle, args.recursive)
        .with_context(|| format!("searching {}", args.dir.display()))?;
    for path in matches {
        println!("{}", path.display());
    }
    Ok(())
}

#[derive(ClapArgs, Clone)]
pub struct StatArgs {
    /// Path to stat
    pub path: PathBuf,
}

#[instrument(level = "info", name = "cmd::stat", skip_all, fields(path = %args.path.display()))]
pub fn stat(args: &StatArgs) -> Result<()> {
    let meta = fsio::stat(&args.path).with_context(|| format!("stat {}", args.path.display()))?;
    println!("kind:     {}", meta.kind.as_str());
    println!("size:     {}", meta.len);
    println!("created:  {}", format_time(meta.created));
    println!("modified: {}", format_time(meta.modified));
    Ok(())
}

fn format_time(time: Option<SystemTime>) -> String {
    time.map_or_else(
        || "-".to_owned(),
        |t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

#[derive(ClapArgs, Clone)]
pub struct BackupArgs {
    /// File to back up
    pub path: PathBuf,
}

#[instrument(level = "info", name = "cmd::backup", skip_all, fields(path = %args.path.display()))]
pub fn backup(args: &BackupArgs) -> Result<()> {
    let backup = fsio::backup_copy(&args.path)
        .with_context(|| format!("backing up {}", args.path.display()))?;
    println!("{}", backup.display());
    Ok(())
}

#[derive(ClapArgs, Clone)]
pub struct GzipArgs {
    /// Source file
    pub src: PathBuf,

    /// Destination path (default: source with .gz appended)
    pub dst: Option<PathBuf>,
}

#[instrument(level = "info", name = "cmd::gzip", skip_all, fields(src = %args.src.display()))]
pub fn gzip(args: &GzipArgs) -> Result<()> {
    let dst = args.dst.clone().unwrap_or_else(|| {
        let mut os = args.src.clone().into_os_string();
        os.push(".gz");
        PathBuf::from(os)
    });
    gzip_file(&args.src, &dst)
        .with_context(|| format!("compressing {}", args.src.display()))?;
    println!("{}", dst.display());
    Ok(())
}
