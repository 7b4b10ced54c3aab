//! Tree commands - create or delete folder hierarchies from a spec.
//!
//! # Examples
//!
//! ```bash
//! # Create a, a/b, a/c and d under ./workspace
//! filedex mktree ./workspace '["a", ["b", "c"], "d"]'
//!
//! # Remove everything the spec describes, contents included
//! filedex rmtree ./workspace '["a", ["b", "c"], "d"]' --mode force
//!
//! # Legacy wildcard grammar: keep only the named directories
//! filedex rmtree ./workspace '["*", ["keep"]]' --wildcard
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use filedex_core::fsio::ensure_dir_exists;
use filedex_core::tree::{DeleteMode, create_tree, delete_tree, delete_tree_wildcard};

use super::read_spec;

#[derive(ClapArgs, Clone)]
pub struct MktreeArgs {
    /// Base directory the hierarchy is created under
    pub base: PathBuf,

    /// Folder spec: inline JSON, @file, or - for stdin
    pub spec: String,

    /// Create the base directory first if it is missing
    #[arg(short, long)]
    pub parents: bool,
}

#[instrument(level = "info", name = "cmd::mktree", skip_all, fields(base = %args.base.display()))]
pub fn mktree(args: &MktreeArgs) -> Result<()> {
    let spec = read_spec(&args.spec)?;
    if args.parents {
        ensure_dir_exists(&args.base)
            .with_context(|| format!("creating base directory {}", args.base.display()))?;
    }
    create_tree(&args.base, &spec).context("creating folder hierarchy")?;
    Ok(())
}

#[derive(ClapArgs, Clone)]
pub struct RmtreeArgs {
    /// Base directory the hierarchy lives under (never deleted itself)
    pub base: PathBuf,

    /// Folder spec: inline JSON, @file, or - for stdin
    pub spec: String,

    /// Delete mode: preserve removes only empty directories, force removes
    /// contents too
    #[arg(long, default_value = "preserve")]
    pub mode: String,

    /// Use the legacy wildcard grammar ("*" and "..") instead of the
    /// mode-based one
    #[arg(long, conflicts_with = "mode")]
    pub wildcard: bool,
}

#[instrument(level = "info", name = "cmd::rmtree", skip_all, fields(base = %args.base.display()))]
pub fn rmtree(args: &RmtreeArgs) -> Result<()> {
    let spec = read_spec(&args.spec)?;
    if args.wildcard {
        delete_tree_wildcard(&args.base, &spec).context("deleting folder hierarchy")?;
    } else {
        let mode: DeleteMode = args.mode.parse()?;
        delete_tree(&args.base, &spec, mode).context("deleting folder hierarchy")?;
    }
    Ok(())
}
