//! Subcommand implementations.

pub mod files;
pub mod tree;

use std::io::Read;

use anyhow::{Context, Result};

use filedex_core::tree::FolderSpec;

/// Parse a folder-spec argument: inline JSON, `@path` to a JSON file, or
/// `-` for stdin.
pub fn read_spec(arg: &str) -> Result<FolderSpec> {
    let json = if arg == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading spec from stdin")?;
        buf
    } else if let Some(path) = arg.strip_prefix('@') {
        std::fs::read_to_string(path).with_context(|| format!("reading spec file {path}"))?
    } else {
        arg.to_owned()
    };
    FolderSpec::from_json(json.trim()).context("parsing folder spec JSON")
}
