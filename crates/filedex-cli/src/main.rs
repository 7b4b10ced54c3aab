#![deny(unsafe_code)]

mod commands;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use filedex_core::registry::{FileRegistry, run_shutdown_sweeps};

use crate::commands::{files, tree};

/// Command-line interface for the filedex file registry
#[derive(Parser)]
#[command(name = "filedex")]
#[command(author, version)]
#[command(propagate_version = true)]
#[command(after_help = "EXAMPLES:
    # Create a folder hierarchy from a spec
    filedex mktree ./workspace '[\"a\", [\"b\", \"c\"], \"d\"]'

    # Delete the empty parts of the hierarchy again
    filedex rmtree ./workspace '[\"a\", [\"b\", \"c\"], \"d\"]' --mode preserve

    # Create a file with a collision-safe name
    filedex touch ./workspace report.txt --policy unique

    # Search a directory listing
    filedex ls ./workspace report -r
")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a directory hierarchy from a folder spec
    Mktree(tree::MktreeArgs),

    /// Delete a directory hierarchy described by a folder spec
    Rmtree(tree::RmtreeArgs),

    /// Create a registered file under a naming policy
    Touch(files::TouchArgs),

    /// Create a log file with date or increment naming
    Log(files::LogArgs),

    /// Search directory listings for a name substring
    Ls(files::LsArgs),

    /// Show size, timestamps and kind of a path
    Stat(files::StatArgs),

    /// Copy a file to a timestamped backup sibling
    Backup(files::BackupArgs),

    /// Compress a file to gzip
    Gzip(files::GzipArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    // Temporary entries must be purged exactly once, even on Ctrl-C; the
    // sweep runs synchronously before the process is allowed to exit.
    if let Err(e) = ctrlc::set_handler(|| {
        run_shutdown_sweeps();
        std::process::exit(130);
    }) {
        tracing::warn!(error = %e, "failed to install shutdown handler");
    }

    // The registry must outlive the sweep so temporary entries created by
    // the command are still reachable at shutdown.
    let registry = FileRegistry::new();
    let result = run(cli, &registry);
    run_shutdown_sweeps();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, registry: &FileRegistry) -> Result<()> {
    match cli.command {
        Commands::Mktree(args) => tree::mktree(&args),
        Commands::Rmtree(args) => tree::rmtree(&args),
        Commands::Touch(args) => files::touch(&args, registry),
        Commands::Log(args) => files::log(&args, registry),
        Commands::Ls(args) => files::ls(&args),
        Commands::Stat(args) => files::stat(&args),
        Commands::Backup(args) => files::backup(&args),
        Commands::Gzip(args) => files::gzip(&args),
    }
}

/// Set up tracing/logging based on verbosity level
fn setup_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(io::stderr)
        .init();
}
