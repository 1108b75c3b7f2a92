//! itemvault - archive snapshots of remote items.
//!
//! This is the main entry point for the itemvault CLI.

mod commands;

use clap::{Parser, Subcommand};
use commands::{handle_archive, handle_history, init_logging, ArchiveArgs};
use itemvault_core::Config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "itemvault")]
#[command(author, version, about = "Archive snapshots of remote items, storing only changes", long_about = None)]
struct Cli {
    /// Working directory holding the archive (defaults to config, then the current directory)
    #[arg(short, long, global = true)]
    dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch items and archive them if they changed
    Archive(ArchiveArgs),
    /// List the archived snapshots of an item
    History {
        /// Item ID
        item_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cwd = std::env::current_dir()?;
    let (config, sources) = Config::load(Some(&cwd)).await?;

    init_logging(cli.verbose, cli.log_file, config.log_level);
    for source in &sources {
        tracing::debug!(path = %source.display(), "Loaded config");
    }

    let dir = cli
        .dir
        .or_else(|| config.archive_dir.clone())
        .unwrap_or(cwd);

    match cli.command {
        Commands::Archive(args) => handle_archive(args, &dir, &config).await,
        Commands::History { item_id } => handle_history(&item_id, &dir, &config).await,
    }
}
