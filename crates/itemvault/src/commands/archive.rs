//! Archive command handler.
//!
//! Fetches each item from the portal and archives it if it changed.

use anyhow::Context;
use clap::Args;
use itemvault_archive::{Archiver, ArchiverConfig};
use itemvault_core::{Backup, Config};
use itemvault_source::{ArcGisCredentials, ArcGisSource};
use std::path::Path;
use std::sync::Arc;

/// Arguments of the archive command.
#[derive(Args)]
pub struct ArchiveArgs {
    /// Item IDs to archive
    #[arg(required = true)]
    pub item_ids: Vec<String>,

    /// Portal username (or ITEMVAULT_USERNAME)
    #[arg(short, long)]
    pub username: Option<String>,

    /// Portal token (or ITEMVAULT_TOKEN)
    #[arg(short, long)]
    pub token: Option<String>,

    /// Portal URL (defaults to ArcGIS Online)
    #[arg(long)]
    pub portal: Option<String>,
}

/// Handle the archive command.
pub async fn handle_archive(args: ArchiveArgs, dir: &Path, config: &Config) -> anyhow::Result<()> {
    let config = config.clone().merge(Config {
        username: args.username,
        token: args.token,
        portal_url: args.portal,
        ..Default::default()
    });

    let credentials =
        ArcGisCredentials::new(config.require_username()?, config.require_token()?)?;
    let source = ArcGisSource::new(config.portal_url(), credentials)
        .with_context(|| format!("Invalid portal URL: {}", config.portal_url()))?;
    let archiver = Archiver::new(
        dir,
        ArchiverConfig {
            extension: config.extension().to_string(),
        },
    );
    let backup = Backup::new(Arc::new(source), archiver);

    let results = backup.run_all(&args.item_ids).await;
    let total = results.len();
    let mut failed = 0;

    for (item_id, result) in results {
        match result {
            Ok(report) => match report.filename() {
                Some(path) => println!("{} completed: {}", report.display_name(), path.display()),
                None => println!("No updates to {}.", report.display_name()),
            },
            Err(e) => {
                failed += 1;
                tracing::error!(item_id = %item_id, error = %e, "Archive failed");
                eprintln!("Failed to archive {item_id}: {e}");
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {total} items failed");
    }

    Ok(())
}
