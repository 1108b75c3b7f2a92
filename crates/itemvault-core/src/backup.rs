//! Backup runs: fetch an item from a source and archive it.

use crate::{CoreError, CoreResult};
use futures::future::join_all;
use itemvault_archive::{layout::validate_item_id, ArchiveOutcome, Archiver};
use itemvault_source::ItemSource;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};

/// What happened to one item during a backup run.
#[derive(Debug, Clone)]
pub struct BackupReport {
    /// Item that was backed up.
    pub item_id: String,

    /// Title reported by the source, if any.
    pub title: Option<String>,

    /// Metadata passed through from the source.
    pub details: serde_json::Value,

    /// Archive result.
    pub outcome: ArchiveOutcome,
}

impl BackupReport {
    /// Path of the new snapshot, `None` when nothing changed.
    pub fn filename(&self) -> Option<&Path> {
        self.outcome.committed_path()
    }

    /// Whether the capture matched the latest snapshot.
    pub fn duplicate(&self) -> bool {
        self.outcome.duplicate
    }

    /// Title, falling back to the item ID.
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.item_id)
    }
}

/// Fetches items from a source and hands them to the archiver.
#[derive(Clone)]
pub struct Backup {
    source: Arc<dyn ItemSource>,
    archiver: Archiver,
}

impl Backup {
    /// Create a backup runner.
    pub fn new(source: Arc<dyn ItemSource>, archiver: Archiver) -> Self {
        Self { source, archiver }
    }

    /// The archiver snapshots are written through.
    pub fn archiver(&self) -> &Archiver {
        &self.archiver
    }

    /// Back up one item.
    pub async fn run(&self, item_id: &str) -> CoreResult<BackupReport> {
        // Bad IDs are rejected before spending a fetch on them
        validate_item_id(item_id)?;

        let span = info_span!("backup", item_id = %item_id, source = %self.source.name());
        async move {
            let fetched = self.source.fetch(item_id).await?;
            let title = fetched.title().map(str::to_owned);
            let outcome = self.archiver.archive(item_id, &fetched.payload).await?;

            match outcome.committed_path() {
                Some(path) => info!(path = %path.display(), "Archived new snapshot"),
                None => info!("No updates"),
            }

            Ok::<_, CoreError>(BackupReport {
                item_id: item_id.to_string(),
                title,
                details: fetched.details,
                outcome,
            })
        }
        .instrument(span)
        .await
    }

    /// Back up several items concurrently.
    ///
    /// Each distinct item is archived by exactly one task; repeated IDs are
    /// backed up once. Results come back in first-seen order.
    pub async fn run_all(&self, item_ids: &[String]) -> Vec<(String, CoreResult<BackupReport>)> {
        let mut unique: Vec<&String> = Vec::new();
        for id in item_ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }

        let runs = unique.iter().map(|id| self.run(id));
        let results = join_all(runs).await;

        unique.into_iter().cloned().zip(results).collect()
    }
}
