//! Snapshot archiver: stage, compare against latest, commit or discard.

use crate::{
    ArchiveLayout, ArchiveOutcome, ArchiveResult, ArchiveStore, StagedSnapshot, StagingArea,
};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{info, warn};

/// Configuration for an archiver.
#[derive(Debug, Clone)]
pub struct ArchiverConfig {
    /// Extension of snapshot files, without the dot.
    pub extension: String,
}

impl Default for ArchiverConfig {
    fn default() -> Self {
        Self {
            extension: "json".to_string(),
        }
    }
}

/// Archives item snapshots, storing a capture only when it differs from
/// the item's latest snapshot.
///
/// At most one `archive` call per item may run at a time; calls for
/// different items are independent.
#[derive(Debug, Clone)]
pub struct Archiver {
    layout: ArchiveLayout,
    staging: StagingArea,
    store: ArchiveStore,
}

impl Archiver {
    /// Create an archiver rooted at a working directory.
    pub fn new(root: impl Into<PathBuf>, config: ArchiverConfig) -> Self {
        let layout = ArchiveLayout::new(root, config.extension);
        Self {
            staging: StagingArea::new(layout.clone()),
            store: ArchiveStore::new(layout.clone()),
            layout,
        }
    }

    /// The store holding committed snapshots.
    pub fn store(&self) -> &ArchiveStore {
        &self.store
    }

    /// The archive layout.
    pub fn layout(&self) -> &ArchiveLayout {
        &self.layout
    }

    /// Archive a payload captured now.
    pub async fn archive(&self, item_id: &str, payload: &[u8]) -> ArchiveResult<ArchiveOutcome> {
        self.archive_at(item_id, payload, Utc::now()).await
    }

    /// Archive a payload captured at `captured_at`.
    ///
    /// Exactly one of commit or discard happens. The staging file is gone
    /// when this returns `Ok`; on error it is removed on a best-effort basis.
    pub async fn archive_at(
        &self,
        item_id: &str,
        payload: &[u8],
        captured_at: DateTime<Utc>,
    ) -> ArchiveResult<ArchiveOutcome> {
        // Reject bad IDs before touching the disk
        let staging_path = self.layout.staging_path(item_id)?;
        self.layout.ensure().await?;

        let result = match self.staging.stage(item_id, payload).await {
            Ok(staged) => self.resolve(item_id, staged, captured_at).await,
            Err(e) => Err(e),
        };

        if result.is_err() {
            if let Err(e) = self.staging.discard(&staging_path).await {
                warn!(
                    item_id = %item_id,
                    path = %staging_path.display(),
                    error = %e,
                    "Failed to clean up staging file"
                );
            }
        }

        result
    }

    /// Commit or discard a staged snapshot depending on the latest fingerprint.
    async fn resolve(
        &self,
        item_id: &str,
        staged: StagedSnapshot,
        captured_at: DateTime<Utc>,
    ) -> ArchiveResult<ArchiveOutcome> {
        let latest = self.store.latest_fingerprint(item_id).await?;

        if latest.as_ref() == Some(&staged.fingerprint) {
            self.staging.discard(&staged.path).await?;
            info!(item_id = %item_id, fingerprint = %staged.fingerprint, "No changes since latest snapshot");
            return Ok(ArchiveOutcome {
                item_id: item_id.to_string(),
                fingerprint: staged.fingerprint,
                committed: None,
                duplicate: true,
            });
        }

        let snapshot = self
            .store
            .commit(item_id, &staged.path, captured_at)
            .await?;

        Ok(ArchiveOutcome {
            item_id: item_id.to_string(),
            fingerprint: staged.fingerprint,
            committed: Some(snapshot),
            duplicate: false,
        })
    }
}
