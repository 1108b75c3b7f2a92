//! Staging area for captured payloads.

use crate::{ArchiveLayout, ArchiveResult, Fingerprint};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// A payload written to its staging slot and fingerprinted from disk.
#[derive(Debug, Clone)]
pub struct StagedSnapshot {
    /// Path of the staging file.
    pub path: PathBuf,

    /// Fingerprint of the bytes on disk.
    pub fingerprint: Fingerprint,
}

/// Writes payloads into the per-item staging slots.
///
/// Each item has exactly one slot, so two stage operations for the same
/// item must not run at the same time. Different items never share a slot.
#[derive(Debug, Clone)]
pub struct StagingArea {
    layout: ArchiveLayout,
}

impl StagingArea {
    /// Create a staging area over an archive layout.
    pub fn new(layout: ArchiveLayout) -> Self {
        Self { layout }
    }

    /// Write `payload` to the item's staging slot and fingerprint it.
    ///
    /// The file is created or truncated, synced to disk, then read back for
    /// hashing, so the fingerprint describes exactly what was persisted. On
    /// error the slot may hold a partial file.
    pub async fn stage(&self, item_id: &str, payload: &[u8]) -> ArchiveResult<StagedSnapshot> {
        let path = self.layout.staging_path(item_id)?;
        debug!(item_id = %item_id, path = %path.display(), bytes = payload.len(), "Staging snapshot");

        let mut file = File::create(&path).await?;
        file.write_all(payload).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        let fingerprint = Fingerprint::of_file(&path).await?;
        debug!(item_id = %item_id, fingerprint = %fingerprint, "Staged snapshot");

        Ok(StagedSnapshot { path, fingerprint })
    }

    /// Remove a staging file. A file that is already gone is not an error.
    pub async fn discard(&self, path: &Path) -> ArchiveResult<()> {
        match fs::remove_file(path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Discarded staging file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
