//! Archive store implementation.

use crate::layout::STAGING_DIR;
use crate::{ArchiveLayout, ArchiveResult, ArchivedSnapshot, Fingerprint, SnapshotStamp};
use chrono::{DateTime, Utc};
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// Append-only store of committed snapshots, one directory per item.
///
/// Snapshot files are named `<stamp>.<ext>`, so sorting the names of an
/// item's directory gives its history in capture order:
/// ```text
/// archive/
///   <item_id>/
///     1704164645000.json
///     1704251045000.json   # latest
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveStore {
    layout: ArchiveLayout,
}

impl ArchiveStore {
    /// Create a store over an archive layout.
    pub fn new(layout: ArchiveLayout) -> Self {
        Self { layout }
    }

    /// The layout this store reads and writes.
    pub fn layout(&self) -> &ArchiveLayout {
        &self.layout
    }

    /// List committed snapshots of an item, oldest first.
    ///
    /// An item that was never committed has an empty history. Entries that
    /// are not snapshot files (directories, hidden files, other extensions,
    /// names that are not stamps) are skipped.
    pub async fn list(&self, item_id: &str) -> ArchiveResult<Vec<ArchivedSnapshot>> {
        let item_dir = self.layout.item_dir(item_id)?;

        let mut entries = match fs::read_dir(&item_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let suffix = format!(".{}", self.layout.extension());
        let mut named = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_owned) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            // Match the whole suffix: the extension may itself contain dots
            let Some(stamp) = name
                .strip_suffix(suffix.as_str())
                .and_then(SnapshotStamp::parse)
            else {
                debug!(path = %path.display(), "Skipping non-snapshot file");
                continue;
            };

            named.push((
                name,
                ArchivedSnapshot {
                    item_id: item_id.to_string(),
                    stamp,
                    path,
                },
            ));
        }

        named.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(named.into_iter().map(|(_, snapshot)| snapshot).collect())
    }

    /// The most recent snapshot of an item (greatest file name).
    pub async fn latest(&self, item_id: &str) -> ArchiveResult<Option<ArchivedSnapshot>> {
        Ok(self.list(item_id).await?.pop())
    }

    /// Fingerprint of the latest snapshot, recomputed from the stored file.
    ///
    /// Returns `None` on first capture.
    pub async fn latest_fingerprint(&self, item_id: &str) -> ArchiveResult<Option<Fingerprint>> {
        match self.latest(item_id).await? {
            Some(snapshot) => {
                let fingerprint = Fingerprint::of_file(&snapshot.path).await?;
                debug!(
                    item_id = %item_id,
                    path = %snapshot.path.display(),
                    fingerprint = %fingerprint,
                    "Loaded latest fingerprint"
                );
                Ok(Some(fingerprint))
            }
            None => Ok(None),
        }
    }

    /// Move a staged file into the item's directory under a stamp for `captured_at`.
    ///
    /// The stamp is bumped past the current latest snapshot when the clock
    /// did not advance, so a commit never replaces an existing snapshot. The
    /// move is a rename: the file appears under its final name complete or
    /// not at all.
    pub async fn commit(
        &self,
        item_id: &str,
        staging_path: &Path,
        captured_at: DateTime<Utc>,
    ) -> ArchiveResult<ArchivedSnapshot> {
        let item_dir = self.layout.item_dir(item_id)?;
        match fs::create_dir(&item_dir).await {
            Ok(()) => debug!(item_id = %item_id, path = %item_dir.display(), "Created item directory"),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e.into()),
        }

        let mut stamp = SnapshotStamp::from_datetime(captured_at);
        if let Some(latest) = self.latest(item_id).await? {
            if stamp <= latest.stamp {
                debug!(
                    item_id = %item_id,
                    requested = %stamp,
                    latest = %latest.stamp,
                    "Clock did not advance past latest snapshot, bumping stamp"
                );
                stamp = latest.stamp.next();
            }
        }

        let mut target = item_dir.join(stamp.file_name(self.layout.extension()));
        while fs::try_exists(&target).await? {
            stamp = stamp.next();
            target = item_dir.join(stamp.file_name(self.layout.extension()));
        }

        fs::rename(staging_path, &target).await?;
        info!(item_id = %item_id, path = %target.display(), "Committed snapshot");

        Ok(ArchivedSnapshot {
            item_id: item_id.to_string(),
            stamp,
            path: target,
        })
    }

    /// List the IDs of items that have an archive directory, sorted.
    pub async fn items(&self) -> ArchiveResult<Vec<String>> {
        let mut items = Vec::new();

        match fs::read_dir(self.layout.archive_dir()).await {
            Ok(mut entries) => {
                while let Some(entry) = entries.next_entry().await? {
                    if !entry.file_type().await?.is_dir() {
                        continue;
                    }
                    if let Some(name) = entry.file_name().to_str() {
                        if name != STAGING_DIR {
                            items.push(name.to_string());
                        }
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        items.sort();
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StagingArea;
    use chrono::TimeZone;
    use tempfile::TempDir;

    async fn setup_test() -> (TempDir, StagingArea, ArchiveStore) {
        let dir = TempDir::new().unwrap();
        let layout = ArchiveLayout::new(dir.path(), "json");
        layout.ensure().await.unwrap();
        (
            dir,
            StagingArea::new(layout.clone()),
            ArchiveStore::new(layout),
        )
    }

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    #[tokio::test]
    async fn test_latest_fingerprint_without_history() {
        let (_dir, _staging, store) = setup_test().await;

        assert!(store.latest_fingerprint("item1").await.unwrap().is_none());
        assert!(store.list("item1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commit_moves_staged_file() {
        let (dir, staging, store) = setup_test().await;

        let staged = staging.stage("item1", b"payload").await.unwrap();
        let snapshot = store
            .commit("item1", &staged.path, at(1_700_000_000_000))
            .await
            .unwrap();

        assert_eq!(
            snapshot.path,
            dir.path().join("archive/item1/1700000000000.json")
        );
        assert!(!staged.path.exists());
        assert_eq!(std::fs::read(&snapshot.path).unwrap(), b"payload");
        assert_eq!(
            store.latest_fingerprint("item1").await.unwrap(),
            Some(Fingerprint::of_bytes(b"payload"))
        );
    }

    #[tokio::test]
    async fn test_latest_is_greatest_name() {
        let (_dir, staging, store) = setup_test().await;

        for (millis, body) in [(3_000, "c"), (1_000, "a"), (2_000, "b")] {
            let staged = staging.stage("item1", body.as_bytes()).await.unwrap();
            // Commit out of order: the stamp rule keeps names increasing
            store.commit("item1", &staged.path, at(millis)).await.unwrap();
        }

        let history = store.list("item1").await.unwrap();
        assert_eq!(history.len(), 3);
        let latest = store.latest("item1").await.unwrap().unwrap();
        assert_eq!(std::fs::read(&latest.path).unwrap(), b"b");
        assert!(history.windows(2).all(|w| w[0].stamp < w[1].stamp));
    }

    #[tokio::test]
    async fn test_commit_with_same_time_does_not_overwrite() {
        let (_dir, staging, store) = setup_test().await;

        let first = staging.stage("item1", b"one").await.unwrap();
        let a = store.commit("item1", &first.path, at(5_000)).await.unwrap();
        let second = staging.stage("item1", b"two").await.unwrap();
        let b = store.commit("item1", &second.path, at(5_000)).await.unwrap();

        assert_ne!(a.path, b.path);
        assert_eq!(b.stamp, a.stamp.next());
        assert_eq!(std::fs::read(&a.path).unwrap(), b"one");
        assert_eq!(std::fs::read(&b.path).unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_list_skips_foreign_entries() {
        let (dir, staging, store) = setup_test().await;

        let staged = staging.stage("item1", b"x").await.unwrap();
        store.commit("item1", &staged.path, at(1_000)).await.unwrap();

        let item_dir = dir.path().join("archive/item1");
        std::fs::write(item_dir.join(".DS_Store"), "junk").unwrap();
        std::fs::write(item_dir.join("notes.txt"), "junk").unwrap();
        std::fs::write(item_dir.join("zzz.json"), "junk").unwrap();
        std::fs::create_dir(item_dir.join("9999999999999.json")).unwrap();

        let history = store.list("item1").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(
            store.latest_fingerprint("item1").await.unwrap(),
            Some(Fingerprint::of_bytes(b"x"))
        );
    }

    #[tokio::test]
    async fn test_multi_dot_extension_is_listed() {
        let dir = TempDir::new().unwrap();
        let layout = ArchiveLayout::new(dir.path(), "geo.json");
        layout.ensure().await.unwrap();
        let staging = StagingArea::new(layout.clone());
        let store = ArchiveStore::new(layout);

        let staged = staging.stage("item1", b"x").await.unwrap();
        let snapshot = store.commit("item1", &staged.path, at(1_000)).await.unwrap();
        std::fs::write(dir.path().join("archive/item1/0000000002000.json"), "junk").unwrap();

        assert_eq!(
            snapshot.path,
            dir.path().join("archive/item1/0000000001000.geo.json")
        );
        let history = store.list("item1").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].stamp, SnapshotStamp::from_millis(1_000));
        assert_eq!(
            store.latest_fingerprint("item1").await.unwrap(),
            Some(Fingerprint::of_bytes(b"x"))
        );
    }

    #[tokio::test]
    async fn test_empty_item_dir_has_no_latest() {
        let (dir, _staging, store) = setup_test().await;
        std::fs::create_dir(dir.path().join("archive/item1")).unwrap();

        assert!(store.latest_fingerprint("item1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_commit_missing_staging_file_leaves_no_entry() {
        let (dir, _staging, store) = setup_test().await;

        let missing = dir.path().join("archive/tmp/item1.json");
        let result = store.commit("item1", &missing, at(1_000)).await;

        assert!(result.is_err());
        assert!(store.list("item1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_items_excludes_staging_dir() {
        let (_dir, staging, store) = setup_test().await;

        for id in ["beta", "alpha"] {
            let staged = staging.stage(id, b"x").await.unwrap();
            store.commit(id, &staged.path, at(1_000)).await.unwrap();
        }

        assert_eq!(store.items().await.unwrap(), vec!["alpha", "beta"]);
    }
}
