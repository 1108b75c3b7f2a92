//! Snapshot data structures.

use crate::Fingerprint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Digits in a stamp. Wide enough for millisecond times until the year 2286.
const STAMP_WIDTH: usize = 13;

/// Capture time of a committed snapshot, in Unix milliseconds.
///
/// Rendered zero-padded to a fixed width so that file names sort in the
/// same order as the times they encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SnapshotStamp(u64);

impl SnapshotStamp {
    /// Create a stamp from raw milliseconds.
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Stamp for a point in time. Times before the epoch clamp to zero.
    pub fn from_datetime(time: DateTime<Utc>) -> Self {
        Self(u64::try_from(time.timestamp_millis()).unwrap_or(0))
    }

    /// Parse a file stem produced by [`SnapshotStamp::file_name`].
    pub fn parse(stem: &str) -> Option<Self> {
        if stem.len() < STAMP_WIDTH || !stem.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        stem.parse().ok().map(Self)
    }

    /// Milliseconds since the Unix epoch.
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// The smallest stamp strictly later than this one.
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// File name for a snapshot with this stamp.
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self, extension)
    }

    /// The stamp as a UTC time.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.0)
            .ok()
            .and_then(DateTime::from_timestamp_millis)
    }
}

impl std::fmt::Display for SnapshotStamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:0width$}", self.0, width = STAMP_WIDTH)
    }
}

/// A snapshot committed to an item's archive directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedSnapshot {
    /// Item the snapshot belongs to.
    pub item_id: String,

    /// Capture stamp encoded in the file name.
    pub stamp: SnapshotStamp,

    /// Full path of the snapshot file.
    pub path: PathBuf,
}

impl ArchivedSnapshot {
    /// When the snapshot was captured.
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        self.stamp.to_datetime()
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Result of one archive call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveOutcome {
    /// Item that was archived.
    pub item_id: String,

    /// Fingerprint of the captured payload.
    pub fingerprint: Fingerprint,

    /// The new snapshot, or `None` when the capture was a duplicate.
    pub committed: Option<ArchivedSnapshot>,

    /// Whether the payload matched the latest archived snapshot.
    pub duplicate: bool,
}

impl ArchiveOutcome {
    /// Path of the committed file, if one was written.
    pub fn committed_path(&self) -> Option<&Path> {
        self.committed.as_ref().map(|s| s.path.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_stamp_is_zero_padded() {
        let stamp = SnapshotStamp::from_millis(42);
        assert_eq!(stamp.to_string(), "0000000000042");
        assert_eq!(stamp.file_name("json"), "0000000000042.json");
    }

    #[test]
    fn test_stamp_names_sort_chronologically() {
        let earlier = SnapshotStamp::from_millis(999);
        let later = SnapshotStamp::from_millis(1_000);
        assert!(earlier.to_string() < later.to_string());
    }

    #[test]
    fn test_stamp_parse() {
        let stamp = SnapshotStamp::from_millis(1_700_000_000_123);
        assert_eq!(SnapshotStamp::parse(&stamp.to_string()), Some(stamp));
        assert_eq!(SnapshotStamp::parse("12"), None);
        assert_eq!(SnapshotStamp::parse("17000000001x3"), None);
    }

    #[test]
    fn test_stamp_from_datetime() {
        let time = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let stamp = SnapshotStamp::from_datetime(time);
        assert_eq!(stamp.as_millis(), 1_704_164_645_000);
        assert_eq!(stamp.to_datetime(), Some(time));
    }

    #[test]
    fn test_stamp_before_epoch_clamps() {
        let time = Utc.with_ymd_and_hms(1960, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(SnapshotStamp::from_datetime(time).as_millis(), 0);
    }

    #[test]
    fn test_stamp_next() {
        assert_eq!(
            SnapshotStamp::from_millis(7).next(),
            SnapshotStamp::from_millis(8)
        );
    }
}
