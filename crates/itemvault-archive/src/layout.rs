//! On-disk layout of an archive root.
//!
//! ```text
//! <root>/
//!   archive/
//!     tmp/
//!       <item_id>.<ext>      # staging slot, one per item
//!     <item_id>/
//!       <stamp>.<ext>        # committed snapshots
//! ```

use crate::{ArchiveError, ArchiveResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Name of the archive directory under the working directory.
pub const ARCHIVE_DIR: &str = "archive";

/// Name of the staging directory under the archive directory.
pub const STAGING_DIR: &str = "tmp";

/// Paths of an archive rooted at a working directory.
#[derive(Debug, Clone)]
pub struct ArchiveLayout {
    root: PathBuf,
    extension: String,
}

impl ArchiveLayout {
    /// Create a layout for the given working directory and snapshot file extension.
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        let extension: String = extension.into();
        Self {
            root: root.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// The working directory the archive lives under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File extension of snapshot files, without the dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// `<root>/archive`
    pub fn archive_dir(&self) -> PathBuf {
        self.root.join(ARCHIVE_DIR)
    }

    /// `<root>/archive/tmp`
    pub fn staging_dir(&self) -> PathBuf {
        self.archive_dir().join(STAGING_DIR)
    }

    /// Directory holding the committed snapshots of an item.
    pub fn item_dir(&self, item_id: &str) -> ArchiveResult<PathBuf> {
        validate_item_id(item_id)?;
        Ok(self.archive_dir().join(item_id))
    }

    /// Staging slot for an item.
    pub fn staging_path(&self, item_id: &str) -> ArchiveResult<PathBuf> {
        validate_item_id(item_id)?;
        Ok(self
            .staging_dir()
            .join(format!("{}.{}", item_id, self.extension)))
    }

    /// Ensure the archive and staging directories exist.
    ///
    /// Idempotent. An existing directory is success; anything else that
    /// prevents the directory from being there is a [`ArchiveError::Layout`].
    pub async fn ensure(&self) -> ArchiveResult<()> {
        ensure_dir(&self.archive_dir()).await?;
        ensure_dir(&self.staging_dir()).await
    }
}

/// Create a single directory, treating an existing directory as success.
async fn ensure_dir(path: &Path) -> ArchiveResult<()> {
    match fs::create_dir(path).await {
        Ok(()) => {
            debug!(path = %path.display(), "Created directory");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            let metadata = fs::metadata(path)
                .await
                .map_err(|e| ArchiveError::layout(path, e))?;
            if metadata.is_dir() {
                Ok(())
            } else {
                Err(ArchiveError::layout(
                    path,
                    std::io::Error::new(
                        std::io::ErrorKind::AlreadyExists,
                        "path exists and is not a directory",
                    ),
                ))
            }
        }
        Err(e) => Err(ArchiveError::layout(path, e)),
    }
}

/// Check that an item ID can be used as a single path component.
pub fn validate_item_id(item_id: &str) -> ArchiveResult<()> {
    if item_id.is_empty()
        || item_id == "."
        || item_id == ".."
        || item_id == STAGING_DIR
        || item_id.contains('/')
        || item_id.contains('\\')
        || item_id.contains('\0')
    {
        return Err(ArchiveError::invalid_item_id(item_id));
    }
    Ok(())
}
