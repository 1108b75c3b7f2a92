//! Item sources for itemvault.
//!
//! A source produces the current state of a remote item as an opaque byte
//! payload plus a metadata record. The archive never looks inside the
//! payload; it only fingerprints it.
//!
//! Available sources:
//! - [`ArcGisSource`]: ArcGIS Online / Portal items over the REST API
//! - [`StaticSource`]: canned payloads, for tests and dry runs

pub mod arcgis;
pub mod error;
pub mod mock;

pub use arcgis::{ArcGisCredentials, ArcGisSource, DEFAULT_PORTAL_URL};
pub use error::{SourceError, SourceResult};
pub use mock::StaticSource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The captured state of one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedItem {
    /// Identifier the item was fetched by.
    pub item_id: String,

    /// Bytes to archive.
    pub payload: Vec<u8>,

    /// Descriptive metadata passed through to the caller.
    pub details: serde_json::Value,
}

impl FetchedItem {
    /// Create a fetched item.
    pub fn new(
        item_id: impl Into<String>,
        payload: impl Into<Vec<u8>>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            payload: payload.into(),
            details,
        }
    }

    /// Human-readable title from the metadata, if the source provides one.
    pub fn title(&self) -> Option<&str> {
        self.details.get("title").and_then(|t| t.as_str())
    }
}

/// A remote system items can be fetched from.
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Short name of the source, for logs.
    fn name(&self) -> &str;

    /// Fetch the current state of an item.
    async fn fetch(&self, item_id: &str) -> SourceResult<FetchedItem>;
}
