//! Static source for testing.

use crate::{FetchedItem, ItemSource, SourceError, SourceResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A source that serves payloads set by the caller.
///
/// Payloads can be replaced between fetches to simulate an item changing.
#[derive(Clone, Default)]
pub struct StaticSource {
    items: Arc<Mutex<HashMap<String, FetchedItem>>>,
    fetch_count: Arc<Mutex<usize>>,
}

impl StaticSource {
    /// Create an empty static source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source serving a single item.
    pub fn with_item(item: FetchedItem) -> Self {
        let source = Self::new();
        source.set(item);
        source
    }

    /// Set or replace the state served for an item.
    pub fn set(&self, item: FetchedItem) {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.insert(item.item_id.clone(), item);
    }

    /// Number of fetches served so far, including failed ones.
    pub fn fetch_count(&self) -> usize {
        *self.fetch_count.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ItemSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self, item_id: &str) -> SourceResult<FetchedItem> {
        {
            let mut count = self.fetch_count.lock().unwrap_or_else(|e| e.into_inner());
            *count += 1;
        }

        let items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items
            .get(item_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(item_id.to_string()))
    }
}
