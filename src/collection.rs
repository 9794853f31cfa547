// this_file: src/collection.rs

//! JSON-file-backed collection of saved creations.
//!
//! Each item pairs the source image (as a data URI) with its poem; the
//! compositing core never reads this store, it only produces the buffers a
//! caller may choose to persist here.

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// One saved creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectionItem {
    /// Collision-resistant identifier
    pub id: String,
    /// Source image as a data URI
    pub image_data_uri: String,
    /// Generated poem text
    pub poem: String,
    /// ISO8601 UTC creation timestamp
    pub created_at: String,
    /// Optional user-given name for the creation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

static ITEM_SEQ: AtomicU64 = AtomicU64::new(0);

impl CollectionItem {
    /// Build a new item stamped with the current time and a fresh id.
    pub fn new(image_data_uri: impl Into<String>, poem: impl Into<String>) -> Result<Self> {
        let now = OffsetDateTime::now_utc();
        let created_at = now
            .format(&Rfc3339)
            .map_err(|e| Error::Storage(format!("Timestamp formatting failed: {}", e)))?;
        let seq = ITEM_SEQ.fetch_add(1, Ordering::Relaxed);
        let id = format!("{:x}-{:x}", now.unix_timestamp_nanos(), seq);
        Ok(Self {
            id,
            image_data_uri: image_data_uri.into(),
            poem: poem.into(),
            created_at,
            title: None,
        })
    }
}

/// Collection store over a single JSON file.
pub struct CollectionStore {
    path: Utf8PathBuf,
}

impl CollectionStore {
    /// Open a store at `path`; the file is created on first save.
    pub fn new(path: impl AsRef<Utf8Path>) -> Self {
        Self {
            path: path.as_ref().to_owned(),
        }
    }

    /// All saved items, newest first. A missing file is an empty collection.
    pub fn list(&self) -> Result<Vec<CollectionItem>> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(Error::Storage(format!(
                "Failed to read collection {}: {}",
                self.path, e
            ))),
        }
    }

    /// Save an item at the front of the collection.
    pub fn save(&self, item: CollectionItem) -> Result<()> {
        let mut items = self.list()?;
        items.insert(0, item);
        self.write(&items)
    }

    /// Remove the item with the given id; unknown ids are a no-op.
    pub fn remove(&self, item_id: &str) -> Result<()> {
        let mut items = self.list()?;
        items.retain(|item| item.id != item_id);
        self.write(&items)
    }

    /// Replace an existing item in place; unknown ids are a no-op.
    pub fn update(&self, updated: CollectionItem) -> Result<()> {
        let mut items = self.list()?;
        if let Some(slot) = items.iter_mut().find(|item| item.id == updated.id) {
            *slot = updated;
            self.write(&items)?;
        }
        Ok(())
    }

    fn write(&self, items: &[CollectionItem]) -> Result<()> {
        let json = serde_json::to_string_pretty(items)?;
        std::fs::write(&self.path, json).map_err(|e| {
            Error::Storage(format!("Failed to write collection {}: {}", self.path, e))
        })?;
        log::debug!("Wrote {} collection items to {}", items.len(), self.path);
        Ok(())
    }
}
