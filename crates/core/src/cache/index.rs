//! Cache index persistence.
//!
//! One `index.json` per tier maps cache key -> entry metadata. The index is
//! the authoritative directory of what is cached: an artifact file without
//! an entry is not cached, and an entry whose artifact file is missing reads
//! as a miss.
//!
//! `save` writes the full document to a temp file in the same directory and
//! renames it over the canonical path, so a reader never observes a
//! partially written index. `load` treats a missing or unparseable file as an
//! empty index; it self-heals on the next successful save.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// File name of the canonical index document inside a tier directory.
pub const INDEX_FILE: &str = "index.json";

/// Small descriptive record attached to a cache entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMeta {
    /// Human-readable label (an article title, a search query).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Remote URL the artifact was produced from, when there was one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_url: Option<String>,
}

/// One cached artifact's index record.
///
/// Entries are replaced whole on re-`put`; there are no partial updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Normalized content-addressed key.
    pub key: String,

    /// Artifact file name, relative to the tier directory.
    pub artifact: String,

    /// Creation time; expiry is measured from here.
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub meta: EntryMeta,
}

/// The serialized key -> entry mapping for one cache tier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheIndex {
    #[serde(default)]
    pub entries: BTreeMap<String, CacheEntry>,
}

impl CacheIndex {
    /// Load the index document at `path`.
    ///
    /// Any read or parse failure yields an empty index. A corrupt index is
    /// not fatal; it is overwritten by the next save.
    pub async fn load(path: &Path) -> Self {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read cache index, starting empty");
                return Self::default();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(index) => index,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "corrupt cache index, starting empty");
                Self::default()
            }
        }
    }

    /// Persist the full index document to `path` atomically.
    ///
    /// Serializes to `<path>.tmp-<pid>` in the same directory, then renames
    /// over the canonical file.
    pub async fn save(&self, path: &Path) -> Result<(), Error> {
        let json = serde_json::to_vec_pretty(self)?;

        let tmp = path.with_extension(format!("json.tmp-{}", std::process::id()));
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, path).await?;

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
