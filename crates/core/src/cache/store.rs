//! Artifact store: content-addressed get/put over one cache tier.
//!
//! A store owns one directory holding artifact files plus the tier's
//! `index.json`. Lookups are side-effect free; all mutation (put, invalidate,
//! clear, purge) runs under a single writer lock held across the whole
//! mutate-and-save section, with crash-safety coming from the index's
//! temp-file + rename discipline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use super::expiry::{Clock, ExpiryPolicy, SystemClock};
use super::index::{CacheEntry, CacheIndex, EntryMeta, INDEX_FILE};
use super::key;
use crate::error::Error;

/// A cache hit: where the artifact lives and what the index records about it.
#[derive(Debug, Clone)]
pub struct CachedArtifact {
    pub path: PathBuf,
    pub entry: CacheEntry,
}

/// Counts reported by [`ArtifactStore::stats`].
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Number of index entries.
    pub entries: usize,
    /// Entries past their TTL that the next write-path sweep will drop.
    pub expired: usize,
    /// Approximate bytes held by artifact files still listed in the index.
    pub total_bytes: u64,
}

/// One on-disk cache tier.
pub struct ArtifactStore {
    dir: PathBuf,
    index_path: PathBuf,
    file_ext: String,
    expiry: ExpiryPolicy,
    clock: Arc<dyn Clock>,
    index: RwLock<CacheIndex>,
}

impl ArtifactStore {
    /// Open a tier rooted at `dir`, creating the directory if needed.
    ///
    /// `file_ext` is the extension given to every artifact in this tier
    /// ("txt" for summaries, "img" for images). A missing or corrupt index
    /// file starts the tier empty.
    pub async fn open(dir: impl AsRef<Path>, file_ext: &str, expiry: ExpiryPolicy) -> Result<Self, Error> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;

        let index_path = dir.join(INDEX_FILE);
        let index = CacheIndex::load(&index_path).await;

        Ok(Self {
            dir,
            index_path,
            file_ext: file_ext.to_string(),
            expiry,
            clock: Arc::new(SystemClock),
            index: RwLock::new(index),
        })
    }

    /// Replace the time source. Tests use this to control expiry.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn artifact_name(&self, cache_key: &str) -> String {
        format!("{cache_key}.{}", self.file_ext)
    }

    /// Look up an identity in the tier.
    ///
    /// Returns `None` when the key is absent, the entry is expired, or the
    /// artifact file has gone missing. Lookups never mutate the index; stale
    /// and dangling entries are left for the write-path sweep.
    pub async fn get(&self, identity: &str) -> Option<CachedArtifact> {
        let cache_key = key::cache_key(identity);

        let entry = {
            let index = self.index.read().await;
            index.entries.get(&cache_key).cloned()
        }?;

        if self.expiry.is_expired(&entry, self.clock.now()) {
            tracing::debug!(key = %cache_key, "cache entry expired");
            return None;
        }

        let path = self.dir.join(&entry.artifact);
        match tokio::fs::try_exists(&path).await {
            Ok(true) => Some(CachedArtifact { path, entry }),
            _ => {
                tracing::debug!(key = %cache_key, "cache entry has no artifact file, treating as miss");
                None
            }
        }
    }

    /// Look up an identity and read the artifact payload.
    ///
    /// A read failure after a hit is treated as a miss.
    pub async fn get_bytes(&self, identity: &str) -> Option<Vec<u8>> {
        let hit = self.get(identity).await?;
        match tokio::fs::read(&hit.path).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(path = %hit.path.display(), error = %e, "failed to read cached artifact");
                None
            }
        }
    }

    /// Persist a payload under an identity and record it in the index.
    ///
    /// The artifact is written to a temp name and renamed into place, then
    /// the index is swept of expired entries, updated, and saved atomically.
    /// Returns the artifact path. Errors surface to the caller: caching is
    /// best-effort and the caller still holds the fresh payload.
    pub async fn put(&self, identity: &str, payload: &[u8], meta: EntryMeta) -> Result<PathBuf, Error> {
        let normalized = key::normalize(identity);
        if normalized.is_empty() {
            return Err(Error::InvalidKey(identity.to_string()));
        }
        let cache_key = key::cache_key(identity);
        let artifact = self.artifact_name(&cache_key);
        let path = self.dir.join(&artifact);

        let mut index = self.index.write().await;

        let now = self.clock.now();
        let swept = Self::sweep_expired(&mut index, &self.expiry, now);
        self.unlink_artifacts(&swept).await;

        let tmp = self.dir.join(format!("{artifact}.tmp-{}", std::process::id()));
        tokio::fs::write(&tmp, payload).await?;
        tokio::fs::rename(&tmp, &path).await?;

        index
            .entries
            .insert(cache_key.clone(), CacheEntry { key: cache_key, artifact, created_at: now, meta });
        index.save(&self.index_path).await?;

        Ok(path)
    }

    /// Consult the cache first; on a miss run `producer` and persist its
    /// payload best-effort.
    ///
    /// Returns the payload and whether it came from the cache. A storage
    /// failure is logged and the fresh payload returned uncached — the cache
    /// is an optimization, never a correctness dependency.
    pub async fn get_or_create<F, Fut>(&self, identity: &str, meta: EntryMeta, producer: F) -> (Vec<u8>, bool)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Vec<u8>>,
    {
        if let Some(bytes) = self.get_bytes(identity).await {
            return (bytes, true);
        }

        let payload = producer().await;
        if let Err(e) = self.put(identity, &payload, meta).await {
            tracing::warn!(identity, error = %e, "failed to cache artifact, returning uncached payload");
        }
        (payload, false)
    }

    /// Remove one entry and its artifact file.
    pub async fn invalidate(&self, identity: &str) -> Result<(), Error> {
        let cache_key = key::cache_key(identity);

        let mut index = self.index.write().await;
        if let Some(entry) = index.entries.remove(&cache_key) {
            self.unlink_artifacts(std::slice::from_ref(&entry)).await;
            index.save(&self.index_path).await?;
        }
        Ok(())
    }

    /// Remove every entry and every artifact file in the tier.
    ///
    /// Also deletes orphaned artifact files the index never knew about.
    pub async fn clear(&self) -> Result<(), Error> {
        let mut index = self.index.write().await;

        let mut read_dir = tokio::fs::read_dir(&self.dir).await?;
        while let Some(dirent) = read_dir.next_entry().await? {
            if dirent.file_name() == INDEX_FILE {
                continue;
            }
            if let Err(e) = tokio::fs::remove_file(dirent.path()).await {
                tracing::warn!(path = %dirent.path().display(), error = %e, "failed to remove artifact");
            }
        }

        index.entries.clear();
        index.save(&self.index_path).await?;
        Ok(())
    }

    /// Explicit maintenance sweep: drop expired entries and entries whose
    /// artifact file has gone missing. Returns how many entries were removed.
    pub async fn purge(&self) -> Result<usize, Error> {
        let mut index = self.index.write().await;

        let now = self.clock.now();
        let swept = Self::sweep_expired(&mut index, &self.expiry, now);
        self.unlink_artifacts(&swept).await;
        let mut removed = swept.len();

        let mut dangling = Vec::new();
        for (cache_key, entry) in index.entries.iter() {
            if !matches!(tokio::fs::try_exists(self.dir.join(&entry.artifact)).await, Ok(true)) {
                dangling.push(cache_key.clone());
            }
        }
        for cache_key in dangling {
            index.entries.remove(&cache_key);
            removed += 1;
        }

        index.save(&self.index_path).await?;
        Ok(removed)
    }

    /// Report entry counts and approximate disk usage.
    pub async fn stats(&self) -> CacheStats {
        let index = self.index.read().await;
        let now = self.clock.now();

        let mut expired = 0;
        let mut total_bytes = 0;
        for entry in index.entries.values() {
            if self.expiry.is_expired(entry, now) {
                expired += 1;
            }
            if let Ok(md) = tokio::fs::metadata(self.dir.join(&entry.artifact)).await {
                total_bytes += md.len();
            }
        }

        CacheStats { entries: index.len(), expired, total_bytes }
    }

    /// Drop expired entries from the in-memory index, returning what was
    /// removed so the caller can unlink the artifact files.
    fn sweep_expired(index: &mut CacheIndex, expiry: &ExpiryPolicy, now: chrono::DateTime<chrono::Utc>) -> Vec<CacheEntry> {
        let stale: Vec<String> = index
            .entries
            .iter()
            .filter(|(_, entry)| expiry.is_expired(entry, now))
            .map(|(k, _)| k.clone())
            .collect();

        stale
            .into_iter()
            .filter_map(|k| index.entries.remove(&k))
            .collect()
    }

    async fn unlink_artifacts(&self, entries: &[CacheEntry]) {
        for entry in entries {
            let path = self.dir.join(&entry.artifact);
            if let Err(e) = tokio::fs::remove_file(&path).await
                && e.kind() != std::io::ErrorKind::NotFound
            {
                tracing::debug!(path = %path.display(), error = %e, "failed to remove swept artifact");
            }
        }
    }
}
