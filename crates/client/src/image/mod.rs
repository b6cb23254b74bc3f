//! Cache-backed representative-image resolution.
//!
//! Flow: consult the image cache tier, then run the image cascade
//! (Unsplash -> deterministic placeholder URL). A provider hit triggers a
//! best-effort artifact download into the tier; a failed download or a
//! failed store still yields the remote URL uncached. Placeholder URLs are
//! free to recompute and are never cached.

pub mod unsplash;

use std::path::PathBuf;

use newsdeck_core::cache::{ArtifactStore, EntryMeta, ExpiryPolicy, key};
use newsdeck_core::model::fnv1a_32;
use newsdeck_core::{AppConfig, Cascade, Error, Resolution};
use serde::Serialize;

use crate::fetch;

pub use unsplash::UnsplashProvider;

/// Bound on a downloaded image artifact.
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Deterministic placeholder for a query no provider could serve.
pub fn placeholder_url(query: &str) -> String {
    let seed = fnv1a_32(&key::normalize(query));
    format!("https://picsum.photos/seed/{seed:08x}/1200/630")
}

/// Where a resolved image came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageOrigin {
    Cache,
    Provider(String),
    Placeholder,
}

/// A resolved image: always a URL, plus a local artifact path when cached.
#[derive(Debug, Clone, Serialize)]
pub struct ImageRef {
    pub url: String,
    pub path: Option<PathBuf>,
    pub origin: ImageOrigin,
}

/// Image cascade wired to the image cache tier.
pub struct ImageService {
    store: ArtifactStore,
    cascade: Cascade<String, String>,
    http: reqwest::Client,
}

impl ImageService {
    /// Open the image tier and assemble the cascade from configuration.
    pub async fn open(http: reqwest::Client, config: &AppConfig) -> Result<Self, Error> {
        let store = ArtifactStore::open(config.image_dir(), "img", ExpiryPolicy::days(config.cache_ttl_days)).await?;

        let cascade = Cascade::new(|query: &String| placeholder_url(query))
            .with_attempt_timeout(config.attempt_timeout())
            .with_provider(UnsplashProvider::new(http.clone(), config.unsplash_access_key.clone()));

        Ok(Self { store, cascade, http })
    }

    /// Resolve a representative image for a search query. Never fails.
    pub async fn resolve(&self, query: &str) -> ImageRef {
        if let Some(hit) = self.store.get(query).await {
            return ImageRef {
                url: hit.entry.meta.origin_url.clone().unwrap_or_default(),
                path: Some(hit.path),
                origin: ImageOrigin::Cache,
            };
        }

        let outcome = self.cascade.run(&query.to_string()).await;
        let url = outcome.value;

        let provider = match outcome.resolved_by {
            Resolution::Provider(name) => name,
            Resolution::Fallback => {
                return ImageRef { url, path: None, origin: ImageOrigin::Placeholder };
            }
        };

        let path = match fetch::fetch_bytes(&self.http, &url, MAX_IMAGE_BYTES).await {
            Ok(bytes) => {
                let meta = EntryMeta { title: Some(query.to_string()), origin_url: Some(url.clone()) };
                match self.store.put(query, &bytes, meta).await {
                    Ok(path) => Some(path),
                    Err(e) => {
                        tracing::warn!(query, error = %e, "failed to cache image, returning remote url");
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "image download failed, returning remote url uncached");
                None
            }
        };

        ImageRef { url, path, origin: ImageOrigin::Provider(provider) }
    }

    /// The underlying cache tier, for maintenance tooling.
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &std::path::Path) -> AppConfig {
        AppConfig { cache_dir: dir.to_path_buf(), ..Default::default() }
    }

    #[test]
    fn test_placeholder_is_deterministic() {
        assert_eq!(placeholder_url("rust async"), placeholder_url("rust async"));
        assert_eq!(placeholder_url("Rust Async"), placeholder_url("  rust async "));
        assert_ne!(placeholder_url("rust"), placeholder_url("zig"));
    }

    #[tokio::test]
    async fn test_no_credentials_resolves_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let service = ImageService::open(reqwest::Client::new(), &config_in(dir.path())).await.unwrap();

        let image = service.resolve("rust async").await;

        assert_eq!(image.origin, ImageOrigin::Placeholder);
        assert_eq!(image.url, placeholder_url("rust async"));
        assert!(image.path.is_none());
    }

    #[tokio::test]
    async fn test_placeholder_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let service = ImageService::open(reqwest::Client::new(), &config_in(dir.path())).await.unwrap();

        service.resolve("rust async").await;

        let stats = service.store().stats().await;
        assert_eq!(stats.entries, 0);
    }
}
