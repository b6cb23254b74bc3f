//! Unsplash image-search provider.

use async_trait::async_trait;
use newsdeck_core::{Provider, ProviderError};
use serde::Deserialize;

use crate::fetch::{request_error, status_error};

const DEFAULT_ENDPOINT: &str = "https://api.unsplash.com/search/photos";

pub struct UnsplashProvider {
    http: reqwest::Client,
    access_key: Option<String>,
    endpoint: String,
}

impl UnsplashProvider {
    pub fn new(http: reqwest::Client, access_key: Option<String>) -> Self {
        Self { http, access_key, endpoint: DEFAULT_ENDPOINT.to_string() }
    }
}

/// Relevant slice of the photo search response.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: String,
}

fn first_url(response: SearchResponse) -> Option<String> {
    response.results.into_iter().next().map(|photo| photo.urls.regular)
}

#[async_trait]
impl Provider<String, String> for UnsplashProvider {
    fn name(&self) -> &str {
        "unsplash"
    }

    async fn attempt(&self, query: &String) -> Result<String, ProviderError> {
        let access_key = self
            .access_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ProviderError::MissingCredentials("NEWSDECK_UNSPLASH_ACCESS_KEY".to_string()))?;

        let response = self
            .http
            .get(&self.endpoint)
            .header("Authorization", format!("Client-ID {access_key}"))
            .query(&[("query", query.as_str()), ("per_page", "1"), ("orientation", "landscape")])
            .send()
            .await
            .map_err(request_error)?;

        if let Some(e) = status_error(response.status()) {
            return Err(e);
        }

        let bytes = response.bytes().await.map_err(request_error)?;
        let parsed: SearchResponse =
            serde_json::from_slice(&bytes).map_err(|e| ProviderError::Parse(e.to_string()))?;

        first_url(parsed).ok_or_else(|| ProviderError::InvalidPayload("no search results".to_string()))
    }
}
