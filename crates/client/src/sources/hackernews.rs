//! Hacker News front-page provider via the Algolia search API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use newsdeck_core::{Post, Provider, ProviderError, SourceTag};
use serde::Deserialize;

use super::SourceQuery;
use crate::fetch::{request_error, status_error};

const DEFAULT_ENDPOINT: &str = "https://hn.algolia.com/api/v1/search";

/// Hacker News front page.
pub struct HackerNewsProvider {
    http: reqwest::Client,
    endpoint: String,
}

impl HackerNewsProvider {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http, endpoint: DEFAULT_ENDPOINT.to_string() }
    }
}

/// Raw response from the Algolia search API.
#[derive(Debug, Deserialize)]
struct AlgoliaResponse {
    hits: Vec<AlgoliaHit>,
}

#[derive(Debug, Deserialize)]
struct AlgoliaHit {
    #[serde(rename = "objectID")]
    object_id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    points: Option<i64>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    num_comments: Option<u32>,
}

fn normalize(response: AlgoliaResponse) -> Vec<Post> {
    response
        .hits
        .into_iter()
        .filter_map(|hit| {
            let title = hit.title?;
            // Ask/Show posts without an external link point at the item page.
            let url = match hit.url {
                Some(url) if !url.is_empty() => url,
                _ => format!("https://news.ycombinator.com/item?id={}", hit.object_id),
            };
            Some(Post {
                id: format!("hn-{}", hit.object_id),
                title,
                url,
                score: hit.points.unwrap_or(0),
                author: hit.author.unwrap_or_default(),
                created_at: hit.created_at.unwrap_or(DateTime::UNIX_EPOCH),
                comment_count: hit.num_comments.unwrap_or(0),
                source: SourceTag::HackerNews,
            })
        })
        .collect()
}

#[async_trait]
impl Provider<SourceQuery, Vec<Post>> for HackerNewsProvider {
    fn name(&self) -> &str {
        "hackernews"
    }

    async fn attempt(&self, query: &SourceQuery) -> Result<Vec<Post>, ProviderError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("tags", "front_page"), ("hitsPerPage", query.limit.to_string().as_str())])
            .send()
            .await
            .map_err(request_error)?;

        if let Some(e) = status_error(response.status()) {
            return Err(e);
        }

        let bytes = response.bytes().await.map_err(request_error)?;
        let parsed: AlgoliaResponse =
            serde_json::from_slice(&bytes).map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(normalize(parsed))
    }
}
