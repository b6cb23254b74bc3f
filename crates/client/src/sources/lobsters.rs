//! Lobsters hottest-feed provider.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use newsdeck_core::{Post, Provider, ProviderError, SourceTag};
use serde::Deserialize;

use super::SourceQuery;
use crate::fetch::{request_error, status_error};

const DEFAULT_ENDPOINT: &str = "https://lobste.rs/hottest.json";

/// Lobsters hottest stories.
pub struct LobstersProvider {
    http: reqwest::Client,
    endpoint: String,
}

impl LobstersProvider {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http, endpoint: DEFAULT_ENDPOINT.to_string() }
    }
}

/// Raw story from the hottest feed. The response body is a bare array.
#[derive(Debug, Deserialize)]
struct Story {
    short_id: String,
    title: String,
    /// Empty for text-only posts; the comments page stands in.
    #[serde(default)]
    url: String,
    comments_url: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    comment_count: u32,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    submitter_user: String,
}

fn normalize(stories: Vec<Story>, limit: usize) -> Vec<Post> {
    stories
        .into_iter()
        .take(limit)
        .map(|story| {
            let url = if story.url.is_empty() { story.comments_url } else { story.url };
            Post {
                id: format!("lobsters-{}", story.short_id),
                title: story.title,
                url,
                score: story.score,
                author: story.submitter_user,
                created_at: story.created_at.unwrap_or(DateTime::UNIX_EPOCH),
                comment_count: story.comment_count,
                source: SourceTag::Lobsters,
            }
        })
        .collect()
}

#[async_trait]
impl Provider<SourceQuery, Vec<Post>> for LobstersProvider {
    fn name(&self) -> &str {
        "lobsters"
    }

    async fn attempt(&self, query: &SourceQuery) -> Result<Vec<Post>, ProviderError> {
        // The hottest feed takes no paging parameters; truncate locally.
        let response = self.http.get(&self.endpoint).send().await.map_err(request_error)?;

        if let Some(e) = status_error(response.status()) {
            return Err(e);
        }

        let bytes = response.bytes().await.map_err(request_error)?;
        let parsed: Vec<Story> =
            serde_json::from_slice(&bytes).map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(normalize(parsed, query.limit))
    }
}
