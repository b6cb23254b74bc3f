//! Dev.to top-articles provider.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use newsdeck_core::{Post, Provider, ProviderError, SourceTag};
use serde::Deserialize;

use super::SourceQuery;
use crate::fetch::{request_error, status_error};

const DEFAULT_ENDPOINT: &str = "https://dev.to/api/articles";

/// Top articles of the past week.
pub struct DevToProvider {
    http: reqwest::Client,
    endpoint: String,
}

impl DevToProvider {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http, endpoint: DEFAULT_ENDPOINT.to_string() }
    }
}

/// Raw article from the Dev.to articles API. The response body is a bare array.
#[derive(Debug, Deserialize)]
struct Article {
    id: u64,
    title: String,
    url: String,
    #[serde(default)]
    positive_reactions_count: i64,
    #[serde(default)]
    comments_count: u32,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
    user: Option<Author>,
}

#[derive(Debug, Deserialize)]
struct Author {
    username: String,
}

fn normalize(articles: Vec<Article>) -> Vec<Post> {
    articles
        .into_iter()
        .map(|article| Post {
            id: format!("devto-{}", article.id),
            title: article.title,
            url: article.url,
            score: article.positive_reactions_count,
            author: article.user.map(|u| u.username).unwrap_or_default(),
            created_at: article.published_at.unwrap_or(DateTime::UNIX_EPOCH),
            comment_count: article.comments_count,
            source: SourceTag::DevTo,
        })
        .collect()
}

#[async_trait]
impl Provider<SourceQuery, Vec<Post>> for DevToProvider {
    fn name(&self) -> &str {
        "devto"
    }

    async fn attempt(&self, query: &SourceQuery) -> Result<Vec<Post>, ProviderError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("top", "7"), ("per_page", query.limit.to_string().as_str())])
            .send()
            .await
            .map_err(request_error)?;

        if let Some(e) = status_error(response.status()) {
            return Err(e);
        }

        let bytes = response.bytes().await.map_err(request_error)?;
        let parsed: Vec<Article> =
            serde_json::from_slice(&bytes).map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(normalize(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE_JSON: &str = r#"[
        {
            "id": 201,
            "title": "Understanding async cancellation",
            "url": "https://dev.to/someone/understanding-async-cancellation-1a2b",
            "positive_reactions_count": 230,
            "comments_count": 19,
            "published_at": "2026-08-02T10:00:00Z",
            "user": { "username": "someone" }
        },
        {
            "id": 202,
            "title": "A post with missing fields",
            "url": "https://dev.to/other/a-post-3c4d",
            "user": null
        }
    ]"#;

    #[test]
    fn test_deserialize_and_normalize() {
        let parsed: Vec<Article> = serde_json::from_str(FIXTURE_JSON).unwrap();
        let posts = normalize(parsed);

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, "devto-201");
        assert_eq!(posts[0].score, 230);
        assert_eq!(posts[0].author, "someone");
        assert_eq!(posts[0].source, SourceTag::DevTo);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let parsed: Vec<Article> = serde_json::from_str(FIXTURE_JSON).unwrap();
        let posts = normalize(parsed);
        assert_eq!(posts[1].score, 0);
        assert_eq!(posts[1].comment_count, 0);
        assert_eq!(posts[1].author, "");
        assert_eq!(posts[1].created_at, DateTime::UNIX_EPOCH);
    }
}
