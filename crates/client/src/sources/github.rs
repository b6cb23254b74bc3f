//! GitHub trending provider, approximated with the repository search API.
//!
//! GitHub has no public trending endpoint; searching repositories created in
//! the last week ordered by stars is the conventional stand-in. Stars map to
//! score and open issues fill the unioned comment-count field.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use newsdeck_core::{Post, Provider, ProviderError, SourceTag};
use serde::Deserialize;

use super::SourceQuery;
use crate::fetch::{request_error, status_error};

const DEFAULT_ENDPOINT: &str = "https://api.github.com/search/repositories";

/// Recently created repositories with the most stars.
pub struct GitHubProvider {
    http: reqwest::Client,
    endpoint: String,
}

impl GitHubProvider {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http, endpoint: DEFAULT_ENDPOINT.to_string() }
    }
}

/// Raw response from the repository search API.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Vec<Repository>,
}

#[derive(Debug, Deserialize)]
struct Repository {
    id: u64,
    full_name: String,
    html_url: String,
    #[serde(default)]
    stargazers_count: i64,
    #[serde(default)]
    open_issues_count: u32,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    owner: Option<Owner>,
}

#[derive(Debug, Deserialize)]
struct Owner {
    login: String,
}

fn normalize(response: SearchResponse) -> Vec<Post> {
    response
        .items
        .into_iter()
        .map(|repo| Post {
            id: format!("github-{}", repo.id),
            title: repo.full_name,
            url: repo.html_url,
            score: repo.stargazers_count,
            author: repo.owner.map(|o| o.login).unwrap_or_default(),
            created_at: repo.created_at.unwrap_or(DateTime::UNIX_EPOCH),
            comment_count: repo.open_issues_count,
            source: SourceTag::GitHub,
        })
        .collect()
}

#[async_trait]
impl Provider<SourceQuery, Vec<Post>> for GitHubProvider {
    fn name(&self) -> &str {
        "github"
    }

    async fn attempt(&self, query: &SourceQuery) -> Result<Vec<Post>, ProviderError> {
        let window_start = (Utc::now() - Duration::days(7)).format("%Y-%m-%d").to_string();
        let response = self
            .http
            .get(&self.endpoint)
            .header("Accept", "application/vnd.github+json")
            .query(&[
                ("q", format!("created:>{window_start}").as_str()),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", query.limit.to_string().as_str()),
            ])
            .send()
            .await
            .map_err(request_error)?;

        if let Some(e) = status_error(response.status()) {
            return Err(e);
        }

        let bytes = response.bytes().await.map_err(request_error)?;
        let parsed: SearchResponse =
            serde_json::from_slice(&bytes).map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(normalize(parsed))
    }
}
