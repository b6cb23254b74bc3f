//! Reddit hot-list provider.
//!
//! The listing endpoint is served identically from two hosts; the mirror is
//! registered as a second cascade stage so a failing primary gets one more
//! in-cascade chance before the source falls back to an empty list.

use async_trait::async_trait;
use chrono::DateTime;
use newsdeck_core::{Post, Provider, ProviderError, SourceTag};
use serde::Deserialize;

use super::SourceQuery;
use crate::fetch::{request_error, status_error};

const PRIMARY_HOST: &str = "https://www.reddit.com";
const MIRROR_HOST: &str = "https://old.reddit.com";

/// Hot listing of one subreddit.
pub struct RedditProvider {
    http: reqwest::Client,
    base: String,
    subreddit: String,
    name: &'static str,
}

impl RedditProvider {
    pub fn primary(http: reqwest::Client, subreddit: &str) -> Self {
        Self { http, base: PRIMARY_HOST.to_string(), subreddit: subreddit.to_string(), name: "reddit" }
    }

    pub fn mirror(http: reqwest::Client, subreddit: &str) -> Self {
        Self { http, base: MIRROR_HOST.to_string(), subreddit: subreddit.to_string(), name: "reddit-mirror" }
    }
}

/// Raw listing envelope from the Reddit JSON API.
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: RedditPost,
}

#[derive(Debug, Deserialize)]
struct RedditPost {
    id: String,
    title: String,
    #[serde(default)]
    url: Option<String>,
    permalink: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    author: String,
    #[serde(default)]
    created_utc: f64,
    #[serde(default)]
    num_comments: u32,
    #[serde(default)]
    stickied: bool,
}

fn normalize(listing: Listing) -> Vec<Post> {
    listing
        .data
        .children
        .into_iter()
        .map(|child| child.data)
        .filter(|post| !post.stickied)
        .map(|post| {
            let url = match post.url {
                Some(url) if !url.is_empty() => url,
                _ => format!("https://www.reddit.com{}", post.permalink),
            };
            Post {
                id: format!("reddit-{}", post.id),
                title: post.title,
                url,
                score: post.score,
                author: post.author,
                created_at: DateTime::from_timestamp(post.created_utc as i64, 0).unwrap_or(DateTime::UNIX_EPOCH),
                comment_count: post.num_comments,
                source: SourceTag::Reddit,
            }
        })
        .collect()
}

#[async_trait]
impl Provider<SourceQuery, Vec<Post>> for RedditProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn attempt(&self, query: &SourceQuery) -> Result<Vec<Post>, ProviderError> {
        let url = format!("{}/r/{}/hot.json", self.base, self.subreddit);
        let response = self
            .http
            .get(&url)
            .query(&[("limit", query.limit.to_string().as_str()), ("raw_json", "1")])
            .send()
            .await
            .map_err(request_error)?;

        if let Some(e) = status_error(response.status()) {
            return Err(e);
        }

        let bytes = response.bytes().await.map_err(request_error)?;
        let parsed: Listing = serde_json::from_slice(&bytes).map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(normalize(parsed))
    }
}
