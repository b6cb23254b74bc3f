//! Source post-list providers.
//!
//! One client per feed, each normalizing its wire shape into the shared
//! [`Post`] model at the boundary. A schema mismatch is a provider failure,
//! advancing the cascade, never a panic deeper in.
//!
//! [`SourceFetcher`] assembles the per-source cascades: every source
//! terminates in an empty-list fallback so a feed that is down contributes
//! nothing rather than failing the aggregation, and Reddit tries a mirror
//! host in-cascade before the source is abandoned.

pub mod devto;
pub mod github;
pub mod hackernews;
pub mod lobsters;
pub mod reddit;

use newsdeck_core::{AppConfig, Cascade, Post, SourceTag};

pub use devto::DevToProvider;
pub use github::GitHubProvider;
pub use hackernews::HackerNewsProvider;
pub use lobsters::LobstersProvider;
pub use reddit::RedditProvider;

/// Parameters of one source fetch.
#[derive(Debug, Clone)]
pub struct SourceQuery {
    /// Maximum posts requested from the feed.
    pub limit: usize,
}

/// Builds the fallback cascade for each source.
#[derive(Clone)]
pub struct SourceFetcher {
    http: reqwest::Client,
    config: AppConfig,
}

impl SourceFetcher {
    pub fn new(http: reqwest::Client, config: AppConfig) -> Self {
        Self { http, config }
    }

    /// The cascade for one source.
    ///
    /// An empty post list is treated as a failed attempt so that a mirror
    /// (where one exists) gets its turn; exhaustion yields an empty list.
    pub fn cascade_for(&self, source: SourceTag) -> Cascade<SourceQuery, Vec<Post>> {
        let cascade = Cascade::new(|_: &SourceQuery| Vec::new())
            .with_attempt_timeout(self.config.attempt_timeout())
            .with_validator(|posts: &Vec<Post>| {
                if posts.is_empty() { Err("empty post list".to_string()) } else { Ok(()) }
            });

        match source {
            SourceTag::HackerNews => cascade.with_provider(HackerNewsProvider::new(self.http.clone())),
            SourceTag::Reddit => cascade
                .with_provider(RedditProvider::primary(self.http.clone(), &self.config.subreddit))
                .with_provider(RedditProvider::mirror(self.http.clone(), &self.config.subreddit)),
            SourceTag::GitHub => cascade.with_provider(GitHubProvider::new(self.http.clone())),
            SourceTag::DevTo => cascade.with_provider(DevToProvider::new(self.http.clone())),
            SourceTag::Lobsters => cascade.with_provider(LobstersProvider::new(self.http.clone())),
        }
    }
}
