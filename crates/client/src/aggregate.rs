//! Fan-out aggregation across sources, with dedup and two-key ranking.
//!
//! Every source fetch runs concurrently and absorbs its own failures through
//! its cascade, so one dead feed only shrinks the result. Merging happens
//! strictly after all fetches settle: dedup by canonical URL (first seen
//! wins), repair missing or colliding ids deterministically, sort, then
//! truncate to the requested total — never per-source before the sort, or a
//! fast low-quality feed could crowd out a slow high-quality one.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use newsdeck_core::model::fallback_post_id;
use newsdeck_core::{AppConfig, Cascade, Post, SourceTag};

use crate::fetch::canonical_identity;
use crate::sources::{SourceFetcher, SourceQuery};

/// Concurrent source fan-out plus the ranking merge.
pub struct Aggregator {
    fetcher: SourceFetcher,
    score_closeness: i64,
}

impl Aggregator {
    pub fn new(http: reqwest::Client, config: AppConfig) -> Self {
        let score_closeness = config.score_closeness;
        Self { fetcher: SourceFetcher::new(http, config), score_closeness }
    }

    /// Fetch the given sources concurrently and merge into one ranked list.
    ///
    /// A source that fails entirely contributes an empty list; the call as a
    /// whole always yields whatever the remaining sources produced.
    pub async fn aggregate(&self, sources: &[SourceTag], per_source_limit: usize, limit: usize) -> Vec<Post> {
        let cascades = sources.iter().map(|source| self.fetcher.cascade_for(*source)).collect();
        let posts = fan_out(cascades, &SourceQuery { limit: per_source_limit }).await;
        merge_ranked(posts, self.score_closeness, limit)
    }
}

/// Run every source cascade concurrently and concatenate the settled results
/// in source order.
async fn fan_out(cascades: Vec<Cascade<SourceQuery, Vec<Post>>>, query: &SourceQuery) -> Vec<Post> {
    let fetches = cascades.iter().map(|cascade| async {
        let outcome = cascade.run(query).await;
        if outcome.is_fallback() {
            tracing::warn!("source unavailable, contributing no posts");
        }
        outcome.value
    });

    let per_source: Vec<Vec<Post>> = futures::future::join_all(fetches).await;
    per_source.into_iter().flatten().collect()
}

/// Dedup, repair ids, rank, and truncate an already-fetched post list.
///
/// Posts must arrive grouped per source in that source's native order; the
/// per-source position feeds deterministic id repair.
pub fn merge_ranked(posts: Vec<Post>, score_closeness: i64, limit: usize) -> Vec<Post> {
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut positions: HashMap<SourceTag, usize> = HashMap::new();

    let mut merged: Vec<Post> = Vec::with_capacity(posts.len());
    for mut post in posts {
        let position = positions.entry(post.source).or_insert(0);
        let this_position = *position;
        *position += 1;

        let identity = canonical_identity(&post.url).unwrap_or_else(|| post.url.trim().to_lowercase());
        if !seen_urls.insert(identity) {
            continue;
        }

        if post.id.trim().is_empty() || post.id == "0" || seen_ids.contains(&post.id) {
            post.id = fallback_post_id(post.source, &post.title, &post.url, this_position);
        }
        seen_ids.insert(post.id.clone());

        merged.push(post);
    }

    merged.sort_by(|a, b| compare_ranked(a, b, score_closeness));
    merged.truncate(limit);
    merged
}

/// Two-key comparator: descending score, except that near-equal scores
/// tie-break by recency so a viral old post cannot permanently bury fresh
/// near-equal content.
fn compare_ranked(a: &Post, b: &Post, score_closeness: i64) -> Ordering {
    if (a.score - b.score).abs() <= score_closeness {
        b.created_at.cmp(&a.created_at)
    } else {
        b.score.cmp(&a.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn post(id: &str, title: &str, url: &str, score: i64, age_hours: i64, source: SourceTag) -> Post {
        Post {
            id: id.to_string(),
            title: title.to_string(),
            url: url.to_string(),
            score,
            author: "author".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0).unwrap() - Duration::hours(age_hours),
            comment_count: 0,
            source,
        }
    }

    #[test]
    fn test_dedup_first_seen_wins() {
        let posts = vec![
            post("hn-1", "Story", "https://example.com/story", 100, 1, SourceTag::HackerNews),
            post("lob-1", "Story", "https://example.com/story/", 40, 2, SourceTag::Lobsters),
        ];

        let merged = merge_ranked(posts, 5, 10);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].source, SourceTag::HackerNews);
    }

    #[test]
    fn test_dedup_is_scheme_insensitive() {
        let posts = vec![
            post("a", "Story", "http://example.com/story", 100, 1, SourceTag::HackerNews),
            post("b", "Story", "https://example.com/story", 90, 1, SourceTag::Reddit),
        ];
        assert_eq!(merge_ranked(posts, 5, 10).len(), 1);
    }

    #[test]
    fn test_close_scores_tie_break_by_recency() {
        // B is newer and within the closeness threshold: it ranks first
        // despite the lower absolute difference favoring neither.
        let posts = vec![
            post("a", "Older", "https://example.com/a", 100, 10, SourceTag::HackerNews),
            post("b", "Newer", "https://example.com/b", 103, 1, SourceTag::HackerNews),
        ];

        let merged = merge_ranked(posts, 5, 10);
        assert_eq!(merged[0].id, "b");
        assert_eq!(merged[1].id, "a");
    }

    #[test]
    fn test_distant_scores_sort_by_score() {
        // C is older but 30 points ahead: outside the threshold, score wins.
        let posts = vec![
            post("a", "Newer", "https://example.com/a", 100, 1, SourceTag::HackerNews),
            post("c", "Older", "https://example.com/c", 130, 20, SourceTag::HackerNews),
        ];

        let merged = merge_ranked(posts, 5, 10);
        assert_eq!(merged[0].id, "c");
        assert_eq!(merged[1].id, "a");
    }

    #[test]
    fn test_truncation_happens_after_global_sort() {
        // The top item arrives last in the input; per-source pre-truncation
        // would have dropped it.
        let posts = vec![
            post("a", "Low", "https://example.com/a", 10, 1, SourceTag::DevTo),
            post("b", "Mid", "https://example.com/b", 50, 1, SourceTag::DevTo),
            post("c", "Top", "https://example.com/c", 900, 1, SourceTag::Lobsters),
        ];

        let merged = merge_ranked(posts, 5, 2);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, "c");
        assert_eq!(merged[1].id, "b");
    }

    #[test]
    fn test_missing_id_repaired_deterministically() {
        let make = || vec![post("", "Untitled post", "https://example.com/u", 10, 1, SourceTag::Reddit)];

        let first = merge_ranked(make(), 5, 10);
        let second = merge_ranked(make(), 5, 10);

        assert!(!first[0].id.is_empty());
        assert!(first[0].id.starts_with("reddit-"));
        assert_eq!(first[0].id, second[0].id);
    }

    #[test]
    fn test_colliding_ids_repaired() {
        let posts = vec![
            post("dup", "First", "https://example.com/1", 10, 1, SourceTag::Reddit),
            post("dup", "Second", "https://example.com/2", 20, 1, SourceTag::Reddit),
        ];

        let merged = merge_ranked(posts, 5, 10);
        let ids: HashSet<&str> = merged.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_zero_id_repaired() {
        let posts = vec![post("0", "Zeroed", "https://example.com/z", 10, 1, SourceTag::DevTo)];
        let merged = merge_ranked(posts, 5, 10);
        assert_ne!(merged[0].id, "0");
    }

    #[test]
    fn test_unparseable_url_still_dedups_on_raw_string() {
        let posts = vec![
            post("a", "Odd", "not a url", 10, 1, SourceTag::DevTo),
            post("b", "Odd", " NOT A URL ", 20, 1, SourceTag::DevTo),
        ];
        assert_eq!(merge_ranked(posts, 5, 10).len(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(merge_ranked(Vec::new(), 5, 10).is_empty());
    }

    mod fan_out {
        use super::*;
        use async_trait::async_trait;
        use newsdeck_core::{Provider, ProviderError};

        struct Fixed {
            posts: Vec<Post>,
        }

        #[async_trait]
        impl Provider<SourceQuery, Vec<Post>> for Fixed {
            fn name(&self) -> &str {
                "fixed"
            }

            async fn attempt(&self, _query: &SourceQuery) -> Result<Vec<Post>, ProviderError> {
                Ok(self.posts.clone())
            }
        }

        struct Down;

        #[async_trait]
        impl Provider<SourceQuery, Vec<Post>> for Down {
            fn name(&self) -> &str {
                "down"
            }

            async fn attempt(&self, _query: &SourceQuery) -> Result<Vec<Post>, ProviderError> {
                Err(ProviderError::Http { status: 503 })
            }
        }

        fn source_cascade(provider: impl Provider<SourceQuery, Vec<Post>> + 'static) -> Cascade<SourceQuery, Vec<Post>> {
            Cascade::new(|_: &SourceQuery| Vec::new()).with_provider(provider)
        }

        #[tokio::test]
        async fn test_partial_failure_tolerated() {
            // Three sources, one entirely down: the merge still carries the
            // other two, ranked and bounded by the requested limit.
            let cascades = vec![
                source_cascade(Fixed {
                    posts: vec![
                        post("hn-1", "One", "https://example.com/1", 300, 1, SourceTag::HackerNews),
                        post("hn-2", "Two", "https://example.com/2", 40, 2, SourceTag::HackerNews),
                    ],
                }),
                source_cascade(Down),
                source_cascade(Fixed {
                    posts: vec![post("lob-1", "Three", "https://example.com/3", 120, 1, SourceTag::Lobsters)],
                }),
            ];

            let posts = fan_out(cascades, &SourceQuery { limit: 25 }).await;
            let merged = merge_ranked(posts, 5, 2);

            assert_eq!(merged.len(), 2);
            assert_eq!(merged[0].id, "hn-1");
            assert_eq!(merged[1].id, "lob-1");
        }
    }
}
