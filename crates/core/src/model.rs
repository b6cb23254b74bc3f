//! The unioned post shape shared by every source provider, plus stable
//! identifier derivation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which feed a post came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceTag {
    HackerNews,
    Reddit,
    GitHub,
    DevTo,
    Lobsters,
}

impl SourceTag {
    /// Stable short label used in ids, logs, and CLI arguments.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::HackerNews => "hackernews",
            SourceTag::Reddit => "reddit",
            SourceTag::GitHub => "github",
            SourceTag::DevTo => "devto",
            SourceTag::Lobsters => "lobsters",
        }
    }

    /// Every source, in default aggregation order.
    pub fn all() -> [SourceTag; 5] {
        [
            SourceTag::HackerNews,
            SourceTag::Reddit,
            SourceTag::GitHub,
            SourceTag::DevTo,
            SourceTag::Lobsters,
        ]
    }

    pub fn parse(s: &str) -> Option<SourceTag> {
        match s.trim().to_lowercase().as_str() {
            "hackernews" | "hn" => Some(SourceTag::HackerNews),
            "reddit" => Some(SourceTag::Reddit),
            "github" | "gh" => Some(SourceTag::GitHub),
            "devto" | "dev.to" => Some(SourceTag::DevTo),
            "lobsters" => Some(SourceTag::Lobsters),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One aggregated news item, normalized across all providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique within one aggregated response. Providers seed this from their
    /// native identifiers; collisions are repaired deterministically during
    /// aggregation.
    pub id: String,
    pub title: String,
    pub url: String,
    pub score: i64,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub comment_count: u32,
    pub source: SourceTag,
}

/// FNV-1a 32-bit string hash.
///
/// Used for deterministic identifier derivation; uniform and stable, not
/// cryptographic.
pub fn fnv1a_32(input: &str) -> u32 {
    const OFFSET_BASIS: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;

    let mut hash = OFFSET_BASIS;
    for byte in input.as_bytes() {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// Replacement identifier for a post whose native id is missing or collides.
///
/// Derived from `(title, url, position-in-source)` only, so repeated runs
/// over the same input produce the same id.
pub fn fallback_post_id(source: SourceTag, title: &str, url: &str, position: usize) -> String {
    let hash = fnv1a_32(&format!("{title}\n{url}\n{position}"));
    format!("{}-{hash:08x}", source.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv1a_known_vectors() {
        // Standard FNV-1a reference values.
        assert_eq!(fnv1a_32(""), 0x811c_9dc5);
        assert_eq!(fnv1a_32("a"), 0xe40c_292c);
        assert_eq!(fnv1a_32("foobar"), 0xbf9c_f968);
    }

    #[test]
    fn test_fallback_id_stable() {
        let a = fallback_post_id(SourceTag::Reddit, "Title", "https://x.example/p", 3);
        let b = fallback_post_id(SourceTag::Reddit, "Title", "https://x.example/p", 3);
        assert_eq!(a, b);
        assert!(a.starts_with("reddit-"));
    }

    #[test]
    fn test_fallback_id_varies_with_position() {
        let a = fallback_post_id(SourceTag::Reddit, "Title", "https://x.example/p", 0);
        let b = fallback_post_id(SourceTag::Reddit, "Title", "https://x.example/p", 1);
        assert_ne!(a, b);
    }

    #[test]
    fn test_source_tag_parse() {
        assert_eq!(SourceTag::parse("hn"), Some(SourceTag::HackerNews));
        assert_eq!(SourceTag::parse(" Reddit "), Some(SourceTag::Reddit));
        assert_eq!(SourceTag::parse("dev.to"), Some(SourceTag::DevTo));
        assert_eq!(SourceTag::parse("usenet"), None);
    }

    #[test]
    fn test_source_tag_round_trip_serde() {
        let json = serde_json::to_string(&SourceTag::HackerNews).unwrap();
        assert_eq!(json, "\"hacker-news\"");
        let tag: SourceTag = serde_json::from_str(&json).unwrap();
        assert_eq!(tag, SourceTag::HackerNews);
    }
}
