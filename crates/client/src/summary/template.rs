//! Deterministic template summaries.
//!
//! The terminal stage of the summary cascade. Pure text assembly from the
//! article's own fields: identical input yields byte-identical output, so
//! repeated cache rebuilds for the same article stay stable.

use super::Article;
use crate::fetch::canonicalize;

/// Produce a summary from the article fields alone. Never fails.
pub fn fallback_summary(article: &Article) -> String {
    let title = article.title.trim();
    let host = canonicalize(&article.url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string));

    if let Some(rest) = title.strip_prefix("Show HN:") {
        let rest = rest.trim();
        return match host {
            Some(host) => format!(
                "A maker showcase from the Hacker News community: {rest}. The project itself is hosted at {host}."
            ),
            None => format!("A maker showcase from the Hacker News community: {rest}."),
        };
    }

    if let Some(rest) = title.strip_prefix("Ask HN:") {
        let rest = rest.trim();
        return format!(
            "An open question posed to the Hacker News community: {rest}. The linked thread collects the discussion."
        );
    }

    match host {
        Some(host) => format!("{title} — an item drawing attention across tech feeds, published via {host}."),
        None => format!("{title} — an item drawing attention across tech feeds."),
    }
}
