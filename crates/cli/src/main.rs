//! newsdeck maintenance and inspection CLI.
//!
//! Thin frontend over the core cache/aggregation interface: inspect tier
//! stats, purge or clear cached artifacts, and drive the aggregation and
//! enrichment paths by hand. Logging goes to stderr so stdout stays valid
//! JSON for piping.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use newsdeck_client::{Aggregator, Article, ImageService, SummaryService, http_client};
use newsdeck_core::{AppConfig, SourceTag};

#[derive(Parser)]
#[command(name = "newsdeck", version, about = "Tech-news aggregation cache tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
enum Tier {
    Summaries,
    Images,
    All,
}

impl Tier {
    fn includes_summaries(self) -> bool {
        matches!(self, Tier::Summaries | Tier::All)
    }

    fn includes_images(self) -> bool {
        matches!(self, Tier::Images | Tier::All)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Entry counts and approximate disk usage per cache tier.
    Stats,

    /// Drop expired and dangling index entries from both tiers.
    Purge,

    /// Remove all entries and artifact files.
    Clear {
        #[arg(long, value_enum, default_value_t = Tier::All)]
        tier: Tier,
    },

    /// Remove one cached artifact by its identity (URL or query).
    Invalidate {
        #[arg(long, value_enum)]
        tier: Tier,
        identity: String,
    },

    /// Fetch and rank the aggregated front page.
    Top {
        /// Comma-separated sources (hackernews, reddit, github, devto, lobsters).
        #[arg(long, value_delimiter = ',')]
        sources: Vec<String>,

        #[arg(long, default_value_t = 30)]
        limit: usize,

        #[arg(long = "per-source", default_value_t = 25)]
        per_source: usize,
    },

    /// Produce a cached-or-fresh summary for one article.
    Summarize {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        url: String,
    },

    /// Resolve a representative image for a search query.
    Image { query: String },
}

#[derive(Serialize)]
struct TierStats {
    summaries: newsdeck_core::CacheStats,
    images: newsdeck_core::CacheStats,
}

#[derive(Serialize)]
struct PurgeOutput {
    summaries_removed: usize,
    images_removed: usize,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_sources(raw: &[String]) -> Result<Vec<SourceTag>> {
    if raw.is_empty() {
        return Ok(SourceTag::all().to_vec());
    }

    let mut sources = Vec::with_capacity(raw.len());
    for name in raw {
        match SourceTag::parse(name) {
            Some(tag) => sources.push(tag),
            None => bail!("unknown source: {name}"),
        }
    }
    Ok(sources)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    tracing::debug!(cache_dir = %config.cache_dir.display(), "configuration loaded");
    let http = http_client(&config)?;

    match cli.command {
        Command::Stats => {
            let summaries = SummaryService::open(http.clone(), &config).await?;
            let images = ImageService::open(http, &config).await?;
            print_json(&TierStats {
                summaries: summaries.store().stats().await,
                images: images.store().stats().await,
            })?;
        }
        Command::Purge => {
            let summaries = SummaryService::open(http.clone(), &config).await?;
            let images = ImageService::open(http, &config).await?;
            let output = PurgeOutput {
                summaries_removed: summaries.store().purge().await?,
                images_removed: images.store().purge().await?,
            };
            print_json(&output)?;
        }
        Command::Clear { tier } => {
            if tier.includes_summaries() {
                SummaryService::open(http.clone(), &config).await?.store().clear().await?;
            }
            if tier.includes_images() {
                ImageService::open(http, &config).await?.store().clear().await?;
            }
            print_json(&serde_json::json!({ "cleared": tier }))?;
        }
        Command::Invalidate { tier, identity } => {
            if tier.includes_summaries() {
                SummaryService::open(http.clone(), &config).await?.store().invalidate(&identity).await?;
            }
            if tier.includes_images() {
                ImageService::open(http, &config).await?.store().invalidate(&identity).await?;
            }
            print_json(&serde_json::json!({ "invalidated": identity, "tier": tier }))?;
        }
        Command::Top { sources, limit, per_source } => {
            let sources = parse_sources(&sources)?;
            let aggregator = Aggregator::new(http, config);
            let posts = aggregator.aggregate(&sources, per_source, limit).await;
            print_json(&posts)?;
        }
        Command::Summarize { title, url } => {
            let service = SummaryService::open(http, &config).await?;
            let summary = service.summarize(&Article { title, url }).await;
            print_json(&summary)?;
        }
        Command::Image { query } => {
            let service = ImageService::open(http, &config).await?;
            let image = service.resolve(&query).await;
            print_json(&image)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sources_defaults_to_all() {
        let sources = parse_sources(&[]).unwrap();
        assert_eq!(sources.len(), 5);
    }

    #[test]
    fn test_parse_sources_aliases() {
        let sources = parse_sources(&["hn".to_string(), "reddit".to_string()]).unwrap();
        assert_eq!(sources, vec![SourceTag::HackerNews, SourceTag::Reddit]);
    }

    #[test]
    fn test_parse_sources_rejects_unknown() {
        assert!(parse_sources(&["usenet".to_string()]).is_err());
    }

    #[test]
    fn test_tier_membership() {
        assert!(Tier::All.includes_summaries());
        assert!(Tier::All.includes_images());
        assert!(Tier::Summaries.includes_summaries());
        assert!(!Tier::Summaries.includes_images());
    }

    #[test]
    fn test_cli_parses() {
        Cli::try_parse_from(["newsdeck", "stats"]).unwrap();
        Cli::try_parse_from(["newsdeck", "top", "--sources", "hn,lobsters", "--limit", "10"]).unwrap();
        Cli::try_parse_from(["newsdeck", "invalidate", "--tier", "summaries", "https://example.com/p"]).unwrap();
    }
}
