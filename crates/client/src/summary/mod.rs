//! Cache-backed article summarization.
//!
//! `getOrCreateSummary` flow: consult the summary cache tier, then run the
//! text-generation cascade (OpenAI -> Gemini -> deterministic template) and
//! persist the result best-effort. The service never fails; a storage error
//! only means the summary is returned uncached.

pub mod gemini;
pub mod openai;
pub mod template;

use newsdeck_core::cache::{ArtifactStore, EntryMeta, ExpiryPolicy};
use newsdeck_core::{AppConfig, Cascade, Error, Resolution};
use serde::Serialize;

pub use gemini::GeminiSummarizer;
pub use openai::OpenAiSummarizer;

/// The identity of an article to summarize.
#[derive(Debug, Clone)]
pub struct Article {
    pub title: String,
    pub url: String,
}

impl Article {
    /// Cache identity: the URL when there is one, else the title.
    pub fn identity(&self) -> &str {
        if self.url.trim().is_empty() { &self.title } else { &self.url }
    }
}

/// Where a summary came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SummaryOrigin {
    Cache,
    Provider(String),
    Template,
}

/// A produced summary plus provenance.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub text: String,
    pub origin: SummaryOrigin,
}

/// Summary cascade wired to the summary cache tier.
pub struct SummaryService {
    store: ArtifactStore,
    cascade: Cascade<Article, String>,
}

impl SummaryService {
    /// Open the summary tier and assemble the cascade from configuration.
    pub async fn open(http: reqwest::Client, config: &AppConfig) -> Result<Self, Error> {
        let store = ArtifactStore::open(config.summary_dir(), "txt", ExpiryPolicy::days(config.cache_ttl_days)).await?;

        let min_chars = config.min_summary_chars;
        let cascade = Cascade::new(|article: &Article| template::fallback_summary(article))
            .with_attempt_timeout(config.attempt_timeout())
            .with_validator(move |text: &String| {
                let len = text.trim().len();
                if len < min_chars { Err(format!("summary too short: {len} chars")) } else { Ok(()) }
            })
            .with_provider(OpenAiSummarizer::new(http.clone(), config.openai_api_key.clone()))
            .with_provider(GeminiSummarizer::new(http, config.gemini_api_key.clone()));

        Ok(Self { store, cascade })
    }

    /// Produce a summary for the article. Never fails.
    pub async fn summarize(&self, article: &Article) -> Summary {
        let identity = article.identity();

        if let Some(bytes) = self.store.get_bytes(identity).await {
            return Summary { text: String::from_utf8_lossy(&bytes).into_owned(), origin: SummaryOrigin::Cache };
        }

        let outcome = self.cascade.run(article).await;

        let meta = EntryMeta {
            title: Some(article.title.clone()),
            origin_url: (!article.url.trim().is_empty()).then(|| article.url.clone()),
        };
        if let Err(e) = self.store.put(identity, outcome.value.as_bytes(), meta).await {
            tracing::warn!(identity, error = %e, "failed to cache summary, returning uncached");
        }

        let origin = match outcome.resolved_by {
            Resolution::Provider(name) => SummaryOrigin::Provider(name),
            Resolution::Fallback => SummaryOrigin::Template,
        };
        Summary { text: outcome.value, origin }
    }

    /// The underlying cache tier, for maintenance tooling.
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &std::path::Path) -> AppConfig {
        AppConfig { cache_dir: dir.to_path_buf(), ..Default::default() }
    }

    fn show_hn_article() -> Article {
        Article { title: "Show HN: my project".to_string(), url: "https://x.example/p".to_string() }
    }

    #[tokio::test]
    async fn test_no_credentials_falls_back_to_template() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let service = SummaryService::open(reqwest::Client::new(), &config).await.unwrap();

        let summary = service.summarize(&show_hn_article()).await;

        assert_eq!(summary.origin, SummaryOrigin::Template);
        assert!(!summary.text.is_empty());
        // The template recognizes the Show HN pattern and echoes the title remainder.
        assert!(summary.text.contains("my project"));
    }

    #[tokio::test]
    async fn test_second_call_hits_cache() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let service = SummaryService::open(reqwest::Client::new(), &config).await.unwrap();

        let first = service.summarize(&show_hn_article()).await;
        let second = service.summarize(&show_hn_article()).await;

        assert_eq!(second.origin, SummaryOrigin::Cache);
        assert_eq!(first.text, second.text);
    }

    #[tokio::test]
    async fn test_fallback_deterministic_across_services() {
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        let service_a = SummaryService::open(reqwest::Client::new(), &config_in(dir_a.path())).await.unwrap();
        let service_b = SummaryService::open(reqwest::Client::new(), &config_in(dir_b.path())).await.unwrap();

        let a = service_a.summarize(&show_hn_article()).await;
        let b = service_b.summarize(&show_hn_article()).await;
        assert_eq!(a.text, b.text);
    }

    #[test]
    fn test_identity_prefers_url() {
        let article = show_hn_article();
        assert_eq!(article.identity(), "https://x.example/p");

        let untitled = Article { title: "Only a title".to_string(), url: "  ".to_string() };
        assert_eq!(untitled.identity(), "Only a title");
    }
}
