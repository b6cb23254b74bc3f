//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (NEWSDECK_*)
//! 2. TOML config file (if NEWSDECK_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (NEWSDECK_*)
/// 2. TOML config file (if NEWSDECK_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root directory holding the cache tiers.
    ///
    /// Set via NEWSDECK_CACHE_DIR environment variable. Each tier is a
    /// subdirectory (`summaries/`, `images/`) with its own index document.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Time-to-live for cache entries, in days.
    ///
    /// Set via NEWSDECK_CACHE_TTL_DAYS environment variable.
    #[serde(default = "default_cache_ttl_days")]
    pub cache_ttl_days: i64,

    /// Bound on a single provider attempt, in milliseconds.
    ///
    /// Set via NEWSDECK_ATTEMPT_TIMEOUT_MS environment variable.
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via NEWSDECK_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Score distance inside which the ranking comparator tie-breaks by
    /// recency instead of score.
    ///
    /// Set via NEWSDECK_SCORE_CLOSENESS environment variable.
    #[serde(default = "default_score_closeness")]
    pub score_closeness: i64,

    /// Minimum character count for a generated summary to be accepted.
    ///
    /// Set via NEWSDECK_MIN_SUMMARY_CHARS environment variable.
    #[serde(default = "default_min_summary_chars")]
    pub min_summary_chars: usize,

    /// Subreddit fetched by the Reddit source.
    ///
    /// Set via NEWSDECK_SUBREDDIT environment variable.
    #[serde(default = "default_subreddit")]
    pub subreddit: String,

    /// OpenAI API key for the primary summarizer.
    ///
    /// Set via NEWSDECK_OPENAI_API_KEY environment variable. Required only
    /// when that provider is attempted; absence advances the cascade.
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// Gemini API key for the secondary summarizer.
    ///
    /// Set via NEWSDECK_GEMINI_API_KEY environment variable.
    #[serde(default)]
    pub gemini_api_key: Option<String>,

    /// Unsplash access key for image search.
    ///
    /// Set via NEWSDECK_UNSPLASH_ACCESS_KEY environment variable.
    #[serde(default)]
    pub unsplash_access_key: Option<String>,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./newsdeck-cache")
}

fn default_cache_ttl_days() -> i64 {
    7
}

fn default_attempt_timeout_ms() -> u64 {
    10_000
}

fn default_user_agent() -> String {
    "newsdeck/0.1".into()
}

fn default_score_closeness() -> i64 {
    5
}

fn default_min_summary_chars() -> usize {
    80
}

fn default_subreddit() -> String {
    "programming".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            cache_ttl_days: default_cache_ttl_days(),
            attempt_timeout_ms: default_attempt_timeout_ms(),
            user_agent: default_user_agent(),
            score_closeness: default_score_closeness(),
            min_summary_chars: default_min_summary_chars(),
            subreddit: default_subreddit(),
            openai_api_key: None,
            gemini_api_key: None,
            unsplash_access_key: None,
        }
    }
}

impl AppConfig {
    /// Attempt timeout as Duration for use with reqwest/tokio.
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    /// Directory of the summary cache tier.
    pub fn summary_dir(&self) -> PathBuf {
        self.cache_dir.join("summaries")
    }

    /// Directory of the image cache tier.
    pub fn image_dir(&self) -> PathBuf {
        self.cache_dir.join("images")
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("NEWSDECK_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("NEWSDECK_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Check if the OpenAI API key is available (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the key is not set.
    pub fn require_openai_api_key(&self) -> Result<&str, ConfigError> {
        self.openai_api_key.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "openai_api_key".into(),
            hint: "Set NEWSDECK_OPENAI_API_KEY environment variable".into(),
        })
    }

    /// Check if the Gemini API key is available (for deferred validation).
    pub fn require_gemini_api_key(&self) -> Result<&str, ConfigError> {
        self.gemini_api_key.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "gemini_api_key".into(),
            hint: "Set NEWSDECK_GEMINI_API_KEY environment variable".into(),
        })
    }

    /// Check if the Unsplash access key is available (for deferred validation).
    pub fn require_unsplash_access_key(&self) -> Result<&str, ConfigError> {
        self.unsplash_access_key.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "unsplash_access_key".into(),
            hint: "Set NEWSDECK_UNSPLASH_ACCESS_KEY environment variable".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.cache_dir, PathBuf::from("./newsdeck-cache"));
        assert_eq!(config.cache_ttl_days, 7);
        assert_eq!(config.attempt_timeout_ms, 10_000);
        assert_eq!(config.user_agent, "newsdeck/0.1");
        assert_eq!(config.score_closeness, 5);
        assert_eq!(config.min_summary_chars, 80);
        assert_eq!(config.subreddit, "programming");
        assert!(config.openai_api_key.is_none());
        assert!(config.gemini_api_key.is_none());
        assert!(config.unsplash_access_key.is_none());
    }

    #[test]
    fn test_tier_directories() {
        let config = AppConfig::default();
        assert_eq!(config.summary_dir(), PathBuf::from("./newsdeck-cache/summaries"));
        assert_eq!(config.image_dir(), PathBuf::from("./newsdeck-cache/images"));
    }

    #[test]
    fn test_attempt_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.attempt_timeout(), Duration::from_millis(10_000));
    }

    #[test]
    fn test_require_openai_api_key_missing() {
        let config = AppConfig::default();
        let result = config.require_openai_api_key();
        assert!(matches!(result, Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_require_openai_api_key_present() {
        let config = AppConfig { openai_api_key: Some("test-key".into()), ..Default::default() };
        assert_eq!(config.require_openai_api_key().unwrap(), "test-key");
    }
}
