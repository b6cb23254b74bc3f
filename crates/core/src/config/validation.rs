//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_ttl_days` is not positive
    /// - `attempt_timeout_ms` is less than 100ms or exceeds 2 minutes
    /// - `user_agent` or `subreddit` is empty
    /// - `score_closeness` is negative
    /// - `min_summary_chars` is 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_ttl_days <= 0 {
            return Err(ConfigError::Invalid { field: "cache_ttl_days".into(), reason: "must be positive".into() });
        }

        if self.attempt_timeout_ms < 100 {
            return Err(ConfigError::Invalid {
                field: "attempt_timeout_ms".into(),
                reason: "must be at least 100ms".into(),
            });
        }
        if self.attempt_timeout_ms > 120_000 {
            return Err(ConfigError::Invalid {
                field: "attempt_timeout_ms".into(),
                reason: "must not exceed 2 minutes (120000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.subreddit.is_empty() {
            return Err(ConfigError::Invalid { field: "subreddit".into(), reason: "must not be empty".into() });
        }

        if self.score_closeness < 0 {
            return Err(ConfigError::Invalid {
                field: "score_closeness".into(),
                reason: "must not be negative".into(),
            });
        }

        if self.min_summary_chars == 0 {
            return Err(ConfigError::Invalid {
                field: "min_summary_chars".into(),
                reason: "must be greater than 0".into(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_ttl_zero() {
        let config = AppConfig { cache_ttl_days: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_ttl_days"));
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { attempt_timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "attempt_timeout_ms"));
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = AppConfig { attempt_timeout_ms: 121_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "attempt_timeout_ms"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_negative_closeness() {
        let config = AppConfig { score_closeness: -1, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "score_closeness"));
    }

    #[test]
    fn test_validate_zero_min_summary_chars() {
        let config = AppConfig { min_summary_chars: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "min_summary_chars"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig {
            cache_ttl_days: 1,
            attempt_timeout_ms: 100,
            score_closeness: 0,
            min_summary_chars: 1,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
