use std::time::Duration;

use anyhow::{Context, Result};

use crate::error::SourceSearchError;
use crate::similarity::PatchSettings;

/// Provider credentials, loaded from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub apify_api_key: String,
    pub serper_api_key: String,
    /// Bing market the search actor runs in.
    pub market_code: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            apify_api_key: std::env::var("APIFY_API_KEY").context("APIFY_API_KEY is required")?,
            serper_api_key: std::env::var("SERPER_API_KEY")
                .context("SERPER_API_KEY is required")?,
            market_code: std::env::var("BING_MARKET_CODE").unwrap_or_else(|_| "en-US".to_string()),
        };

        config.log_keys();
        Ok(config)
    }

    fn log_keys(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  APIFY_API_KEY: {}", preview(&self.apify_api_key));
        tracing::info!("  SERPER_API_KEY: {}", preview(&self.serper_api_key));
        tracing::info!("  BING_MARKET_CODE: {}", self.market_code);
    }
}

/// First few characters of a secret, for logging.
fn preview(val: &str) -> String {
    let head: String = val.chars().take(5).collect();
    format!("{}...({} chars)", head, val.chars().count())
}

/// Tuning for a search run.
#[derive(Debug, Clone)]
pub struct FinderConfig {
    /// Upper bound on a single content fetch.
    pub fetch_timeout: Duration,
    /// Once this has elapsed since the batch started, unfinished fetches are
    /// cancelled and recorded as failed.
    pub batch_deadline: Duration,
    pub max_concurrent_fetches: usize,
    pub patch: PatchSettings,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
            batch_deadline: Duration::from_secs(90),
            max_concurrent_fetches: 10,
            patch: PatchSettings::default(),
        }
    }
}

impl FinderConfig {
    pub fn validate(&self) -> Result<(), SourceSearchError> {
        if self.fetch_timeout.is_zero() {
            return Err(SourceSearchError::Config(
                "fetch_timeout must be greater than 0".into(),
            ));
        }
        if self.batch_deadline.is_zero() {
            return Err(SourceSearchError::Config(
                "batch_deadline must be greater than 0".into(),
            ));
        }
        if self.max_concurrent_fetches == 0 {
            return Err(SourceSearchError::Config(
                "max_concurrent_fetches must be greater than 0".into(),
            ));
        }
        if self.patch.patch_size == 0 {
            return Err(SourceSearchError::Config(
                "patch_size must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = FinderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.patch.patch_size, 380);
        assert_eq!(config.patch.minimum_tail_patch, 140);
    }

    #[test]
    fn key_preview_is_char_safe() {
        assert_eq!(preview("apify_secret_token"), "apify...(18 chars)");
        assert_eq!(preview("éééééé-key"), "ééééé...(10 chars)");
        assert_eq!(preview("abc"), "abc...(3 chars)");
    }

    #[test]
    fn zero_timeouts_rejected() {
        let config = FinderConfig {
            fetch_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("fetch_timeout"));

        let config = FinderConfig {
            batch_deadline: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("batch_deadline"));
    }

    #[test]
    fn zero_concurrency_rejected() {
        let config = FinderConfig {
            max_concurrent_fetches: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_patch_size_rejected() {
        let config = FinderConfig {
            patch: PatchSettings {
                patch_size: 0,
                minimum_tail_patch: 0,
            },
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("patch_size"));
    }
}
