use crate::error::{ConfigError, CoreError};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub permalink_base_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub page_size: usize,
    /// Comment bodies shorter than this many characters never reach the scorer.
    pub min_comment_length: usize,
    pub comment_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://www.reddit.com".to_string(),
            permalink_base_url: "https://reddit.com".to_string(),
            user_agent: "TrendingRedditApp/1.0 (by /u/developer)".to_string(),
            request_timeout_secs: 30,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            page_size: DEFAULT_PAGE_SIZE,
            min_comment_length: 16,
            comment_limit: 100,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, CoreError> {
        let config: AppConfig = toml::from_str(raw).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        debug!("Loading configuration from {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&raw)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        for (field, value) in [
            ("api_base_url", &self.api_base_url),
            ("permalink_base_url", &self.permalink_base_url),
        ] {
            let parsed = url::Url::parse(value).map_err(|_| ConfigError::InvalidValue {
                field: field.to_string(),
                value: value.clone(),
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.clone(),
                }
                .into());
            }
        }

        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache_ttl_secs".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "page_size".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "user_agent".to_string(),
                value: self.user_agent.clone(),
            }
            .into());
        }

        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
