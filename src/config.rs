//! Run configuration.
//!
//! A [`CrawlConfig`] is built once per run, either from defaults or from an optional YAML file, and
//! handed explicitly to the fetcher and the orchestrator. Every field has a default, so a config
//! file only needs the keys it wants to override:
//!
//! ```yaml
//! http:
//!   timeout_secs: 20
//!   challenge_client: false
//! crawl:
//!   rate_limit_min_ms: 500
//!   rate_limit_max_ms: 1500
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::errors::ConfigError;

pub const DEFAULT_USER_AGENT: &str = "ai-news-crawler/0.1 (+https://github.com/)";
pub const DEFAULT_BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CrawlConfig {
    pub http: HttpSettings,
    pub crawl: CrawlSettings,
}

/// Settings shared by every HTTP-facing component of one run.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub redirect_timeout_secs: u64,
    pub user_agent: String,
    pub browser_user_agent: String,
    /// Attempts made by the direct strategy on a retryable status, first try included.
    pub max_retries: usize,
    pub retry_statuses: Vec<u16>,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
    pub challenge_client: bool,
    /// Only honoured when built with the `browser` feature.
    pub headless_browser: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            redirect_timeout_secs: 15,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            browser_user_agent: DEFAULT_BROWSER_USER_AGENT.to_string(),
            max_retries: 3,
            retry_statuses: vec![429, 502, 503, 504],
            backoff_base_ms: 1000,
            backoff_max_ms: 30_000,
            challenge_client: true,
            headless_browser: true,
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn redirect_timeout(&self) -> Duration {
        Duration::from_secs(self.redirect_timeout_secs)
    }
}

/// Per-item retry and pacing policy of the orchestrator.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CrawlSettings {
    pub item_attempts: usize,
    pub retry_pause_ms: u64,
    pub rate_limit_min_ms: u64,
    pub rate_limit_max_ms: u64,
    /// Hosts whose links are expanded before fetching. Subdomains match too.
    pub short_link_domains: Vec<String>,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            item_attempts: 3,
            retry_pause_ms: 2000,
            rate_limit_min_ms: 1000,
            rate_limit_max_ms: 2000,
            short_link_domains: ["cur.at", "bit.ly", "t.co", "buff.ly", "ow.ly", "lnkd.in"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
        }
    }
}

impl CrawlSettings {
    pub fn retry_pause(&self) -> Duration {
        Duration::from_millis(self.retry_pause_ms)
    }

    /// Bounds of the randomized pause taken after every item, as an ordered pair.
    pub fn rate_limit_bounds(&self) -> (u64, u64) {
        if self.rate_limit_min_ms <= self.rate_limit_max_ms {
            (self.rate_limit_min_ms, self.rate_limit_max_ms)
        } else {
            (self.rate_limit_max_ms, self.rate_limit_min_ms)
        }
    }
}

impl CrawlConfig {
    /// Load the configuration from `path`, or fall back to defaults when no path is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            info!("No config file given; using defaults");
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        info!(path, "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Configuration with every pause zeroed and a single HTTP attempt.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        let mut cfg = Self::default();
        cfg.http.timeout_secs = 5;
        cfg.http.redirect_timeout_secs = 5;
        cfg.http.max_retries = 1;
        cfg.http.backoff_base_ms = 0;
        cfg.http.challenge_client = false;
        cfg.http.headless_browser = false;
        cfg.crawl.retry_pause_ms = 0;
        cfg.crawl.rate_limit_min_ms = 0;
        cfg.crawl.rate_limit_max_ms = 0;
        cfg
    }
}
