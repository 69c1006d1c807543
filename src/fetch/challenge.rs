//! Browser-fingerprint HTTP client.
//!
//! Second line of defense for sites behind bot mitigation: a dedicated client that presents itself
//! like a desktop browser (browser user agent, full navigation header set, persistent cookie jar,
//! compressed transfer). Challenge pages that set a clearance cookie on the first response are
//! often passed on the follow-up request, so one retry is made when the first response is a
//! challenge. A challenge that survives the retry is a failure, so the fetcher escalates.

use futures::future::BoxFuture;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

use super::{FetchStrategy, contains_challenge_marker};
use crate::config::HttpSettings;
use crate::errors::ConfigError;
use crate::models::StrategyKind;

const BROWSER_HEADERS: &[(&str, &str)] = &[
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
    ),
    ("accept-language", "en-US,en;q=0.9,zh-CN;q=0.8"),
    ("dnt", "1"),
    ("upgrade-insecure-requests", "1"),
    ("sec-fetch-dest", "document"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-site", "none"),
    ("sec-fetch-user", "?1"),
    ("cache-control", "max-age=0"),
];

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    for &(name, value) in BROWSER_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
    headers
}

/// Browser-like client; success is status 200 without a challenge marker after the retry.
#[derive(Debug)]
pub struct ChallengeStrategy {
    client: Client,
}

impl ChallengeStrategy {
    pub fn from_config(settings: &HttpSettings) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .user_agent(settings.browser_user_agent.clone())
            .default_headers(browser_headers())
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(settings.timeout())
            .build()?;
        Ok(Self { client })
    }

    async fn get_once(&self, url: &str) -> Result<String, String> {
        let response = self.client.get(url).send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(format!("status {}", status.as_u16()));
        }
        response.text().await.map_err(|e| e.to_string())
    }

    #[instrument(level = "debug", skip(self))]
    async fn get(&self, url: &str) -> Result<String, String> {
        let body = self.get_once(url).await?;
        if !contains_challenge_marker(&body) {
            return Ok(body);
        }
        debug!(%url, "Challenge served; retrying with collected cookies");
        let body = self.get_once(url).await?;
        if contains_challenge_marker(&body) {
            return Err("challenge page".to_string());
        }
        Ok(body)
    }
}

impl FetchStrategy for ChallengeStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Challenge
    }

    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, String>> {
        Box::pin(self.get(url))
    }
}
