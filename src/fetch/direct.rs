//! Direct HTTP GET with a descriptive user agent.
//!
//! This is the cheapest strategy and the only one that is always present. It composes with a
//! bounded HTTP-level retry: statuses in [`RetryPolicy::statuses`] are retried with exponential
//! backoff and jitter before the strategy reports failure and the fetcher escalates.
//!
//! # Backoff Strategy
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
//! ```

use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use rand::{Rng, rng};
use reqwest::{Client, StatusCode};
use tokio::time::sleep;
use tracing::{instrument, warn};

use super::{FetchStrategy, contains_challenge_marker};
use crate::config::HttpSettings;
use crate::errors::ConfigError;
use crate::models::StrategyKind;

/// Bounded retry on transient HTTP statuses.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first. Never less than one.
    pub max_attempts: usize,
    pub statuses: Vec<u16>,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(settings: &HttpSettings) -> Self {
        Self {
            max_attempts: settings.max_retries.max(1),
            statuses: settings.retry_statuses.clone(),
            base_delay: Duration::from_millis(settings.backoff_base_ms),
            max_delay: Duration::from_millis(settings.backoff_max_ms),
        }
    }

    pub fn is_retryable(&self, status: StatusCode) -> bool {
        self.statuses.contains(&status.as_u16())
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn delay(&self, attempt: usize) -> Duration {
        if self.base_delay.is_zero() {
            return Duration::ZERO;
        }
        let shift = attempt.saturating_sub(1).min(16) as u32;
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        let jitter_ms: u64 = rng().random_range(0..=250);
        delay + Duration::from_millis(jitter_ms)
    }
}

/// Plain GET; success is status 200 without a challenge marker in the body.
#[derive(Debug)]
pub struct DirectStrategy {
    client: Client,
    policy: RetryPolicy,
}

impl DirectStrategy {
    pub fn from_config(settings: &HttpSettings) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.timeout())
            .build()?;
        Ok(Self {
            client,
            policy: RetryPolicy::from_config(settings),
        })
    }

    #[instrument(level = "debug", skip(self))]
    async fn get(&self, url: &str) -> Result<String, String> {
        let t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            attempt += 1;
            let response = self.client.get(url).send().await.map_err(|e| e.to_string())?;
            let status = response.status();

            if self.policy.is_retryable(status) && attempt < self.policy.max_attempts {
                let delay = self.policy.delay(attempt);
                warn!(
                    %url,
                    %status,
                    attempt,
                    max = self.policy.max_attempts,
                    elapsed_ms_total = t0.elapsed().as_millis() as u64,
                    ?delay,
                    "Retryable status; backing off"
                );
                sleep(delay).await;
                continue;
            }

            if status != StatusCode::OK {
                return Err(format!("status {}", status.as_u16()));
            }

            let body = response.text().await.map_err(|e| e.to_string())?;
            if contains_challenge_marker(&body) {
                return Err("challenge page".to_string());
            }
            return Ok(body);
        }
    }
}

impl FetchStrategy for DirectStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Direct
    }

    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, String>> {
        Box::pin(self.get(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlConfig;
    use httpmock::prelude::*;

    fn strategy(max_retries: usize) -> DirectStrategy {
        let mut cfg = CrawlConfig::for_tests();
        cfg.http.max_retries = max_retries;
        DirectStrategy::from_config(&cfg.http).unwrap()
    }

    #[test]
    fn retryable_statuses() {
        let policy = RetryPolicy::from_config(&HttpSettings::default());
        assert!(policy.is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(policy.is_retryable(StatusCode::BAD_GATEWAY));
        assert!(policy.is_retryable(StatusCode::SERVICE_UNAVAILABLE));
        assert!(policy.is_retryable(StatusCode::GATEWAY_TIMEOUT));
        assert!(!policy.is_retryable(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!policy.is_retryable(StatusCode::NOT_FOUND));
    }

    #[test]
    fn backoff_doubles_and_is_capped() {
        let policy = RetryPolicy {
            max_attempts: 5,
            statuses: vec![503],
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(3000),
        };
        let d1 = policy.delay(1);
        let d2 = policy.delay(2);
        let d3 = policy.delay(3);
        assert!(d1 >= Duration::from_millis(1000) && d1 <= Duration::from_millis(1250));
        assert!(d2 >= Duration::from_millis(2000) && d2 <= Duration::from_millis(2250));
        assert!(d3 >= Duration::from_millis(3000) && d3 <= Duration::from_millis(3250));
    }

    #[test]
    fn zero_base_disables_backoff() {
        let policy = RetryPolicy::from_config(&CrawlConfig::for_tests().http);
        assert_eq!(policy.delay(3), Duration::ZERO);
    }

    #[tokio::test]
    async fn returns_body_on_200() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/ok").header_exists("user-agent");
                then.status(200).body("<html>fine</html>");
            })
            .await;

        let body = strategy(1).fetch(&server.url("/ok")).await.unwrap();
        mock.assert_async().await;
        assert_eq!(body, "<html>fine</html>");
    }

    #[tokio::test]
    async fn retries_only_retryable_statuses() {
        let server = MockServer::start_async().await;
        let unavailable = server
            .mock_async(|when, then| {
                when.method(GET).path("/busy");
                then.status(503);
            })
            .await;
        let missing = server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404);
            })
            .await;

        let direct = strategy(3);
        let err = direct.fetch(&server.url("/busy")).await.unwrap_err();
        assert_eq!(err, "status 503");
        unavailable.assert_hits_async(3).await;

        let err = direct.fetch(&server.url("/missing")).await.unwrap_err();
        assert_eq!(err, "status 404");
        missing.assert_hits_async(1).await;
    }
}
