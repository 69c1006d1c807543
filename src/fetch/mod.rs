//! Resilient fetching.
//!
//! A [`Fetcher`] holds an ordered list of [`FetchStrategy`] trait objects and tries them in turn
//! until one returns a body. Strategies whose backing capability is unavailable are simply left out
//! of the list when the fetcher is built.
//!
//! | Order | Strategy | Module | Success condition |
//! |-------|----------|--------|-------------------|
//! | 1 | Direct GET with HTTP-level retry | [`direct`] | 200 and no challenge marker |
//! | 2 | Browser-fingerprint client | [`challenge`] | 200 |
//! | 3 | Headless browser (feature `browser`) | `browser` | DOM parsed |
//!
//! Redirect expansion for short links lives next to the strategies in [`redirect`].

pub mod challenge;
pub mod direct;
pub mod redirect;

#[cfg(feature = "browser")]
pub mod browser;

use futures::future::BoxFuture;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::HttpSettings;
use crate::errors::{ConfigError, FetchError};
use crate::models::{FetchResult, StrategyKind};

/// Case-insensitive text that marks a bot-challenge placeholder page.
pub const CHALLENGE_MARKER: &str = "verify you are human";

/// Whether `text` looks like a bot-challenge placeholder.
pub fn contains_challenge_marker(text: &str) -> bool {
    text.to_lowercase().contains(CHALLENGE_MARKER)
}

/// One way of turning a URL into body text.
///
/// Implementations report failure as a short human-readable reason; the [`Fetcher`] collects the
/// reasons of every exhausted strategy into a [`FetchError`].
pub trait FetchStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, String>>;
}

/// Ordered strategy list behind a single `fetch(url)` capability.
pub struct Fetcher {
    strategies: Vec<Box<dyn FetchStrategy>>,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("strategies", &self.kinds())
            .finish()
    }
}

impl Fetcher {
    /// Build the escalation chain described by `settings`.
    pub fn from_config(settings: &HttpSettings) -> Result<Self, ConfigError> {
        let mut strategies: Vec<Box<dyn FetchStrategy>> =
            vec![Box::new(direct::DirectStrategy::from_config(settings)?)];

        if settings.challenge_client {
            strategies.push(Box::new(challenge::ChallengeStrategy::from_config(settings)?));
        }

        #[cfg(feature = "browser")]
        if settings.headless_browser {
            strategies.push(Box::new(browser::BrowserStrategy::from_config(settings)));
        }
        #[cfg(not(feature = "browser"))]
        if settings.headless_browser {
            debug!("Built without the `browser` feature; headless fallback unavailable");
        }

        let fetcher = Self { strategies };
        info!(strategies = ?fetcher.kinds(), "Fetcher ready");
        Ok(fetcher)
    }

    pub fn with_strategies(strategies: Vec<Box<dyn FetchStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn kinds(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    /// Fetch `url`, escalating through the strategy list until one succeeds.
    ///
    /// # Errors
    ///
    /// [`FetchError::InvalidUrl`] if `url` is not absolute, [`FetchError::Exhausted`] if every
    /// strategy failed.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let mut failures = Vec::with_capacity(self.strategies.len());
        for strategy in &self.strategies {
            let kind = strategy.kind();
            match strategy.fetch(url).await {
                Ok(body) => {
                    debug!(%url, strategy = %kind, bytes = body.len(), "Fetched");
                    return Ok(FetchResult {
                        body,
                        strategy: kind,
                    });
                }
                Err(reason) => {
                    warn!(%url, strategy = %kind, %reason, "Fetch strategy failed; escalating");
                    failures.push(format!("{kind}: {reason}"));
                }
            }
        }

        if failures.is_empty() {
            failures.push("no strategies configured".to_string());
        }
        Err(FetchError::Exhausted {
            url: url.to_string(),
            tried: failures.join("; "),
        })
    }

    /// Fetch `url` and return only the body text.
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.fetch(url).await.map(|r| r.body)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::CrawlConfig;
    use httpmock::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Strategy returning a canned result, counting its calls.
    pub(crate) struct CannedStrategy {
        pub kind: StrategyKind,
        pub result: Result<String, String>,
        pub calls: Arc<AtomicUsize>,
    }

    impl FetchStrategy for CannedStrategy {
        fn kind(&self) -> StrategyKind {
            self.kind
        }

        fn fetch<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, Result<String, String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = self.result.clone();
            Box::pin(async move { result })
        }
    }

    fn canned(kind: StrategyKind, result: Result<&str, &str>) -> (Box<dyn FetchStrategy>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let strategy = CannedStrategy {
            kind,
            result: result.map(str::to_string).map_err(str::to_string),
            calls: Arc::clone(&calls),
        };
        (Box::new(strategy), calls)
    }

    #[test]
    fn marker_detection_is_case_insensitive() {
        assert!(contains_challenge_marker("<p>Please VERIFY you are Human</p>"));
        assert!(!contains_challenge_marker("<p>hello</p>"));
    }

    #[test]
    fn from_config_omits_disabled_strategies() {
        let cfg = CrawlConfig::for_tests();
        let fetcher = Fetcher::from_config(&cfg.http).unwrap();
        assert_eq!(fetcher.kinds(), vec![StrategyKind::Direct]);

        let mut cfg = CrawlConfig::for_tests();
        cfg.http.challenge_client = true;
        let fetcher = Fetcher::from_config(&cfg.http).unwrap();
        assert_eq!(fetcher.kinds()[..2], [StrategyKind::Direct, StrategyKind::Challenge]);
    }

    #[tokio::test]
    async fn first_success_wins_and_later_strategies_are_skipped() {
        let (direct, direct_calls) = canned(StrategyKind::Direct, Err("status 403"));
        let (challenge, challenge_calls) = canned(StrategyKind::Challenge, Ok("<html>ok</html>"));
        let (browser, browser_calls) = canned(StrategyKind::Browser, Ok("<html>late</html>"));
        let fetcher = Fetcher::with_strategies(vec![direct, challenge, browser]);

        let result = fetcher.fetch("https://example.com/a").await.unwrap();
        assert_eq!(result.strategy, StrategyKind::Challenge);
        assert_eq!(result.body, "<html>ok</html>");
        assert_eq!(direct_calls.load(Ordering::SeqCst), 1);
        assert_eq!(challenge_calls.load(Ordering::SeqCst), 1);
        assert_eq!(browser_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn exhausted_error_names_every_strategy() {
        let (direct, _) = canned(StrategyKind::Direct, Err("status 403"));
        let (challenge, _) = canned(StrategyKind::Challenge, Err("timed out"));
        let fetcher = Fetcher::with_strategies(vec![direct, challenge]);

        let err = fetcher.fetch("https://example.com/a").await.unwrap_err();
        let FetchError::Exhausted { tried, .. } = err else {
            panic!("expected Exhausted, got {err:?}");
        };
        assert_eq!(tried, "direct: status 403; challenge: timed out");
    }

    #[tokio::test]
    async fn relative_url_is_rejected_before_any_strategy() {
        let (direct, calls) = canned(StrategyKind::Direct, Ok("x"));
        let fetcher = Fetcher::with_strategies(vec![direct]);
        let err = fetcher.fetch("/relative/path").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn direct_only_fetcher_fails_on_challenge_page() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/guarded");
                then.status(200)
                    .body("<html><body>Please verify you are human</body></html>");
            })
            .await;

        let fetcher = Fetcher::from_config(&CrawlConfig::for_tests().http).unwrap();
        let err = fetcher.fetch(&server.url("/guarded")).await.unwrap_err();
        mock.assert_async().await;
        assert!(err.to_string().contains("direct: challenge page"));
    }
}
