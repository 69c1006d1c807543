//! Short-link expansion.
//!
//! Tracking and short links (e.g. `cur.at`) are expanded to their destination before fetching so
//! that extraction runs against, and records point at, the real article. Resolution never fails:
//! on any error the input URL is returned unchanged.

use reqwest::Client;
use reqwest::redirect::Policy;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::{CrawlSettings, HttpSettings};
use crate::errors::ConfigError;
use crate::utils::host_matches;

const MAX_REDIRECTS: usize = 10;

#[derive(Debug)]
pub struct RedirectResolver {
    client: Client,
    short_link_domains: Vec<String>,
}

impl RedirectResolver {
    pub fn from_config(http: &HttpSettings, crawl: &CrawlSettings) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .user_agent(http.user_agent.clone())
            .timeout(http.redirect_timeout())
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(Self {
            client,
            short_link_domains: crawl.short_link_domains.clone(),
        })
    }

    /// Whether `url`'s host is one of the configured short-link domains.
    pub fn is_short_link(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        self.short_link_domains
            .iter()
            .any(|domain| host_matches(host, domain))
    }

    /// Resolve only when `url` is a known short link; otherwise return it untouched without any
    /// network round-trip.
    pub async fn resolve_if_short(&self, url: &str) -> String {
        if self.is_short_link(url) {
            self.resolve(url).await
        } else {
            url.to_string()
        }
    }

    /// Follow redirects from `url` and return the final destination.
    ///
    /// A redirect-following HEAD is tried first. When it lands on the input URL (not redirected,
    /// or HEAD rejected) a GET that follows redirects is issued and its final URL is used; the body
    /// is never read.
    #[instrument(level = "debug", skip(self))]
    pub async fn resolve(&self, url: &str) -> String {
        let Ok(input) = Url::parse(url) else {
            return url.to_string();
        };

        match self.client.head(input.clone()).send().await {
            Ok(response) if response.url() != &input => {
                let resolved = response.url().to_string();
                debug!(%url, %resolved, "Resolved via HEAD");
                return resolved;
            }
            Ok(_) => {}
            Err(e) => debug!(%url, error = %e, "HEAD failed; trying GET"),
        }

        match self.client.get(input.clone()).send().await {
            Ok(response) if response.url() != &input => {
                let resolved = response.url().to_string();
                debug!(%url, %resolved, "Resolved via GET");
                resolved
            }
            Ok(_) => url.to_string(),
            Err(e) => {
                warn!(%url, error = %e, "Redirect resolution failed; keeping original");
                url.to_string()
            }
        }
    }
}
