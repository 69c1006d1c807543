//! Sites with a static HTML listing and one article page per candidate.
//!
//! A [`StaticSite`] is pure configuration: where the listing lives, which selector tiers find
//! article links on it, and which [`ArticleRules`] apply to the article pages. The site modules
//! only provide these values.

use futures::future::BoxFuture;
use scraper::Html;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::crawl::{CrawlContext, Source};
use crate::discovery::static_page::{LinkRule, discover_links};
use crate::errors::{DiscoveryError, ExtractionError, ItemError};
use crate::extract::abstracts::abstract_fallback;
use crate::extract::{ArticleRules, Extracted, extract_article};
use crate::models::{ArticleRecord, BodyKey, CandidateLink};

/// Declarative description of one static site.
#[derive(Debug, Clone)]
pub struct StaticSite {
    pub name: &'static str,
    /// Site origin, e.g. `https://huggingface.co`. Overridable for tests.
    pub base: String,
    /// Listing path relative to `base`.
    pub listing_path: &'static str,
    pub default_limit: usize,
    pub tiers: fn() -> Vec<LinkRule>,
    pub article: ArticleRules,
    pub body_key: BodyKey,
    /// Search embedded JSON and the "Abstract" heading when the root selectors find nothing.
    pub structured_fallback: bool,
}

impl StaticSite {
    pub fn listing_url(&self) -> String {
        format!("{}{}", self.base.trim_end_matches('/'), self.listing_path)
    }

    /// Extract an already fetched article page.
    pub fn parse_article(&self, html: &str, url: &str) -> Result<Extracted, ExtractionError> {
        let mut extracted = extract_article(html, url, &self.base, &self.article)?;
        if self.structured_fallback && extracted.content.trim().is_empty() {
            let document = Html::parse_document(html);
            if let Some(text) = abstract_fallback(&document) {
                debug!(%url, "Body taken from structured fallback");
                extracted.content = text;
                extracted.root_tier = None;
            }
        }
        Ok(extracted)
    }
}

/// Fetch a listing page and run the ranked tiers over it.
#[instrument(level = "info", skip(ctx, rules))]
pub async fn discover_static(
    ctx: &CrawlContext,
    listing_url: &str,
    rules: &[LinkRule],
    limit: usize,
) -> Result<Vec<CandidateLink>, DiscoveryError> {
    let html = ctx.fetcher.fetch_text(listing_url).await?;
    let page_url = Url::parse(listing_url).map_err(|e| DiscoveryError::Payload {
        url: listing_url.to_string(),
        reason: e.to_string(),
    })?;

    let found = discover_links(&html, &page_url, rules);
    match found.tier {
        Some(tier) => info!(tier, count = found.links.len(), "Listing parsed"),
        None => warn!("No listing tier matched"),
    }
    let mut links = found.links;
    links.truncate(limit);
    Ok(links)
}

impl Source for StaticSite {
    fn name(&self) -> &'static str {
        self.name
    }

    fn default_limit(&self) -> usize {
        self.default_limit
    }

    fn body_key(&self) -> BodyKey {
        self.body_key
    }

    fn discover<'a>(
        &'a self,
        ctx: &'a CrawlContext,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<CandidateLink>, DiscoveryError>> {
        Box::pin(async move {
            let rules = (self.tiers)();
            discover_static(ctx, &self.listing_url(), &rules, limit).await
        })
    }

    fn extract<'a>(
        &'a self,
        ctx: &'a CrawlContext,
        link: &'a CandidateLink,
    ) -> BoxFuture<'a, Result<ArticleRecord, ItemError>> {
        Box::pin(async move {
            let html = ctx.fetcher.fetch_text(&link.url).await?;
            let extracted = self.parse_article(&html, &link.url)?;
            let mut record =
                extracted.into_record(&link.url, link.title.as_deref(), self.body_key)?;
            if record.date.is_empty() {
                record.date = link.date.clone().unwrap_or_default();
            }
            Ok(record)
        })
    }
}
