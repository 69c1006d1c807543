//! Crawl orchestration.
//!
//! [`run`] drives one [`Source`] end to end:
//!
//! 1. **Discovery**: the source produces its ordered, deduplicated candidate list once
//! 2. **Extraction**: each candidate is fetched and extracted, retried up to
//!    `item_attempts` times with a fixed pause in between
//! 3. **Output**: every record is appended to the sink as soon as it exists
//! 4. **Pacing**: a randomized pause follows every item, saved or skipped
//!
//! Items are processed strictly one after another. A failing item is logged and skipped; only a
//! failed discovery or a failed write ends the run early.

use std::time::Duration;

use futures::future::BoxFuture;
use rand::{Rng, rng};
use tokio::io::AsyncWrite;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::config::{CrawlConfig, CrawlSettings};
use crate::errors::{ConfigError, CrawlError, DiscoveryError, ItemError};
use crate::fetch::Fetcher;
use crate::fetch::redirect::RedirectResolver;
use crate::models::{ArticleRecord, BodyKey, CandidateLink};
use crate::outputs::jsonl::JsonlWriter;

/// Everything a source needs for one run, built once and passed explicitly.
#[derive(Debug)]
pub struct CrawlContext {
    pub fetcher: Fetcher,
    pub resolver: RedirectResolver,
    pub settings: CrawlSettings,
}

impl CrawlContext {
    pub fn from_config(config: &CrawlConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            fetcher: Fetcher::from_config(&config.http)?,
            resolver: RedirectResolver::from_config(&config.http, &config.crawl)?,
            settings: config.crawl.clone(),
        })
    }
}

/// One crawlable site.
pub trait Source: Send + Sync {
    /// Name used on the command line and in logs.
    fn name(&self) -> &'static str;

    fn default_limit(&self) -> usize;

    /// Output field holding the record body.
    fn body_key(&self) -> BodyKey {
        BodyKey::Content
    }

    /// Produce at most `limit` candidates in source order.
    fn discover<'a>(
        &'a self,
        ctx: &'a CrawlContext,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<CandidateLink>, DiscoveryError>>;

    /// Fetch and extract a single candidate.
    fn extract<'a>(
        &'a self,
        ctx: &'a CrawlContext,
        link: &'a CandidateLink,
    ) -> BoxFuture<'a, Result<ArticleRecord, ItemError>>;
}

/// Outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CrawlSummary {
    pub saved: usize,
    pub attempted: usize,
}

/// Crawl up to `limit` items of `source` into `sink`.
///
/// # Errors
///
/// [`CrawlError::Discovery`] when no candidate could be produced, [`CrawlError::Output`] when a
/// record could not be written. Per-item failures are never returned.
#[instrument(level = "info", skip(source, ctx, sink), fields(source = source.name()))]
pub async fn run<W: AsyncWrite + Unpin>(
    source: &dyn Source,
    ctx: &CrawlContext,
    limit: usize,
    sink: &mut JsonlWriter<W>,
) -> Result<CrawlSummary, CrawlError> {
    if limit == 0 {
        info!("Limit is 0; nothing to crawl");
        return Ok(CrawlSummary::default());
    }
    let mut candidates = source.discover(ctx, limit).await?;
    candidates.truncate(limit);
    if candidates.is_empty() {
        return Err(DiscoveryError::NoCandidates {
            source_name: source.name().to_string(),
        }
        .into());
    }
    info!(count = candidates.len(), limit, "Candidates discovered");

    let key = source.body_key();
    let attempts = ctx.settings.item_attempts.max(1);
    let mut summary = CrawlSummary::default();

    for (index, link) in candidates.iter().enumerate() {
        summary.attempted += 1;
        match extract_with_retry(source, ctx, link, attempts).await {
            Ok(record) => {
                sink.append(&record, key).await?;
                summary.saved += 1;
                info!(index, url = %record.url, title = %record.title, "Saved");
            }
            Err(e) => {
                warn!(index, url = %link.url, error = %e, attempts, "Skipping item");
            }
        }
        pace(&ctx.settings).await;
    }

    info!(
        saved = summary.saved,
        attempted = summary.attempted,
        "Crawl finished"
    );
    Ok(summary)
}

async fn extract_with_retry(
    source: &dyn Source,
    ctx: &CrawlContext,
    link: &CandidateLink,
    attempts: usize,
) -> Result<ArticleRecord, ItemError> {
    let mut attempt = 1;
    loop {
        match source.extract(ctx, link).await {
            Ok(record) => return Ok(record),
            Err(e) if attempt < attempts => {
                debug!(url = %link.url, attempt, error = %e, "Item failed; retrying");
                attempt += 1;
                sleep(ctx.settings.retry_pause()).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Randomized pause drawn uniformly from the configured bounds.
async fn pace(settings: &CrawlSettings) {
    let delay = pause_duration(settings);
    if !delay.is_zero() {
        sleep(delay).await;
    }
}

fn pause_duration(settings: &CrawlSettings) -> Duration {
    let (lo, hi) = settings.rate_limit_bounds();
    if hi == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rng().random_range(lo..=hi))
}
