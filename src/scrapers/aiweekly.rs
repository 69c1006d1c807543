//! AI Weekly newsletter (aiweekly.co).
//!
//! Only the newest issue is crawled. Its link is found on the home page, or on the `/issues`
//! archive when the home page has none. The issue's category sections list the external articles;
//! sponsor blocks are skipped. Those articles live on arbitrary sites, so they go through the
//! generic extractor, and short links are expanded first.

use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{info, instrument, warn};
use url::Url;

use crate::crawl::{CrawlContext, Source};
use crate::discovery::static_page::{SectionRule, section_links};
use crate::errors::{DiscoveryError, FetchError, ItemError};
use crate::extract::rules::select_date;
use crate::extract::{ArticleRules, DateRule, TextMode, extract_article};
use crate::models::{ArticleRecord, BodyKey, CandidateLink};
use crate::utils::{absolutize_href, site_origin};

pub const BASE: &str = "https://aiweekly.co";

static ISSUE_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"/issues/\d+").unwrap());

static ISSUE_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Z][a-z]+\s+\d{1,2}(?:st|nd|rd|th)?,?\s+\d{4}").unwrap()
});

const ISSUE_SECTIONS: SectionRule = SectionRule {
    section: "section.category",
    deny_classes: &["cc-powered-by", "cc-sponsorfooter"],
    internal_hosts: &["aiweekly.co"],
};

/// Generic rules for external article pages.
pub const ARTICLE: ArticleRules = ArticleRules {
    title: &["h1", "title"],
    date: &[DateRule::Attr {
        css: "time",
        attr: "datetime",
    }],
    root: &["article", "main", "div.article-content, div.entry-content"],
    page_fallback: true,
    text: TextMode::Paragraphs,
};

/// First `/issues/<n>` link on a page, query stripped and trailing slash trimmed.
fn first_issue_link(html: &str, page_url: &Url) -> Option<String> {
    let document = Html::parse_document(html);
    let anchors = Selector::parse("a[href]").ok()?;
    document
        .select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| href.split('?').next().unwrap_or_default())
        .find(|href| ISSUE_PATH.is_match(href))
        .and_then(|href| absolutize_href(href, page_url))
        .map(|url| url.trim_end_matches('/').to_string())
}

/// Issue date and external article links, each link carrying the date.
fn parse_issue(html: &str, issue_url: &Url) -> (Option<String>, Vec<CandidateLink>) {
    let document = Html::parse_document(html);
    let date = select_date(
        &document,
        &[DateRule::Text { css: "time" }, DateRule::Pattern(&ISSUE_DATE)],
    )
    .map(|(_, d)| d);

    let links = section_links(&document, issue_url, &ISSUE_SECTIONS)
        .into_iter()
        .map(|link| match &date {
            Some(d) => link.with_date(d.clone()),
            None => link,
        })
        .collect();
    (date, links)
}

fn parse_url(url: &str) -> Result<Url, DiscoveryError> {
    Url::parse(url).map_err(|e| DiscoveryError::Payload {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

#[derive(Debug, Clone)]
pub struct AiWeekly {
    base: String,
}

impl Default for AiWeekly {
    fn default() -> Self {
        Self::new()
    }
}

impl AiWeekly {
    pub fn new() -> Self {
        Self::with_base(BASE)
    }

    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Look for an issue link on `page`; `None` covers both fetch failure and no match.
    async fn issue_link_on(&self, ctx: &CrawlContext, page: &str) -> Result<Option<String>, FetchError> {
        let html = ctx.fetcher.fetch_text(page).await?;
        let Ok(page_url) = Url::parse(page) else {
            return Ok(None);
        };
        Ok(first_issue_link(&html, &page_url))
    }

    /// Locate the newest issue: home page first, then the archive.
    #[instrument(level = "info", skip(self, ctx))]
    async fn latest_issue(&self, ctx: &CrawlContext) -> Result<String, DiscoveryError> {
        let home = format!("{}/", self.base);
        match self.issue_link_on(ctx, &home).await {
            Ok(Some(issue)) => return Ok(issue),
            Ok(None) => info!(url = %home, "No issue link on home page; trying archive"),
            Err(e) => warn!(url = %home, error = %e, "Home page unavailable; trying archive"),
        }

        let archive = format!("{}/issues", self.base);
        match self.issue_link_on(ctx, &archive).await {
            Ok(Some(issue)) => Ok(issue),
            Ok(None) => Err(DiscoveryError::NoListing {
                source_name: self.name().to_string(),
                reason: "no issue link on home page or archive".to_string(),
            }),
            Err(e) => Err(DiscoveryError::NoListing {
                source_name: self.name().to_string(),
                reason: format!("archive unavailable: {e}"),
            }),
        }
    }
}

impl Source for AiWeekly {
    fn name(&self) -> &'static str {
        "ai-weekly"
    }

    fn default_limit(&self) -> usize {
        30
    }

    fn discover<'a>(
        &'a self,
        ctx: &'a CrawlContext,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<CandidateLink>, DiscoveryError>> {
        Box::pin(async move {
            let issue = self.latest_issue(ctx).await?;
            let html = ctx.fetcher.fetch_text(&issue).await?;
            let (date, mut links) = parse_issue(&html, &parse_url(&issue)?);
            info!(%issue, date = date.as_deref().unwrap_or(""), count = links.len(), "Issue parsed");
            links.truncate(limit);
            Ok(links)
        })
    }

    fn extract<'a>(
        &'a self,
        ctx: &'a CrawlContext,
        link: &'a CandidateLink,
    ) -> BoxFuture<'a, Result<ArticleRecord, ItemError>> {
        Box::pin(async move {
            let resolved = ctx.resolver.resolve_if_short(&link.url).await;
            let html = ctx.fetcher.fetch_text(&resolved).await?;
            let mut extracted = extract_article(&html, &resolved, &site_origin(&resolved), &ARTICLE)?;
            if link.date.is_some() {
                extracted.date = link.date.clone();
            }
            Ok(extracted.into_record(&resolved, link.title.as_deref(), BodyKey::Content)?)
        })
    }
}
