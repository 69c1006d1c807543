//! 机器之心 (jiqizhixin.com) through its public JSON API.
//!
//! The article list is paginated (`page`, `per`). The list entries carry only a summary; the full
//! body comes from the per-article detail endpoint, with the summary as a fallback when the detail
//! request fails.

use futures::future::BoxFuture;
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::crawl::{CrawlContext, Source};
use crate::discovery::dedup_links;
use crate::discovery::paginated::{PagedListing, collect};
use crate::errors::{DiscoveryError, ExtractionError, ItemError};
use crate::extract::rules::normalize_date;
use crate::extract::{Extracted, TextMode, extract_fragment};
use crate::fetch::Fetcher;
use crate::models::{ArticleRecord, BodyKey, CandidateLink, CrawlCursor};
use crate::utils::truncate_for_log;

pub const BASE: &str = "https://www.jiqizhixin.com";

/// Items requested per list page.
pub const PER_PAGE: usize = 20;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiArticle {
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "publishedAt")]
    pub published_at: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct ArticlePage {
    #[serde(default)]
    articles: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
struct ArticleDetail {
    #[serde(default)]
    content: String,
}

/// `GET {base}/api/v4/articles.json?sort=time&page=N&per=20`.
struct ArticleListing<'a> {
    base: &'a str,
}

impl ArticleListing<'_> {
    fn page_url(&self, page: u32) -> String {
        format!(
            "{}/api/v4/articles.json?sort=time&page={page}&per={PER_PAGE}",
            self.base
        )
    }
}

impl PagedListing for ArticleListing<'_> {
    type Item = ApiArticle;

    fn fetch_page<'a>(
        &'a self,
        fetcher: &'a Fetcher,
        cursor: &'a CrawlCursor,
    ) -> BoxFuture<'a, Result<Vec<ApiArticle>, DiscoveryError>> {
        Box::pin(async move {
            let page = match cursor {
                CrawlCursor::Page(n) => *n,
                _ => 1,
            };
            let url = self.page_url(page);
            let body = fetcher.fetch_text(&url).await?;
            let parsed: ArticlePage = serde_json::from_str(&body).map_err(|e| {
                warn!(%url, preview = %truncate_for_log(&body, 200), "Unparseable article list");
                DiscoveryError::Payload {
                    url: url.clone(),
                    reason: e.to_string(),
                }
            })?;
            Ok(parsed.articles)
        })
    }

    fn next_cursor(&self, current: &CrawlCursor, _page: &[ApiArticle]) -> Option<CrawlCursor> {
        match current {
            CrawlCursor::Page(n) => Some(CrawlCursor::Page(n + 1)),
            _ => Some(CrawlCursor::Page(2)),
        }
    }

    fn key(&self, item: &ApiArticle) -> String {
        item.slug.clone()
    }
}

#[derive(Debug, Clone)]
pub struct Jiqizhixin {
    base: String,
}

impl Default for Jiqizhixin {
    fn default() -> Self {
        Self::new()
    }
}

impl Jiqizhixin {
    pub fn new() -> Self {
        Self::with_base(BASE)
    }

    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    fn article_url(&self, slug: &str) -> String {
        format!("{}/articles/{slug}", self.base)
    }

    fn detail_url(&self, slug: &str) -> String {
        format!("{}/api/v4/articles/{slug}", self.base)
    }

    fn candidate(&self, article: ApiArticle) -> CandidateLink {
        let mut link = CandidateLink::new(self.article_url(&article.slug))
            .with_title(article.title)
            .with_inline_html(article.content);
        if !article.published_at.is_empty() {
            link = link.with_date(normalize_date(&article.published_at));
        }
        link
    }

    /// Full body HTML from the detail endpoint.
    #[instrument(level = "debug", skip(self, ctx))]
    async fn detail_html(&self, ctx: &CrawlContext, slug: &str) -> Result<String, ItemError> {
        let url = self.detail_url(slug);
        let body = ctx.fetcher.fetch_text(&url).await?;
        let detail: ArticleDetail =
            serde_json::from_str(&body).map_err(|e| ExtractionError::Payload {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        Ok(detail.content)
    }
}

impl Source for Jiqizhixin {
    fn name(&self) -> &'static str {
        "jiqizhixin"
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
            let listing = ArticleListing { base: &self.base };
            let articles = collect(&listing, &ctx.fetcher, CrawlCursor::Page(1), limit).await?;
            Ok(dedup_links(articles.into_iter().map(|a| self.candidate(a))))
        })
    }

    fn extract<'a>(
        &'a self,
        ctx: &'a CrawlContext,
        link: &'a CandidateLink,
    ) -> BoxFuture<'a, Result<ArticleRecord, ItemError>> {
        Box::pin(async move {
            let slug = link.url.rsplit('/').next().unwrap_or_default();
            let summary = link.inline_html.as_deref().unwrap_or_default();
            let html = match self.detail_html(ctx, slug).await {
                Ok(html) if !html.trim().is_empty() => html,
                Ok(_) => summary.to_string(),
                Err(e) => {
                    warn!(url = %link.url, error = %e, "Detail API failed; using list summary");
                    summary.to_string()
                }
            };

            let extracted = Extracted {
                title: link.title.clone(),
                date: link.date.clone(),
                content: extract_fragment(&html, &self.base, TextMode::TextNodes),
                root_tier: None,
            };
            Ok(extracted.into_record(&link.url, None, BodyKey::Content)?)
        })
    }
}
