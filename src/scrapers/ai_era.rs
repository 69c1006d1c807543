//! 新智元 (@AI_era) through a Mastodon-compatible timeline.
//!
//! The account id is looked up once, then the statuses timeline is paged with `max_id`. A post
//! usually links a `hub.baai.ac.cn/view/<id>` article; that article becomes the record. Posts
//! without a link, or whose article cannot be read, are saved with the post text itself.

use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::crawl::{CrawlContext, Source};
use crate::discovery::dedup_links;
use crate::discovery::paginated::{PagedListing, collect};
use crate::discovery::timeline::{embedded_link, timeline_text};
use crate::errors::{DiscoveryError, ItemError};
use crate::extract::rules::normalize_date;
use crate::extract::{ArticleRules, Extracted, TextMode, extract_article};
use crate::fetch::Fetcher;
use crate::models::{ArticleRecord, BodyKey, CandidateLink, CrawlCursor};
use crate::utils::site_origin;

pub const BASE: &str = "https://link.baai.ac.cn";
pub const ACCOUNT: &str = "AI_era";

/// Statuses requested per timeline batch.
pub const PER_PAGE: usize = 40;

static HUB_ARTICLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://hub\.baai\.ac\.cn/view/\d+").unwrap());

pub const HUB_ARTICLE_RULES: ArticleRules = ArticleRules {
    title: &["#post-title", "h1"],
    date: &[],
    root: &["#js_content", "div.article-content"],
    page_fallback: false,
    text: TextMode::TextNodes,
};

#[derive(Debug, Deserialize)]
struct Account {
    id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    pub id: String,
    /// Null for some remote or deleted posts.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub content: String,
}

/// `GET {base}/api/v1/accounts/{id}/statuses?limit=40[&max_id=...]`.
struct Timeline {
    statuses_url: String,
}

impl PagedListing for Timeline {
    type Item = Status;

    fn fetch_page<'a>(
        &'a self,
        fetcher: &'a Fetcher,
        cursor: &'a CrawlCursor,
    ) -> BoxFuture<'a, Result<Vec<Status>, DiscoveryError>> {
        Box::pin(async move {
            let url = match cursor {
                CrawlCursor::MaxId(id) => format!(
                    "{}?limit={PER_PAGE}&max_id={}",
                    self.statuses_url,
                    urlencoding::encode(id)
                ),
                _ => format!("{}?limit={PER_PAGE}", self.statuses_url),
            };
            let body = fetcher.fetch_text(&url).await?;
            let statuses: Vec<Status> =
                serde_json::from_str(&body).map_err(|e| DiscoveryError::Payload {
                    url: url.clone(),
                    reason: e.to_string(),
                })?;
            Ok(statuses)
        })
    }

    fn next_cursor(&self, _current: &CrawlCursor, page: &[Status]) -> Option<CrawlCursor> {
        page.last().map(|s| CrawlCursor::MaxId(s.id.clone()))
    }

    fn key(&self, item: &Status) -> String {
        item.id.clone()
    }
}

#[derive(Debug, Clone)]
pub struct AiEra {
    base: String,
    account: String,
    hub_pattern: Regex,
}

impl Default for AiEra {
    fn default() -> Self {
        Self::new()
    }
}

impl AiEra {
    pub fn new() -> Self {
        Self::with_base(BASE)
    }

    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            account: ACCOUNT.to_string(),
            hub_pattern: HUB_ARTICLE.clone(),
        }
    }

    /// Replace the pattern that recognizes embedded article links.
    pub fn with_hub_pattern(mut self, pattern: Regex) -> Self {
        self.hub_pattern = pattern;
        self
    }

    #[instrument(level = "info", skip(self, fetcher))]
    async fn lookup_account(&self, fetcher: &Fetcher) -> Result<String, DiscoveryError> {
        let url = format!(
            "{}/api/v1/accounts/lookup?acct={}",
            self.base,
            urlencoding::encode(&self.account)
        );
        let body = fetcher.fetch_text(&url).await?;
        let account: Account = serde_json::from_str(&body).map_err(|e| DiscoveryError::Payload {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        info!(account = %self.account, id = %account.id, "Account resolved");
        Ok(account.id)
    }

    /// Candidate for one post; `None` when the post has neither an article link nor its own URL.
    fn candidate(&self, status: Status) -> Option<CandidateLink> {
        let date = normalize_date(&status.created_at);
        let post_url = status.url.filter(|u| !u.trim().is_empty());
        let link = match (embedded_link(&status.content, &self.hub_pattern), post_url) {
            (Some(article), Some(post)) => CandidateLink::new(article).with_origin(post),
            (Some(article), None) => CandidateLink::new(article),
            (None, Some(post)) => CandidateLink::new(post),
            (None, None) => {
                debug!(id = %status.id, "Post has no url and no article link; skipped");
                return None;
            }
        };
        Some(link.with_date(date).with_inline_html(status.content))
    }

    /// Hub article links may carry a query string or trailing slash.
    fn is_hub_article(&self, url: &str) -> bool {
        self.hub_pattern.find(url).is_some_and(|m| m.start() == 0)
    }
}

impl Source for AiEra {
    fn name(&self) -> &'static str {
        "ai-era"
    }

    fn default_limit(&self) -> usize {
        100
    }

    fn discover<'a>(
        &'a self,
        ctx: &'a CrawlContext,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<CandidateLink>, DiscoveryError>> {
        Box::pin(async move {
            let id = self.lookup_account(&ctx.fetcher).await?;
            let timeline = Timeline {
                statuses_url: format!("{}/api/v1/accounts/{id}/statuses", self.base),
            };
            let statuses = collect(&timeline, &ctx.fetcher, CrawlCursor::Start, limit).await?;
            Ok(dedup_links(statuses.into_iter().filter_map(|s| self.candidate(s))))
        })
    }

    fn extract<'a>(
        &'a self,
        ctx: &'a CrawlContext,
        link: &'a CandidateLink,
    ) -> BoxFuture<'a, Result<ArticleRecord, ItemError>> {
        Box::pin(async move {
            let post_text = timeline_text(link.inline_html.as_deref().unwrap_or_default());

            if self.is_hub_article(&link.url) {
                let article = match ctx.fetcher.fetch_text(&link.url).await {
                    Ok(html) => extract_article(
                        &html,
                        &link.url,
                        &site_origin(&link.url),
                        &HUB_ARTICLE_RULES,
                    )
                    .map_err(ItemError::from),
                    Err(e) => Err(e.into()),
                };
                match article {
                    Ok(mut extracted) => {
                        if extracted.content.is_empty() {
                            debug!(url = %link.url, "Hub article has no body; using post text");
                            extracted.content = post_text;
                        }
                        extracted.date = link.date.clone();
                        return Ok(extracted.into_record(&link.url, None, BodyKey::Content)?);
                    }
                    Err(e) => {
                        warn!(url = %link.url, error = %e, "Hub article unavailable; saving post text");
                    }
                }
            }

            let url = link.origin.as_deref().unwrap_or(&link.url);
            let extracted = Extracted {
                title: None,
                date: link.date.clone(),
                content: post_text,
                root_tier: None,
            };
            Ok(extracted.into_record(url, None, BodyKey::Content)?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::tests::test_context;
    use crate::crawl::{CrawlSummary, run};
    use crate::outputs::jsonl::JsonlWriter;
    use httpmock::prelude::*;
    use regex::Regex;
    use serde_json::json;

    fn without_max_id(req: &HttpMockRequest) -> bool {
        req.query_params
            .as_ref()
            .is_none_or(|params| params.iter().all(|(name, _)| name != "max_id"))
    }

    fn local_hub(server: &MockServer) -> Regex {
        let escaped = regex::escape(&server.base_url());
        Regex::new(&format!(r"{escaped}/view/\d+")).unwrap()
    }

    #[test]
    fn default_pattern_matches_hub_links() {
        let source = AiEra::new();
        assert!(source.is_hub_article("https://hub.baai.ac.cn/view/12345"));
        assert!(!source.is_hub_article("https://link.baai.ac.cn/@AI_era/1"));
    }

    #[tokio::test]
    async fn embedded_link_becomes_the_record_url() {
        let server = MockServer::start_async().await;
        let hub = server.url("/view/42");

        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1/accounts/lookup")
                    .query_param("acct", "AI_era");
                then.status(200).json_body(json!({"id": "109"}));
            })
            .await;
        let first_batch = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1/accounts/109/statuses")
                    .query_param("limit", "40")
                    .matches(without_max_id);
                then.status(200).json_body(json!([
                    {
                        "id": "3",
                        "url": "https://link.test/@AI_era/3",
                        "created_at": "2025-06-05T01:00:00.000Z",
                        "content": format!("<p>新文章 <a href=\"{hub}\">{hub}</a></p>")
                    },
                    {
                        "id": "2",
                        "url": "https://link.test/@AI_era/2",
                        "created_at": "2025-06-04T01:00:00.000Z",
                        "content": format!("<p>{}</p>", "没有链接的动态".repeat(8))
                    }
                ]));
            })
            .await;
        let end_of_timeline = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1/accounts/109/statuses")
                    .query_param("limit", "40")
                    .query_param("max_id", "2");
                then.status(200).json_body(json!([]));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/view/42");
                then.status(200).body(
                    r#"<h1 id="post-title">大模型新进展</h1>
                       <div id="js_content"><p>正文第一段</p><img data-src="/img/1.png"></div>"#,
                );
            })
            .await;

        let source = AiEra::with_base(server.base_url()).with_hub_pattern(local_hub(&server));
        let mut sink = JsonlWriter::new(Vec::new());
        let summary = run(&source, &test_context(), 10, &mut sink).await.unwrap();
        assert_eq!(summary, CrawlSummary { saved: 2, attempted: 2 });
        first_batch.assert_hits_async(1).await;
        end_of_timeline.assert_hits_async(1).await;

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let records: Vec<serde_json::Value> =
            out.lines().map(|l| serde_json::from_str(l).unwrap()).collect();

        assert_eq!(records[0]["url"], hub);
        assert_eq!(records[0]["title"], "大模型新进展");
        assert_eq!(records[0]["date"], "2025-06-05");
        assert_eq!(
            records[0]["content"],
            format!("正文第一段\n{}", server.url("/img/1.png"))
        );

        assert_eq!(records[1]["url"], "https://link.test/@AI_era/2");
        let title = records[1]["title"].as_str().unwrap();
        assert!(title.ends_with('…'));
        assert_eq!(title.chars().count(), 41);
    }

    #[test]
    fn hub_links_with_query_or_trailing_slash_are_followed() {
        let source = AiEra::new();
        assert!(source.is_hub_article("https://hub.baai.ac.cn/view/42?from=timeline"));
        assert!(source.is_hub_article("https://hub.baai.ac.cn/view/42/"));
        assert!(!source.is_hub_article("https://redirect.test/?to=https://hub.baai.ac.cn/view/42"));
    }

    #[tokio::test]
    async fn hub_link_with_query_string_is_fetched() {
        let server = MockServer::start_async().await;
        let hub = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/view/42")
                    .query_param("from", "timeline");
                then.status(200).body(
                    r#"<h1 id="post-title">Hub title</h1><div id="js_content"><p>Hub body</p></div>"#,
                );
            })
            .await;

        let source = AiEra::with_base(server.base_url()).with_hub_pattern(local_hub(&server));
        let href = format!("{}?from=timeline", server.url("/view/42"));
        let status = Status {
            id: "1".to_string(),
            url: Some("https://link.test/@AI_era/1".to_string()),
            created_at: "2025-06-05T01:00:00Z".to_string(),
            content: format!(r#"<p>post <a href="{href}">link</a></p>"#),
        };
        let link = source.candidate(status).unwrap();
        assert_eq!(link.url, href);

        let record = source.extract(&test_context(), &link).await.unwrap();
        hub.assert_hits_async(1).await;
        assert_eq!(record.url, server.url("/view/42"));
        assert_eq!(record.title, "Hub title");
        assert_eq!(record.content, "Hub body");
    }

    #[test]
    fn null_post_url_does_not_reject_the_batch() {
        let statuses: Vec<Status> = serde_json::from_str(
            r#"[
                {"id": "1", "url": null, "created_at": "", "content": "<p>no link</p>"},
                {"id": "2", "url": null, "created_at": "",
                 "content": "<a href=\"https://hub.baai.ac.cn/view/5\">x</a>"},
                {"id": "3", "url": "https://link.test/@AI_era/3", "created_at": "", "content": ""}
            ]"#,
        )
        .unwrap();
        let source = AiEra::new();
        let links: Vec<CandidateLink> =
            statuses.into_iter().filter_map(|s| source.candidate(s)).collect();
        let urls: Vec<&str> = links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://hub.baai.ac.cn/view/5", "https://link.test/@AI_era/3"]
        );
        assert_eq!(links[0].origin, None);
    }

    #[tokio::test]
    async fn max_id_is_threaded_into_the_next_request() {
        let server = MockServer::start_async().await;
        let older = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1/accounts/1/statuses")
                    .query_param("limit", "40")
                    .query_param("max_id", "1234");
                then.status(200).json_body(json!([{"id": "1200"}]));
            })
            .await;

        let timeline = Timeline {
            statuses_url: server.url("/api/v1/accounts/1/statuses"),
        };
        let ctx = test_context();
        let cursor = CrawlCursor::MaxId("1234".to_string());
        let page = timeline.fetch_page(&ctx.fetcher, &cursor).await.unwrap();
        older.assert_async().await;
        assert_eq!(
            timeline.next_cursor(&cursor, &page),
            Some(CrawlCursor::MaxId("1200".to_string()))
        );
    }

    #[tokio::test]
    async fn unreachable_hub_article_falls_back_to_post() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/view/7");
                then.status(404);
            })
            .await;

        let source = AiEra::with_base(server.base_url()).with_hub_pattern(local_hub(&server));
        let link = CandidateLink::new(server.url("/view/7"))
            .with_origin("https://link.test/@AI_era/9")
            .with_date("2025-06-01")
            .with_inline_html("<p>短动态</p>");
        let record = source.extract(&test_context(), &link).await.unwrap();
        assert_eq!(record.url, "https://link.test/@AI_era/9");
        assert_eq!(record.title, "短动态");
        assert_eq!(record.content, "短动态");
    }

    #[tokio::test]
    async fn failed_account_lookup_is_fatal() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/accounts/lookup");
                then.status(404);
            })
            .await;
        let source = AiEra::with_base(server.base_url());
        let err = source.discover(&test_context(), 10).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Fetch(_)));
    }
}
