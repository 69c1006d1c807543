//! Data models shared by the crawl pipeline.
//!
//! - [`ArticleRecord`]: one normalized, extracted article; written exactly once to output
//! - [`CandidateLink`]: a discovered item awaiting extraction, deduplicated by [`CandidateLink::key`]
//! - [`FetchResult`]: raw body text and the strategy that produced it
//! - [`CrawlCursor`]: continuation token threaded through paginated listings

use std::fmt;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::utils::normalize_url;

/// A fully extracted article.
///
/// `content` is a newline-joined stream of segments, each either plain text or an absolute image URL,
/// in reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    /// Absolute, without query string, fragment or trailing slash.
    pub url: String,
    pub title: String,
    /// Empty when no date rule matched. Either free-form text or an ISO `YYYY-MM-DD` prefix.
    pub date: String,
    pub content: String,
}

impl ArticleRecord {
    /// Borrow this record as a serializable output line with the body stored under `key`.
    pub fn as_line(&self, key: BodyKey) -> RecordLine<'_> {
        RecordLine { record: self, key }
    }
}

/// Name of the JSON field that holds a record's body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyKey {
    #[default]
    Content,
    /// Used by abstract-oriented sources.
    Context,
}

impl BodyKey {
    pub fn as_str(self) -> &'static str {
        match self {
            BodyKey::Content => "content",
            BodyKey::Context => "context",
        }
    }
}

/// Serialization view of an [`ArticleRecord`] with fields in `url, title, date, <body>` order.
pub struct RecordLine<'a> {
    record: &'a ArticleRecord,
    key: BodyKey,
}

impl Serialize for RecordLine<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ArticleRecord", 4)?;
        s.serialize_field("url", &self.record.url)?;
        s.serialize_field("title", &self.record.title)?;
        s.serialize_field("date", &self.record.date)?;
        s.serialize_field(self.key.as_str(), &self.record.content)?;
        s.end()
    }
}

/// A discovered item, owned by discovery until the orchestrator consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CandidateLink {
    /// Absolute URL of the item as discovered.
    pub url: String,
    /// Title already known from the listing, if any.
    pub title: Option<String>,
    /// Date already known from the listing, if any.
    pub date: Option<String>,
    /// Markup carried by the listing itself (timeline text, API summary). Used when the
    /// item's own page cannot provide a body.
    pub inline_html: Option<String>,
    /// Listing item that pointed at `url`, when the two differ (e.g. a timeline post).
    pub origin: Option<String>,
}

impl CandidateLink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        if !title.trim().is_empty() {
            self.title = Some(title);
        }
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_inline_html(mut self, html: impl Into<String>) -> Self {
        self.inline_html = Some(html.into());
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Dedup key: query string, fragment and trailing slash stripped.
    pub fn key(&self) -> String {
        normalize_url(&self.url)
    }
}

/// Fetch strategies in escalation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Direct,
    Challenge,
    Browser,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::Direct => "direct",
            StrategyKind::Challenge => "challenge",
            StrategyKind::Browser => "browser",
        };
        f.write_str(name)
    }
}

/// Raw body text plus the strategy that produced it.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub body: String,
    pub strategy: StrategyKind,
}

/// Continuation token for paginated and timeline listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlCursor {
    /// Start of the listing; no pagination parameter is sent.
    Start,
    /// 1-based page number.
    Page(u32),
    /// Identifier of the last item already seen; the next batch starts below it.
    MaxId(String),
}
