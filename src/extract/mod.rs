//! Content extraction: fetched page in, title, date and normalized body out.
//!
//! Pages are described declaratively by an [`ArticleRules`] value. Ranked rule lists live in
//! [`rules`], body traversal in [`body`] and the structured abstract fallbacks in [`abstracts`].
//!
//! Record policy is decided by [`Extracted::into_record`]:
//!
//! | Body key | Empty body | Missing title |
//! |----------|------------|---------------|
//! | `content` | `NoContent` error | listing title, else first 40 chars of the body |
//! | `context` | accepted, logged | listing title, else `NoTitle` error |
//!
//! A bot-challenge marker anywhere in the page is always an error.

pub mod abstracts;
pub mod body;
pub mod rules;

use scraper::Html;
use tracing::{debug, instrument, warn};

pub use body::TextMode;
pub use rules::DateRule;

use crate::errors::ExtractionError;
use crate::fetch::contains_challenge_marker;
use crate::models::{ArticleRecord, BodyKey};
use crate::utils::{normalize_url, short_title};

/// Characters kept when a title has to be synthesized from the body.
pub const SYNTHETIC_TITLE_CHARS: usize = 40;

/// Declarative description of one site's article pages.
#[derive(Debug, Clone, Copy)]
pub struct ArticleRules {
    pub title: &'static [&'static str],
    pub date: &'static [DateRule],
    pub root: &'static [&'static str],
    /// Use the whole document when no root selector matches.
    pub page_fallback: bool,
    pub text: TextMode,
}

/// Result of extracting one page, before the record policy is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub title: Option<String>,
    pub date: Option<String>,
    pub content: String,
    /// Rank of the root selector that matched; `None` when the body came from elsewhere.
    pub root_tier: Option<usize>,
}

impl Extracted {
    /// Apply the record policy for `key` and build the output record.
    ///
    /// The record URL is `url` with its query string, fragment and trailing slash removed.
    pub fn into_record(
        self,
        url: &str,
        listing_title: Option<&str>,
        key: BodyKey,
    ) -> Result<ArticleRecord, ExtractionError> {
        let title = self
            .title
            .filter(|t| !t.is_empty())
            .or_else(|| listing_title.map(str::to_string).filter(|t| !t.trim().is_empty()));

        let title = match key {
            BodyKey::Content => {
                if self.content.trim().is_empty() {
                    return Err(ExtractionError::NoContent { url: url.to_string() });
                }
                title.unwrap_or_else(|| short_title(&self.content, SYNTHETIC_TITLE_CHARS))
            }
            BodyKey::Context => {
                let title = title.ok_or_else(|| ExtractionError::NoTitle { url: url.to_string() })?;
                if self.content.trim().is_empty() {
                    warn!(%url, "Empty abstract after all fallbacks; keeping record");
                }
                title
            }
        };

        Ok(ArticleRecord {
            url: normalize_url(url),
            title,
            date: self.date.unwrap_or_default(),
            content: self.content,
        })
    }
}

/// Extract title, date and body from a full page.
///
/// `base` is the site origin used for root-relative image sources.
///
/// # Errors
///
/// [`ExtractionError::Challenge`] when the page is a bot-challenge placeholder.
#[instrument(level = "debug", skip(html, rules), fields(bytes = html.len()))]
pub fn extract_article(
    html: &str,
    page_url: &str,
    base: &str,
    rules: &ArticleRules,
) -> Result<Extracted, ExtractionError> {
    if contains_challenge_marker(html) {
        return Err(ExtractionError::Challenge {
            url: page_url.to_string(),
        });
    }

    let document = Html::parse_document(html);
    let title = rules::select_title(&document, rules.title).map(|(_, t)| t);
    let date = rules::select_date(&document, rules.date).map(|(_, d)| d);

    let (root_tier, content) = match rules::select_root(&document, rules.root) {
        Some((tier, root)) => (Some(tier), body::body_text(root, base, rules.text)),
        None if rules.page_fallback => (
            Some(rules.root.len()),
            body::body_text(document.root_element(), base, rules.text),
        ),
        None => (None, String::new()),
    };
    debug!(?root_tier, chars = content.len(), "Extracted page body");

    Ok(Extracted {
        title,
        date,
        content,
        root_tier,
    })
}

/// Body of an inline HTML fragment, such as an API `content` field or a timeline post.
pub fn extract_fragment(html: &str, base: &str, mode: TextMode) -> String {
    let fragment = Html::parse_fragment(html);
    body::body_text(fragment.root_element(), base, mode)
}
