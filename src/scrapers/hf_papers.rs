//! Hugging Face trending papers.
//!
//! Records carry the paper abstract under the `context` key. The abstract container is tried
//! first; pages rendered client-side fall back to the embedded JSON state and then to the
//! paragraphs under an "Abstract" heading. An empty abstract is kept as a partial record.

use once_cell::sync::Lazy;
use regex::Regex;

use super::static_site::StaticSite;
use crate::discovery::static_page::{HrefFilter, LinkRule};
use crate::extract::{ArticleRules, DateRule, TextMode};
use crate::models::BodyKey;

pub const BASE: &str = "https://huggingface.co";

/// Paper detail pages are keyed by arXiv id, which keeps `/papers/trending` and friends out.
static PAPER_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/papers/\d{4}\.\d{4,5}(?:v\d+)?/?$").unwrap());

pub const ARTICLE: ArticleRules = ArticleRules {
    title: &["h1"],
    date: &[DateRule::Attr {
        css: "time",
        attr: "datetime",
    }],
    root: &["div.paper-details__abstract"],
    page_fallback: false,
    text: TextMode::Paragraphs,
};

fn tiers() -> Vec<LinkRule> {
    vec![
        LinkRule::first_in("article").filter(HrefFilter::Pattern(&PAPER_URL)),
        LinkRule::anchors("a[href^='/papers/']").filter(HrefFilter::Pattern(&PAPER_URL)),
    ]
}

pub fn site() -> StaticSite {
    site_at(BASE)
}

pub fn site_at(base: impl Into<String>) -> StaticSite {
    StaticSite {
        name: "hf-papers",
        base: base.into(),
        listing_path: "/papers/trending",
        default_limit: 30,
        tiers,
        article: ARTICLE,
        body_key: BodyKey::Context,
        structured_fallback: true,
    }
}
