//! 量子位 (qbitai.com).
//!
//! A WordPress site. The home page lists posts under `h2.entry-title`, older templates inside
//! `<article>` or picture blocks. Article text is not consistently wrapped in paragraphs, so every
//! text node of the content root is collected.

use super::static_site::StaticSite;
use crate::discovery::static_page::LinkRule;
use crate::extract::{ArticleRules, DateRule, TextMode};
use crate::models::BodyKey;

pub const BASE: &str = "https://www.qbitai.com";

pub const ARTICLE: ArticleRules = ArticleRules {
    title: &["h1.entry-title", "h1"],
    date: &[
        DateRule::Attr {
            css: "meta[property='article:published_time']",
            attr: "content",
        },
        DateRule::Text { css: "span.date" },
        DateRule::Text {
            css: "span.single_date",
        },
    ],
    root: &[
        "div.entry-content",
        "div.article-content",
        "div.article__content",
        "div.article",
    ],
    page_fallback: false,
    text: TextMode::TextNodes,
};

fn tiers() -> Vec<LinkRule> {
    vec![
        LinkRule::anchors("h2.entry-title a[href]").with_titles(),
        LinkRule::first_in("article").with_titles(),
        LinkRule::anchors("div.article_list div.picture_text h4 a[href]").with_titles(),
    ]
}

pub fn site() -> StaticSite {
    site_at(BASE)
}

pub fn site_at(base: impl Into<String>) -> StaticSite {
    StaticSite {
        name: "qbitai",
        base: base.into(),
        listing_path: "/",
        default_limit: 30,
        tiers,
        article: ARTICLE,
        body_key: BodyKey::Content,
        structured_fallback: false,
    }
}
