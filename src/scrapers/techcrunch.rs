//! TechCrunch AI category.
//!
//! The category page has gone through several card templates; each one is a listing tier, newest
//! template last since older cached pages still show up.

use super::static_site::StaticSite;
use crate::discovery::static_page::LinkRule;
use crate::extract::{ArticleRules, DateRule, TextMode};
use crate::models::BodyKey;

pub const BASE: &str = "https://techcrunch.com";

pub const ARTICLE: ArticleRules = ArticleRules {
    title: &["h1"],
    date: &[DateRule::Attr {
        css: "time",
        attr: "datetime",
    }],
    root: &[
        "div.article-content",
        "div.article__content",
        "div.entry-content",
        "div.wp-block-post-content",
    ],
    page_fallback: false,
    text: TextMode::Paragraphs,
};

fn tiers() -> Vec<LinkRule> {
    [
        "article a.post-block__title__link",
        "h2.post-block__title a",
        "a.loop-card__title-link",
        "a[data-ga-entry-text]",
        "div.post-block a.post-block__title__link",
    ]
    .into_iter()
    .map(|css| LinkRule::anchors(css).with_titles())
    .collect()
}

pub fn site() -> StaticSite {
    site_at(BASE)
}

pub fn site_at(base: impl Into<String>) -> StaticSite {
    StaticSite {
        name: "techcrunch",
        base: base.into(),
        listing_path: "/category/artificial-intelligence/",
        default_limit: 30,
        tiers,
        article: ARTICLE,
        body_key: BodyKey::Content,
        structured_fallback: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::static_page::discover_links;
    use url::Url;

    #[test]
    fn loop_cards() {
        let html = r#"
            <div class="loop-card"><a class="loop-card__title-link" href="https://techcrunch.com/2025/06/01/a/">A</a></div>
            <div class="loop-card"><a class="loop-card__title-link" href="https://techcrunch.com/2025/06/01/b/?utm=x">B</a></div>
            <a data-ga-entry-text="x" href="https://techcrunch.com/2025/06/01/c/">C</a>"#;
        let page = Url::parse("https://techcrunch.com/category/artificial-intelligence/").unwrap();
        let found = discover_links(html, &page, &tiers());
        assert_eq!(found.tier, Some(2));
        assert_eq!(found.links.len(), 2);
        assert_eq!(found.links[1].title.as_deref(), Some("B"));
    }

    #[test]
    fn article_paragraphs_and_iso_date() {
        let html = r#"<h1>Model launch</h1><time datetime="2025-06-01T09:30:00-07:00">June 1</time>
            <div class="entry-content"><p>Lead.</p><figure><img src="https://techcrunch.com/i.jpg"></figure><p>More.</p></div>"#;
        let extracted = site().parse_article(html, "https://techcrunch.com/2025/06/01/a/").unwrap();
        assert_eq!(extracted.date.as_deref(), Some("2025-06-01"));
        assert_eq!(extracted.content, "Lead.\nhttps://techcrunch.com/i.jpg\nMore.");
    }
}
