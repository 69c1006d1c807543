//! Synced Review (syncedreview.com).

use super::static_site::StaticSite;
use crate::discovery::static_page::LinkRule;
use crate::extract::{ArticleRules, DateRule, TextMode};
use crate::models::BodyKey;

pub const BASE: &str = "https://syncedreview.com";

pub const ARTICLE: ArticleRules = ArticleRules {
    title: &["h1", "title"],
    date: &[DateRule::Attr {
        css: "time",
        attr: "datetime",
    }],
    root: &["div.entry-content", "div.article-content"],
    page_fallback: false,
    text: TextMode::TextNodes,
};

fn tiers() -> Vec<LinkRule> {
    vec![LinkRule::anchors("h2.entry-title a[href]").with_titles()]
}

pub fn site() -> StaticSite {
    site_at(BASE)
}

pub fn site_at(base: impl Into<String>) -> StaticSite {
    StaticSite {
        name: "synced",
        base: base.into(),
        listing_path: "/",
        default_limit: 20,
        tiers,
        article: ARTICLE,
        body_key: BodyKey::Content,
        structured_fallback: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_tag_is_the_fallback_heading() {
        let html = r#"<html><head><title>Synced | Story</title></head><body>
            <div class="entry-content"><p>One</p> two <img src="/wp/x.png"></div></body></html>"#;
        let extracted = site().parse_article(html, "https://syncedreview.com/2025/06/01/story/").unwrap();
        assert_eq!(extracted.title.as_deref(), Some("Synced | Story"));
        assert_eq!(extracted.date, None);
        assert_eq!(extracted.content, "One\ntwo\nhttps://syncedreview.com/wp/x.png");
    }

    #[test]
    fn listing_url() {
        assert_eq!(site().listing_url(), "https://syncedreview.com/");
        assert_eq!(site_at("http://127.0.0.1:9/").listing_url(), "http://127.0.0.1:9/");
    }
}
