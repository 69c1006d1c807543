//! Hugging Face blog.
//!
//! The blog index renders one `BlogThumbnail` card per post. Article pages keep their body in an
//! `<article>` or one of several markdown containers depending on the page template.

use super::static_site::StaticSite;
use crate::discovery::static_page::{HrefFilter, LinkRule};
use crate::extract::{ArticleRules, DateRule, TextMode};
use crate::models::BodyKey;

pub const BASE: &str = "https://huggingface.co";

pub const ARTICLE: ArticleRules = ArticleRules {
    title: &["h1"],
    date: &[
        DateRule::Attr {
            css: "time",
            attr: "datetime",
        },
        DateRule::Attr {
            css: "meta[property='article:published_time']",
            attr: "content",
        },
    ],
    root: &[
        "article",
        "div.markdown",
        "div[data-target='MarkdownRenderer']",
        "div.prose",
        "main div",
    ],
    page_fallback: false,
    text: TextMode::Paragraphs,
};

fn tiers() -> Vec<LinkRule> {
    vec![
        LinkRule::first_in("div[data-target='BlogThumbnail']")
            .filter(HrefFilter::PathPrefix("/blog/"))
            .excluding(&["/blog"]),
        LinkRule::anchors("a[href^='/blog/']").excluding(&["/blog"]),
    ]
}

pub fn site() -> StaticSite {
    site_at(BASE)
}

pub fn site_at(base: impl Into<String>) -> StaticSite {
    StaticSite {
        name: "hf-blog",
        base: base.into(),
        listing_path: "/blog",
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
    fn cards_take_priority_over_loose_links() {
        let html = r#"
            <a href="/blog/from-nav">nav</a>
            <div data-target="BlogThumbnail"><a href="/blog/smolvla?x=1">SmolVLA</a></div>
            <div data-target="BlogThumbnail"><a href="/blog/">All</a><a href="/blog/gemma">Gemma</a></div>"#;
        let page = Url::parse("https://huggingface.co/blog").unwrap();
        let found = discover_links(html, &page, &tiers());
        assert_eq!(found.tier, Some(0));
        let urls: Vec<&str> = found.links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://huggingface.co/blog/smolvla?x=1",
                "https://huggingface.co/blog/gemma"
            ]
        );
    }

    #[test]
    fn markdown_container_when_no_article() {
        let html = r#"<h1>Gemma 3</h1><div class="prose"><p>Intro</p></div>
            <div class="markdown"><p>Real body</p><img src="/blog/assets/g.png"></div>"#;
        let extracted = site().parse_article(html, "https://huggingface.co/blog/gemma").unwrap();
        assert_eq!(extracted.root_tier, Some(1));
        assert_eq!(
            extracted.content,
            "Real body\nhttps://huggingface.co/blog/assets/g.png"
        );
    }
}
