//! Social timeline items that embed a link to an external article.

use regex::Regex;
use scraper::Html;

use super::static_page::parse_selector;
use crate::utils::collapse_whitespace;

/// Find the first link in a timeline item's HTML that matches `pattern`.
///
/// Anchor `href`s are checked first (the pattern must match at the start of the href); when none
/// qualifies, the rendered text is scanned, which catches links posted as plain text.
pub fn embedded_link(item_html: &str, pattern: &Regex) -> Option<String> {
    let fragment = Html::parse_fragment(item_html);

    if let Some(anchor_sel) = parse_selector("a[href]") {
        let from_anchor = fragment
            .select(&anchor_sel)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| pattern.find(href).is_some_and(|m| m.start() == 0));
        if let Some(href) = from_anchor {
            return Some(href.to_string());
        }
    }

    let text = rendered_text(&fragment);
    pattern.find(&text).map(|m| m.as_str().to_string())
}

/// Plain text of a timeline item, whitespace collapsed.
pub fn timeline_text(item_html: &str) -> String {
    rendered_text(&Html::parse_fragment(item_html))
}

fn rendered_text(fragment: &Html) -> String {
    let raw: Vec<&str> = fragment.root_element().text().collect();
    collapse_whitespace(&raw.join(" "))
}
