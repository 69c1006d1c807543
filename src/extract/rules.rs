//! Ranked rule lists for title, date and content-root selection.
//!
//! Each content type is described by an ordered list evaluated short-circuit: the first rule that
//! produces a value wins and later rules are not evaluated. Sources only vary the list contents.

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use scraper::{ElementRef, Html};

use crate::discovery::static_page::parse_selector;
use crate::utils::collapse_whitespace;

/// Evaluate `rules` in order and return the first hit together with its rank.
pub fn first_match<R, T>(rules: &[R], mut eval: impl FnMut(&R) -> Option<T>) -> Option<(usize, T)> {
    rules
        .iter()
        .enumerate()
        .find_map(|(rank, rule)| eval(rule).map(|value| (rank, value)))
}

/// Collapsed text of an element.
pub fn element_text(element: ElementRef<'_>) -> String {
    let parts: Vec<&str> = element.text().collect();
    collapse_whitespace(&parts.join(" "))
}

/// Text of the first element matching `css` with non-empty text.
fn selected_text(document: &Html, css: &str) -> Option<String> {
    let sel = parse_selector(css)?;
    document
        .select(&sel)
        .map(element_text)
        .find(|t| !t.is_empty())
}

/// Title: first non-empty text among the ranked selectors.
pub fn select_title(document: &Html, selectors: &[&str]) -> Option<(usize, String)> {
    first_match(selectors, |css| selected_text(document, css))
}

/// One way of finding a publication date.
#[derive(Debug, Clone, Copy)]
pub enum DateRule {
    /// Machine-readable attribute, e.g. `time[datetime]`'s `datetime`.
    Attr {
        css: &'static str,
        attr: &'static str,
    },
    /// Visible text of a date element.
    Text { css: &'static str },
    /// First match of a human date pattern anywhere in the page text.
    Pattern(&'static Regex),
}

impl DateRule {
    fn eval(&self, document: &Html) -> Option<String> {
        match self {
            DateRule::Attr { css, attr } => {
                let sel = parse_selector(css)?;
                document
                    .select(&sel)
                    .filter_map(|e| e.value().attr(attr))
                    .map(str::trim)
                    .find(|v| !v.is_empty())
                    .map(normalize_date)
            }
            DateRule::Text { css } => selected_text(document, css).map(|t| normalize_date(&t)),
            DateRule::Pattern(re) => {
                let text = element_text(document.root_element());
                re.find(&text).map(|m| m.as_str().to_string())
            }
        }
    }
}

/// Date: first hit of the ranked rules. Missing dates are not an error.
pub fn select_date(document: &Html, rules: &[DateRule]) -> Option<(usize, String)> {
    first_match(rules, |rule| rule.eval(document))
}

/// Content root: first element matching the ranked container selectors.
pub fn select_root<'a>(document: &'a Html, selectors: &[&str]) -> Option<(usize, ElementRef<'a>)> {
    first_match(selectors, |css| {
        let sel = parse_selector(css)?;
        document.select(&sel).next()
    })
}

/// Reduce ISO timestamps to their `YYYY-MM-DD` prefix; leave other text as found.
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d").to_string();
    }
    if let Some(prefix) = raw.get(..10) {
        if NaiveDate::parse_from_str(prefix, "%Y-%m-%d").is_ok() {
            return prefix.to_string();
        }
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;

    static HUMAN_DATE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"[A-Z][a-z]+\s+\d{1,2}(?:st|nd|rd|th)?,?\s+\d{4}").unwrap()
    });

    #[test]
    fn first_match_reports_rank_and_stops() {
        let mut evaluated = Vec::new();
        let hit = first_match(&[1, 2, 3, 4], |n| {
            evaluated.push(*n);
            (*n >= 2).then(|| n * 10)
        });
        assert_eq!(hit, Some((1, 20)));
        assert_eq!(evaluated, vec![1, 2]);
    }

    #[test]
    fn title_uses_low_priority_selector_only_when_needed() {
        let doc = Html::parse_document("<html><head><title> Page  title </title></head><body><h1>  </h1></body></html>");
        assert_eq!(
            select_title(&doc, &["h1.entry-title", "h1", "title"]),
            Some((2, "Page title".to_string()))
        );

        let doc = Html::parse_document("<title>t</title><h1>Heading</h1>");
        assert_eq!(
            select_title(&doc, &["h1", "title"]),
            Some((0, "Heading".to_string()))
        );
    }

    #[test]
    fn date_rules_are_ranked() {
        let html = r#"<time datetime="2025-05-06T14:30:00+08:00">May 6</time>
                      <span class="date">2024-01-01</span> Posted March 3rd, 2023"#;
        let doc = Html::parse_document(html);
        let rules = [
            DateRule::Attr { css: "time", attr: "datetime" },
            DateRule::Text { css: "span.date" },
            DateRule::Pattern(&HUMAN_DATE),
        ];
        assert_eq!(select_date(&doc, &rules), Some((0, "2025-05-06".to_string())));
        assert_eq!(select_date(&doc, &rules[1..]), Some((0, "2024-01-01".to_string())));

        let doc = Html::parse_document("<p>Posted on March 3rd, 2023 by staff</p>");
        assert_eq!(
            select_date(&doc, &rules),
            Some((2, "March 3rd, 2023".to_string()))
        );
    }

    #[test]
    fn missing_date_is_none() {
        let doc = Html::parse_document("<p>nothing here</p>");
        assert_eq!(select_date(&doc, &[DateRule::Text { css: "time" }]), None);
    }

    #[test]
    fn root_selects_first_ranked_container() {
        let doc = Html::parse_document(
            r#"<main><p>main</p></main><div class="entry-content"><p>entry</p></div>"#,
        );
        let (rank, root) = select_root(&doc, &["article", "div.entry-content", "main"]).unwrap();
        assert_eq!(rank, 1);
        assert_eq!(element_text(root), "entry");
    }

    #[test]
    fn normalizes_iso_prefixes_only() {
        assert_eq!(normalize_date("2025-05-06T01:02:03Z"), "2025-05-06");
        assert_eq!(normalize_date("2025-05-06 12:00"), "2025-05-06");
        assert_eq!(normalize_date(" 3 days ago "), "3 days ago");
        assert_eq!(normalize_date("2025年5月6日"), "2025年5月6日");
    }
}
