//! Structured fallbacks for abstract-oriented pages.
//!
//! When no textual container holds the abstract, the page's embedded JSON state is searched for a
//! field such as `abstract`, and failing that the paragraphs next to an "Abstract" heading are
//! used.

use scraper::{ElementRef, Html};
use serde_json::Value;
use tracing::debug;

use super::rules::element_text;
use crate::discovery::static_page::parse_selector;

/// Field names searched in embedded JSON, in priority order per object.
pub const ABSTRACT_FIELDS: &[&str] = &["abstract", "summary"];

/// Depth-first search for the first non-empty string stored under one of `keys`.
///
/// Within one object the keys are checked before recursing into its values, so a shallow match
/// wins over a nested one in the same branch. Values are visited in document order.
pub fn find_json_field(value: &Value, keys: &[&str]) -> Option<String> {
    match value {
        Value::Object(map) => {
            let direct = keys.iter().find_map(|key| {
                map.get(*key)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
            });
            if let Some(found) = direct {
                return Some(found.to_string());
            }
            map.values().find_map(|v| find_json_field(v, keys))
        }
        Value::Array(items) => items.iter().find_map(|v| find_json_field(v, keys)),
        _ => None,
    }
}

/// JSON blobs embedded in the page: the Next.js state script, then every `data-props` attribute.
fn embedded_blobs(document: &Html) -> Vec<Value> {
    let mut blobs = Vec::new();

    if let Some(sel) = parse_selector("script#__NEXT_DATA__") {
        for script in document.select(&sel) {
            let raw: String = script.text().collect();
            match serde_json::from_str(&raw) {
                Ok(value) => blobs.push(value),
                Err(e) => debug!(error = %e, "Unparseable __NEXT_DATA__ blob"),
            }
        }
    }

    if let Some(sel) = parse_selector("[data-props]") {
        blobs.extend(
            document
                .select(&sel)
                .filter_map(|e| e.value().attr("data-props"))
                .filter_map(|raw| serde_json::from_str::<Value>(raw).ok()),
        );
    }

    blobs
}

/// Abstract text from embedded JSON state, if any blob carries one.
pub fn abstract_from_json(document: &Html) -> Option<String> {
    embedded_blobs(document)
        .iter()
        .find_map(|blob| find_json_field(blob, ABSTRACT_FIELDS))
}

/// Paragraphs of the container around a heading reading exactly "Abstract".
pub fn abstract_under_heading(document: &Html) -> Option<String> {
    let sel = parse_selector("h1, h2, h3")?;
    let heading = document
        .select(&sel)
        .find(|h| element_text(*h).eq_ignore_ascii_case("abstract"))?;
    let container = heading.parent().and_then(ElementRef::wrap)?;

    let p_sel = parse_selector("p")?;
    let paragraphs: Vec<String> = container
        .select(&p_sel)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect();

    (!paragraphs.is_empty()).then(|| paragraphs.join("\n"))
}

/// The full structured fallback chain: embedded JSON first, then the heading scan.
pub fn abstract_fallback(document: &Html) -> Option<String> {
    abstract_from_json(document).or_else(|| abstract_under_heading(document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_search_is_depth_first() {
        let value = json!({
            "props": {
                "pageProps": [
                    {"paper": {"title": "t", "abstract": "  "}},
                    {"paper": {"summary": "from summary"}},
                    {"paper": {"abstract": "too late"}}
                ]
            }
        });
        assert_eq!(
            find_json_field(&value, ABSTRACT_FIELDS).as_deref(),
            Some("from summary")
        );
    }

    #[test]
    fn json_search_follows_document_order() {
        let value: Value = serde_json::from_str(
            r#"{"zeta": {"abstract": "first on the page"}, "alpha": {"abstract": "second"}}"#,
        )
        .unwrap();
        assert_eq!(
            find_json_field(&value, ABSTRACT_FIELDS).as_deref(),
            Some("first on the page")
        );
    }

    #[test]
    fn non_string_fields_are_skipped() {
        let value = json!({"abstract": {"nested": {"abstract": "inner"}}});
        assert_eq!(find_json_field(&value, &["abstract"]).as_deref(), Some("inner"));
    }

    #[test]
    fn next_data_blob() {
        let html = r#"<html><body>
            <script id="__NEXT_DATA__" type="application/json">{"props":{"paper":{"abstract":"We propose X."}}}</script>
            </body></html>"#;
        let doc = Html::parse_document(html);
        assert_eq!(abstract_fallback(&doc).as_deref(), Some("We propose X."));
    }

    #[test]
    fn data_props_blob() {
        let html = r#"<div data-props='{"paper":{"id":"2501.1","summary":"Short summary."}}'></div>"#;
        let doc = Html::parse_document(html);
        assert_eq!(abstract_from_json(&doc).as_deref(), Some("Short summary."));
    }

    #[test]
    fn heading_scan_collects_sibling_paragraphs() {
        let html = r#"<section><h2> abstract </h2><p>Line one.</p><div><p>Line two.</p></div></section>
                      <section><h2>Related</h2><p>nope</p></section>"#;
        let doc = Html::parse_document(html);
        assert_eq!(abstract_fallback(&doc).as_deref(), Some("Line one.\nLine two."));
    }

    #[test]
    fn heading_must_match_exactly() {
        let html = r#"<div><h2>Abstract thoughts</h2><p>x</p></div>"#;
        let doc = Html::parse_document(html);
        assert_eq!(abstract_under_heading(&doc), None);
    }
}
