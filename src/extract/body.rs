//! Body normalization: one interleaved text and image stream per content root.

use std::collections::HashSet;

use scraper::ElementRef;

use crate::utils::{absolutize_src, collapse_whitespace, is_noise_image};

/// Elements whose text never belongs to an article body.
const NON_CONTENT: &[&str] = &["script", "style", "noscript", "template"];

/// Image attributes in the order they are tried. Lazy-loading sites keep the real source in
/// `data-src` or `data-original`.
const IMAGE_ATTRS: &[&str] = &["src", "data-src", "data-original"];

/// Which text a traversal collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextMode {
    /// One segment per non-empty `<p>`.
    #[default]
    Paragraphs,
    /// One segment per non-blank text node, for sites that do not wrap text in paragraphs.
    TextNodes,
}

/// Walk `root` depth-first and collect text and image segments in document order.
///
/// The first image attribute that is not noise wins. Images are absolutized against `base` and
/// deduplicated within this call.
pub fn collect_segments(root: ElementRef<'_>, base: &str, mode: TextMode) -> Vec<String> {
    let mut segments = Vec::new();
    let mut seen_images = HashSet::new();

    for node in root.descendants() {
        if let Some(element) = node.value().as_element() {
            match element.name() {
                "img" => {
                    let Some(src) = IMAGE_ATTRS
                        .iter()
                        .filter_map(|attr| element.attr(attr))
                        .map(str::trim)
                        .find(|src| !src.is_empty() && !is_noise_image(src))
                    else {
                        continue;
                    };
                    let absolute = absolutize_src(src, base);
                    if seen_images.insert(absolute.clone()) {
                        segments.push(absolute);
                    }
                }
                "p" if mode == TextMode::Paragraphs => {
                    if let Some(paragraph) = ElementRef::wrap(node) {
                        let parts: Vec<&str> = paragraph.text().collect();
                        let text = collapse_whitespace(&parts.join(" "));
                        if !text.is_empty() {
                            segments.push(text);
                        }
                    }
                }
                _ => {}
            }
        } else if let Some(text) = node.value().as_text() {
            if mode != TextMode::TextNodes {
                continue;
            }
            let inside_non_content = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| NON_CONTENT.iter().any(|name| *name == e.name()))
            });
            if inside_non_content {
                continue;
            }
            let text = collapse_whitespace(text);
            if !text.is_empty() {
                segments.push(text);
            }
        }
    }

    segments
}

/// Newline-joined [`collect_segments`].
pub fn body_text(root: ElementRef<'_>, base: &str, mode: TextMode) -> String {
    collect_segments(root, base, mode).join("\n")
}
