//! Utility functions for URL normalization, string handling, and file system preparation.
//!
//! This module provides helpers used throughout the crawler:
//! - URL normalization for dedup and image-source absolutization
//! - Whitespace collapsing and char-safe truncation of extracted text
//! - Output path preparation

use std::io;
use std::path::Path;

use tokio::fs;
use tracing::{info, instrument};
use url::Url;

/// Normalize a URL for dedup purposes.
///
/// Strips the fragment, the query string and any trailing slash. The result is only used as a
/// comparison key; records keep the URL they were discovered with.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_url("https://a.com/x/?q=1#f"), "https://a.com/x");
/// ```
pub fn normalize_url(url: &str) -> String {
    let no_fragment = url.split('#').next().unwrap_or_default();
    let no_query = no_fragment.split('?').next().unwrap_or_default();
    no_query.trim().trim_end_matches('/').to_string()
}

/// Strip only the fragment from a URL.
pub fn strip_fragment(url: &str) -> &str {
    url.split('#').next().unwrap_or_default()
}

/// Convert an image source into an absolute URL.
///
/// - scheme-relative (`//cdn/x.png`) is prefixed with `https:`
/// - root-relative (`/x.png`) is joined with the site base
/// - anything else is passed through unchanged
pub fn absolutize_src(src: &str, base: &str) -> String {
    let src = src.trim();
    if let Some(rest) = src.strip_prefix("//") {
        return format!("https://{rest}");
    }
    if src.starts_with('/') {
        return format!("{}{}", base.trim_end_matches('/'), src);
    }
    src.to_string()
}

/// Resolve a listing `href` against the page it was found on.
pub fn absolutize_href(href: &str, base: &Url) -> Option<String> {
    base.join(href.trim()).ok().map(|u| u.to_string())
}

/// Scheme, host and port of `url`, used as the base for root-relative image sources.
///
/// Unparseable input is returned unchanged.
pub fn site_origin(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.origin().ascii_serialization(),
        Err(_) => url.to_string(),
    }
}

/// Whether an image source is noise: vector icons and inline data URIs.
pub fn is_noise_image(src: &str) -> bool {
    let lower = src.trim().to_ascii_lowercase();
    if lower.starts_with("data:") {
        return true;
    }
    normalize_url(&lower).ends_with(".svg")
}

/// Trim a string and collapse every inner whitespace run into a single space.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether `host` equals `domain` or is one of its subdomains.
pub fn host_matches(host: &str, domain: &str) -> bool {
    let host = host.to_ascii_lowercase();
    let domain = domain.to_ascii_lowercase();
    host == domain || host.ends_with(&format!(".{domain}"))
}

/// Take the first `max` characters of `s`, appending `…` when anything was cut.
///
/// Used to synthesize titles for records whose page has none.
pub fn short_title(s: &str, max: usize) -> String {
    let mut chars = s.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at a char boundary near `max` bytes with an ellipsis and a byte count
/// indicator appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure the parent directory of an output file exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).await?;
            info!(dir = %parent.display(), "Output directory ready");
            Ok(())
        }
        _ => Ok(()),
    }
}
