//! Static listing pages.
//!
//! A listing is parsed with a ranked list of [`LinkRule`] tiers, most specific first and a
//! generic "any anchor matching the path pattern" tier last. Evaluation stops at the first tier
//! that yields at least one link; lower tiers are never consulted once a higher one matched.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use super::dedup_links;
use crate::models::CandidateLink;
use crate::utils::{absolutize_href, collapse_whitespace, host_matches, normalize_url, strip_fragment};

/// Which resolved hrefs a tier accepts.
#[derive(Debug, Clone, Copy)]
pub enum HrefFilter {
    Any,
    /// Resolved URL path starts with this prefix.
    PathPrefix(&'static str),
    /// Resolved absolute URL matches this pattern.
    Pattern(&'static Regex),
}

impl HrefFilter {
    fn accepts(&self, url: &Url) -> bool {
        match self {
            HrefFilter::Any => true,
            HrefFilter::PathPrefix(prefix) => url.path().starts_with(prefix),
            HrefFilter::Pattern(re) => re.is_match(url.as_str()),
        }
    }
}

/// One selector tier of a listing.
#[derive(Debug, Clone)]
pub struct LinkRule {
    /// When set, only the first acceptable anchor inside each container counts.
    pub container: Option<&'static str>,
    pub anchor: &'static str,
    pub filter: HrefFilter,
    /// Paths that never count as articles, compared after normalization (e.g. the listing itself).
    pub exclude_paths: &'static [&'static str],
    /// Keep the anchor text as the candidate's pre-known title.
    pub titles: bool,
}

impl LinkRule {
    pub fn anchors(anchor: &'static str) -> Self {
        Self {
            container: None,
            anchor,
            filter: HrefFilter::Any,
            exclude_paths: &[],
            titles: false,
        }
    }

    /// First anchor (matching `a[href]`) inside each `container`.
    pub fn first_in(container: &'static str) -> Self {
        Self {
            container: Some(container),
            ..Self::anchors("a[href]")
        }
    }

    pub fn filter(mut self, filter: HrefFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn excluding(mut self, paths: &'static [&'static str]) -> Self {
        self.exclude_paths = paths;
        self
    }

    pub fn with_titles(mut self) -> Self {
        self.titles = true;
        self
    }

    fn candidate(&self, anchor: ElementRef<'_>, page_url: &Url) -> Option<CandidateLink> {
        let href = anchor.value().attr("href")?;
        let resolved = absolutize_href(strip_fragment(href), page_url)?;
        let parsed = Url::parse(&resolved).ok()?;
        if !matches!(parsed.scheme(), "http" | "https") || !self.filter.accepts(&parsed) {
            return None;
        }
        let path = normalize_url(parsed.path());
        if self.exclude_paths.iter().any(|p| normalize_url(p) == path) {
            return None;
        }

        let link = CandidateLink::new(resolved);
        Some(if self.titles {
            link.with_title(collapse_whitespace(&anchor.text().collect::<String>()))
        } else {
            link
        })
    }

    fn collect(&self, document: &Html, page_url: &Url) -> Vec<CandidateLink> {
        let Some(anchor_sel) = parse_selector(self.anchor) else {
            return Vec::new();
        };

        match self.container {
            None => document
                .select(&anchor_sel)
                .filter_map(|a| self.candidate(a, page_url))
                .collect(),
            Some(container) => {
                let Some(container_sel) = parse_selector(container) else {
                    return Vec::new();
                };
                document
                    .select(&container_sel)
                    .filter_map(|c| {
                        c.select(&anchor_sel)
                            .find_map(|a| self.candidate(a, page_url))
                    })
                    .collect()
            }
        }
    }
}

/// Parse a CSS selector, logging and skipping invalid ones.
pub fn parse_selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(sel) => Some(sel),
        Err(e) => {
            warn!(selector = css, error = ?e, "Invalid selector; rule skipped");
            None
        }
    }
}

/// Result of a ranked discovery pass.
#[derive(Debug, Default)]
pub struct Discovered {
    /// Index of the tier that produced the links, `None` when no tier matched.
    pub tier: Option<usize>,
    pub links: Vec<CandidateLink>,
}

/// Evaluate `rules` in order over a listing page and keep the first tier with matches.
pub fn discover_links(html: &str, page_url: &Url, rules: &[LinkRule]) -> Discovered {
    let document = Html::parse_document(html);
    for (tier, rule) in rules.iter().enumerate() {
        let links = dedup_links(rule.collect(&document, page_url));
        if !links.is_empty() {
            debug!(tier, anchor = rule.anchor, count = links.len(), "Listing tier matched");
            return Discovered {
                tier: Some(tier),
                links,
            };
        }
    }
    Discovered::default()
}

/// External links grouped in content sections of a newsletter-style issue page.
#[derive(Debug, Clone)]
pub struct SectionRule {
    pub section: &'static str,
    /// Sections carrying any of these classes are advertisement blocks and skipped.
    pub deny_classes: &'static [&'static str],
    /// Links to these hosts (or relative links) are internal navigation, not articles.
    pub internal_hosts: &'static [&'static str],
}

/// Collect external article links from every non-sponsored section, in page order.
pub fn section_links(document: &Html, page_url: &Url, rule: &SectionRule) -> Vec<CandidateLink> {
    let (Some(section_sel), Some(anchor_sel)) =
        (parse_selector(rule.section), parse_selector("a[href]"))
    else {
        return Vec::new();
    };

    let links = document
        .select(&section_sel)
        .filter(|section| {
            !section
                .value()
                .classes()
                .any(|c| rule.deny_classes.iter().any(|d| *d == c))
        })
        .flat_map(|section| section.select(&anchor_sel).collect::<Vec<_>>())
        .filter_map(|a| {
            let href = a.value().attr("href")?.trim();
            if href.starts_with('/') || href.starts_with('#') {
                return None;
            }
            let resolved = Url::parse(href).or_else(|_| page_url.join(href)).ok()?;
            if !matches!(resolved.scheme(), "http" | "https") {
                return None;
            }
            let host = resolved.host_str()?;
            if rule.internal_hosts.iter().any(|h| host_matches(host, h)) {
                return None;
            }
            Some(CandidateLink::new(href))
        });

    dedup_links(links)
}
