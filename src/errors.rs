//! Error taxonomy for the crawl pipeline.
//!
//! Per-item failures ([`FetchError`], [`ExtractionError`], wrapped by [`ItemError`]) are caught by
//! the orchestrator's retry loop and never abort a run. [`DiscoveryError`], [`OutputError`] and
//! [`ConfigError`] are fatal; [`CrawlError`] carries the first two out of a run.

use std::io;

use thiserror::Error;

/// Every fetch strategy failed for a URL.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("all fetch strategies exhausted for {url}: {tried}")]
    Exhausted { url: String, tried: String },
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// A page was fetched but did not yield a usable record.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("bot-challenge placeholder served for {url}")]
    Challenge { url: String },
    #[error("no usable content found at {url}")]
    NoContent { url: String },
    #[error("no title found at {url}")]
    NoTitle { url: String },
    #[error("malformed payload from {url}: {reason}")]
    Payload { url: String, reason: String },
}

/// Failure of a single crawl item; the retry loop treats both kinds alike.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

/// Failure to produce the candidate set for a run.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("malformed listing payload from {url}: {reason}")]
    Payload { url: String, reason: String },
    #[error("no listing source reachable for {source_name}: {reason}")]
    NoListing { source_name: String, reason: String },
    #[error("listing for {source_name} yielded no candidates")]
    NoCandidates { source_name: String },
}

/// Failure to persist a record. Output problems stop the run, since nothing more could be saved.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to open output {path}: {source}")]
    Open { path: String, source: io::Error },
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write record: {0}")]
    Write(#[from] io::Error),
}

/// Fatal failure of a crawl run.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Failure while loading the YAML configuration or preparing the run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_error_is_transparent() {
        let err: ItemError = ExtractionError::Challenge {
            url: "https://example.com/a".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "bot-challenge placeholder served for https://example.com/a"
        );
    }

    #[test]
    fn exhausted_names_strategies() {
        let err = FetchError::Exhausted {
            url: "https://example.com".to_string(),
            tried: "direct: status 403; challenge: status 503".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("direct"));
        assert!(msg.contains("challenge"));
    }
}
