//! Paginated and cursor-bounded API listings.
//!
//! [`collect`] keeps requesting batches until `limit` distinct items are gathered or the source
//! returns an empty batch. The cursor threaded between requests must strictly advance; a repeated
//! cursor ends the loop instead of polling the same batch forever.

use futures::future::BoxFuture;
use tracing::{debug, info, instrument, warn};

use crate::errors::DiscoveryError;
use crate::fetch::Fetcher;
use crate::models::CrawlCursor;

/// A listing that can be read one batch at a time.
pub trait PagedListing: Send + Sync {
    type Item: Send;

    /// Request the batch that starts at `cursor`.
    fn fetch_page<'a>(
        &'a self,
        fetcher: &'a Fetcher,
        cursor: &'a CrawlCursor,
    ) -> BoxFuture<'a, Result<Vec<Self::Item>, DiscoveryError>>;

    /// Cursor for the batch after `page`, or `None` when the source has no continuation.
    fn next_cursor(&self, current: &CrawlCursor, page: &[Self::Item]) -> Option<CrawlCursor>;

    /// Dedup key of an item.
    fn key(&self, item: &Self::Item) -> String;
}

/// Drain `listing` from `start` until `limit` distinct items are collected.
///
/// A failure on the first batch is returned, since there is nothing to crawl. A failure on a later
/// batch ends pagination with what was already collected.
#[instrument(level = "info", skip(listing, fetcher))]
pub async fn collect<L: PagedListing>(
    listing: &L,
    fetcher: &Fetcher,
    start: CrawlCursor,
    limit: usize,
) -> Result<Vec<L::Item>, DiscoveryError> {
    let mut items: Vec<L::Item> = Vec::new();
    let mut seen = std::collections::HashSet::new();
    let mut cursor = start;
    let mut requests = 0usize;

    while items.len() < limit {
        requests += 1;
        let page = match listing.fetch_page(fetcher, &cursor).await {
            Ok(page) => page,
            Err(e) if items.is_empty() => return Err(e),
            Err(e) => {
                warn!(?cursor, error = %e, "Listing page failed; keeping items collected so far");
                break;
            }
        };
        if page.is_empty() {
            debug!(?cursor, "Empty page; end of listing");
            break;
        }

        let next = listing.next_cursor(&cursor, &page);
        let mut fresh = 0usize;
        for item in page {
            if items.len() >= limit {
                break;
            }
            if seen.insert(listing.key(&item)) {
                items.push(item);
                fresh += 1;
            }
        }
        debug!(?cursor, fresh, total = items.len(), "Listing page consumed");

        match next {
            Some(next) if next != cursor => cursor = next,
            Some(_) => {
                warn!(?cursor, "Cursor did not advance; stopping pagination");
                break;
            }
            None => break,
        }
    }

    info!(requests, count = items.len(), "Paginated discovery finished");
    Ok(items)
}
