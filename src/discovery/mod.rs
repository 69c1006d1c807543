//! List discovery: turning a listing into an ordered, deduplicated candidate sequence.
//!
//! Three listing shapes share the same output contract:
//!
//! - [`static_page`]: ranked selector tiers over a fetched HTML listing, plus section-scoped
//!   external-link collection for newsletter issues
//! - [`paginated`]: page- or cursor-bounded API batches until the limit or end of data
//! - [`timeline`]: social timeline items that embed a link to the real article
//!
//! Dedup always compares [`CandidateLink::key`] and keeps the first occurrence, so candidates come
//! out in the order they first appear in the source.

pub mod paginated;
pub mod static_page;
pub mod timeline;

use itertools::Itertools;

use crate::models::CandidateLink;

/// Drop later duplicates by normalized URL, preserving first-seen order.
pub fn dedup_links(links: impl IntoIterator<Item = CandidateLink>) -> Vec<CandidateLink> {
    links.into_iter().unique_by(|link| link.key()).collect()
}
