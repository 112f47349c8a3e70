// src/links/mod.rs
// =============================================================================
// Everything about a single link, independent of the network.
//
// Submodules:
// - html: pulls raw (label, href) anchors out of a page body
// - normalize: resolves an href against its page into a canonical URL
// - filter: keeps only http(s) URLs on the seed's host
// =============================================================================

mod filter;
mod html;
mod normalize;

use serde::Serialize;

pub use filter::is_crawlable;
pub use html::{extract_links, RawLink};
pub use normalize::normalize;

/// A discovered internal link: the anchor text and the canonical href.
///
/// Ordering is by label first, so a sorted collection of links reads the way
/// the crawler prints them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Link {
    pub label: String,
    pub href: String,
}

impl Link {
    /// An anchor with no text is labelled with its own (normalized) href.
    pub fn new(label: Option<String>, href: String) -> Self {
        Self {
            label: label.unwrap_or_else(|| href.clone()),
            href,
        }
    }
}
