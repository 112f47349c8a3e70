// src/links/html.rs
// =============================================================================
// This module extracts raw anchors from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Nothing here resolves or filters URLs; the href comes back exactly as it
// appears in the markup, paired with the anchor's visible text. Resolving,
// filtering and deduplicating are the crawl engine's job.
//
// Rust concepts:
// - Iterators: text() yields every text node under an element
// - Option<T>: an anchor may have no visible text at all
// =============================================================================

use std::sync::OnceLock;

use scraper::{ElementRef, Html, Selector};

/// An anchor as found in the page, before any normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLink {
    /// Visible text of the anchor with whitespace collapsed.
    /// `None` when the anchor has no text (icons, images, empty tags).
    pub label: Option<String>,
    /// The href attribute, untouched.
    pub href: String,
}

fn anchor_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    // "a[href]" is a constant, known-valid selector
    SELECTOR.get_or_init(|| Selector::parse("a[href]").expect("valid selector"))
}

// Extracts every <a href> in document order
//
// Example:
//   html = "<a href='/docs'>Read the <b>docs</b></a><a href='/x'></a>"
//   result = [RawLink { label: Some("Read the docs"), href: "/docs" },
//             RawLink { label: None, href: "/x" }]
pub fn extract_links(html: &str) -> Vec<RawLink> {
    let document = Html::parse_document(html);

    document
        .select(anchor_selector())
        .filter_map(|element| {
            let href = element.value().attr("href")?.trim();
            if href.is_empty() {
                return None;
            }
            Some(RawLink {
                label: anchor_text(&element),
                href: href.to_string(),
            })
        })
        .collect()
}

fn anchor_text(element: &ElementRef) -> Option<String> {
    let text = element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why return a Vec instead of an iterator?
//    - scraper's Html document is not Send, so it cannot be held across an
//      .await inside a tokio task
//    - We parse, collect the anchors into owned Strings, and drop the DOM
//      before the crawler touches the network again
//
// 2. What is OnceLock?
//    - A cell that is written exactly once, the first time it's needed
//    - We use it so the CSS selector is parsed once per process, not once
//      per page
//
// 3. What does flat_map(str::split_whitespace) do?
//    - text() yields text nodes like "Read the ", "docs", "\n  "
//    - split_whitespace turns each into words, flat_map chains them together
//    - join(" ") glues the words back with single spaces
// -----------------------------------------------------------------------------
