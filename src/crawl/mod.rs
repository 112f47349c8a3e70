// src/crawl/mod.rs
// =============================================================================
// This module handles the crawl itself.
//
// Features:
// - One async task per newly discovered page, all running concurrently
// - Each URL is traversed at most once, even on sites full of cycles
// - Only links on the seed's host are followed
// - Inclusive depth limit
// - Every task waits for its children, so "done" really means done
//
// Submodules:
// - registry: the shared visited set and result set
// - engine: the crawler and its recursive task
// =============================================================================

mod engine;
mod registry;

pub use engine::{CrawlReport, Crawler};
