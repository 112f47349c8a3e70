// src/crawl/engine.rs
// =============================================================================
// This module implements the recursive, concurrent crawl.
//
// How it works:
// 1. The seed URL is claimed and crawled at depth 0
// 2. A crawl task fetches its page through the fetch gate
// 3. Every anchor on the page is normalized and filtered
// 4. Each surviving link is recorded as a result
// 5. If the link's URL has never been claimed, this task claims it and spawns
//    a child task for it at depth + 1
// 6. The task waits for all of its children before it finishes
//
// Step 6 makes the tasks a tree: when the root task returns, every page below
// it has been fully processed, so the result set is complete.
//
// Termination: a URL can be claimed only once and depth only goes up, so on
// any finite site (cycles included) the number of tasks is finite.
// =============================================================================

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, debug_span, info, warn, Instrument};
use url::Url;

use super::registry::{ResultSet, VisitedSet};
use crate::config::CrawlConfig;
use crate::error::CrawlError;
use crate::fetch::FetchGate;
use crate::links::{extract_links, is_crawlable, normalize, Link, RawLink};

/// What a finished crawl found.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub seed: String,
    /// Sorted by label, then href.
    pub links: Vec<Link>,
    /// URLs claimed for traversal, the seed included.
    pub pages_visited: usize,
    /// Pages that came back as HTML and were scanned for links.
    pub pages_fetched: usize,
    pub elapsed_ms: u64,
}

/// Asks a running crawl to stop. Requests already on the wire finish
/// normally; tasks that have not fetched yet, including those queued on the
/// fetch gate, give up without touching the network.
#[derive(Debug, Clone)]
pub struct StopSignal {
    requested: Arc<AtomicBool>,
    gate: FetchGate,
}

impl StopSignal {
    fn new(gate: FetchGate) -> Self {
        Self {
            requested: Arc::new(AtomicBool::new(false)),
            gate,
        }
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
        self.gate.close();
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

// Everything the crawl tasks share. One per crawl, never global.
struct CrawlState {
    config: CrawlConfig,
    gate: FetchGate,
    visited: VisitedSet,
    results: ResultSet,
    pages_visited: AtomicUsize,
    pages_fetched: AtomicUsize,
    stop: StopSignal,
}

impl CrawlState {
    fn claim(&self, url: &Url) -> bool {
        if !self.visited.claim(url.as_str()) {
            return false;
        }
        let count = self.pages_visited.fetch_add(1, Ordering::Relaxed) + 1;
        if count % 100 == 0 {
            info!(pages = count, "crawl progress");
        }
        true
    }

    // Normalize + filter one anchor. None means "silently skip it".
    fn accept(&self, page: &Url, raw: RawLink) -> Option<(Url, Link)> {
        let target = match normalize(page, &raw.href) {
            Ok(target) => target,
            Err(e) => {
                debug!(error = %e, "skipping href");
                return None;
            }
        };

        if !is_crawlable(&self.config.seed, &target) {
            return None;
        }

        let link = Link::new(raw.label, target.to_string());
        Some((target, link))
    }
}

pub struct Crawler {
    state: Arc<CrawlState>,
}

impl Crawler {
    pub fn new(config: CrawlConfig) -> Result<Self, CrawlError> {
        config.validate()?;
        let gate = FetchGate::new(&config)?;
        let stop = StopSignal::new(gate.clone());

        Ok(Self {
            state: Arc::new(CrawlState {
                config,
                gate,
                visited: VisitedSet::new(),
                results: ResultSet::new(),
                pages_visited: AtomicUsize::new(0),
                pages_fetched: AtomicUsize::new(0),
                stop,
            }),
        })
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.state.stop.clone()
    }

    /// Runs the crawl to completion and returns the sorted results.
    pub async fn run(self) -> CrawlReport {
        let started = Instant::now();
        let config = &self.state.config;
        let seed = config.seed.clone();

        info!(
            seed = %seed,
            max_depth = config.max_depth,
            concurrency = self.state.gate.limit(),
            debug = config.debug,
            "starting crawl"
        );

        // Claim the seed up front so links back to it don't crawl it again
        self.state.claim(&seed);

        let root = tokio::spawn(crawl_page(Arc::clone(&self.state), seed.clone(), 0));
        if let Err(e) = root.await {
            warn!(error = %e, "root crawl task failed");
        }

        let links = self.state.results.drain_sorted();
        let report = CrawlReport {
            seed: seed.to_string(),
            pages_visited: self.state.pages_visited.load(Ordering::Relaxed),
            pages_fetched: self.state.pages_fetched.load(Ordering::Relaxed),
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            links,
        };

        info!(
            links = report.links.len(),
            pages = report.pages_visited,
            elapsed_ms = report.elapsed_ms,
            "crawl finished"
        );
        report
    }
}

// One crawl task. Boxed because it spawns copies of itself.
fn crawl_page(state: Arc<CrawlState>, url: Url, depth: usize) -> BoxFuture<'static, ()> {
    // parent: None keeps spans flat instead of nesting one level per hop
    let span = debug_span!(parent: None, "page", url = %url, depth);

    async move {
        if depth > state.config.max_depth {
            debug!("depth limit reached");
            return;
        }
        if state.stop.is_requested() {
            debug!("stop requested, not fetching");
            return;
        }

        let Some(page) = state.gate.fetch(&url).await else {
            return;
        };
        state.pages_fetched.fetch_add(1, Ordering::Relaxed);
        debug!(content_type = %page.content_type, bytes = page.body.len(), "scanning page");

        let mut children = JoinSet::new();

        for raw in extract_links(&page.body) {
            let Some((target, link)) = state.accept(&url, raw) else {
                continue;
            };

            // Recorded even when the URL is already claimed: another label
            // for the same href is another result
            state.results.record(link);

            if !state.claim(&target) {
                continue;
            }
            if state.stop.is_requested() {
                debug!(url = %target, "stop requested, not descending");
                continue;
            }

            children.spawn(crawl_page(Arc::clone(&state), target, depth + 1));
        }

        while let Some(joined) = children.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "crawl task panicked");
            }
        }
    }
    .instrument(span)
    .boxed()
}
