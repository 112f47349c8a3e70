// src/crawl/registry.rs
// =============================================================================
// The two pieces of state every crawl task shares.
//
// - VisitedSet: which URLs have already been claimed for traversal
// - ResultSet: every (label, href) pair found so far
//
// Both are DashSets: a hash set split into shards, each behind its own lock.
// Callers never lock anything themselves, and `insert` reports whether the
// value was new as a single atomic step.
// =============================================================================

use dashmap::DashSet;

use crate::links::Link;

#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: DashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true iff this call is the first to add `url`. Of any number of
    /// concurrent claims on the same URL, exactly one wins.
    pub fn claim(&self, url: &str) -> bool {
        self.urls.insert(url.to_string())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.urls.len()
    }
}

/// Deduplicated by the full (label, href) pair: the same href under two
/// different labels is two results.
#[derive(Debug, Default)]
pub struct ResultSet {
    links: DashSet<Link>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, link: Link) {
        self.links.insert(link);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Empties the set into a Vec sorted by label, then href.
    pub fn drain_sorted(&self) -> Vec<Link> {
        let mut links: Vec<Link> = self.links.iter().map(|link| link.key().clone()).collect();
        self.links.clear();
        links.sort();
        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_claim_once() {
        let visited = VisitedSet::new();
        assert!(visited.claim("https://example.com/a"));
        assert!(!visited.claim("https://example.com/a"));
        assert!(visited.claim("https://example.com/b"));
        assert_eq!(visited.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_claims_have_one_winner() {
        let visited = Arc::new(VisitedSet::new());
        let barrier = Arc::new(tokio::sync::Barrier::new(64));

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let visited = Arc::clone(&visited);
                let barrier = Arc::clone(&barrier);
                tokio::spawn(async move {
                    barrier.wait().await;
                    visited.claim("https://example.com/contended")
                })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_record_dedups_identical_pairs() {
        let results = ResultSet::new();
        let link = Link::new(Some("News".into()), "https://example.com/news".into());
        results.record(link.clone());
        results.record(link);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_distinct_labels_for_same_href_are_kept() {
        let results = ResultSet::new();
        results.record(Link::new(Some("News".into()), "https://example.com/news".into()));
        results.record(Link::new(Some("Latest".into()), "https://example.com/news".into()));

        let sorted = results.drain_sorted();
        assert_eq!(sorted.len(), 2);
        assert_eq!(sorted[0].label, "Latest");
        assert_eq!(sorted[1].label, "News");
        assert_eq!(results.len(), 0);
    }
}
