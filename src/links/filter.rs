// src/links/filter.rs
// =============================================================================
// Decides whether a normalized URL is one we are allowed to crawl.
//
// Two rules:
// 1. The scheme must be http or https
// 2. The host must equal the seed's host, ignoring case
//
// Hosts are compared exactly: "www.example.com" and "example.com" are two
// different sites as far as the crawler is concerned.
// =============================================================================

use tracing::debug;
use url::Url;

const ALLOWED_SCHEMES: [&str; 2] = ["http", "https"];

pub fn is_crawlable(seed: &Url, candidate: &Url) -> bool {
    if !is_http_link(candidate) {
        debug!(url = %candidate, "skipping non-http(s) link");
        return false;
    }
    if !is_same_host(seed, candidate) {
        debug!(url = %candidate, "skipping link outside the seed's host");
        return false;
    }
    true
}

fn is_http_link(url: &Url) -> bool {
    ALLOWED_SCHEMES
        .iter()
        .any(|scheme| url.scheme().eq_ignore_ascii_case(scheme))
}

fn is_same_host(seed: &Url, other: &Url) -> bool {
    match (seed.host_str(), other.host_str()) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}
