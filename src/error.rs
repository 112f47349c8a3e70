// src/error.rs
// =============================================================================
// Typed errors for the parts of the crawler that can fail.
//
// Only configuration problems are fatal. Everything that goes wrong while a
// crawl is running (a page that won't load, an href that won't parse) is
// handled where it happens and never reaches the caller as an error.
//
// Rust concepts:
// - thiserror: derives std::error::Error and Display from attributes
// - #[from]: lets `?` convert a source error into our enum automatically
// =============================================================================

use thiserror::Error;

/// Problems with the command-line configuration. Reported before any request
/// is made; the process exits non-zero.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("URL must not be empty")]
    EmptySeed,

    #[error("Invalid URL '{url}': {source}")]
    InvalidSeed {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unsupported scheme '{scheme}' in '{url}' (expected http or https)")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("URL has no host: {0}")]
    MissingHost(String),

    #[error("Concurrency limit must be at least 1")]
    ZeroConcurrency,

    #[error("Request timeout must be at least 1 second")]
    ZeroTimeout,
}

/// Why an href could not be turned into a canonical absolute URL.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("cannot resolve '{href}': {source}")]
    Unparseable {
        href: String,
        #[source]
        source: url::ParseError,
    },

    #[error("'{0}' contains a malformed percent-escape")]
    BadEscape(String),

    // mailto:, javascript:, data: and friends
    #[error("'{0}' is not a hierarchical URL")]
    Opaque(String),
}

/// Errors that stop a crawl from starting.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
