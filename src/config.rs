// src/config.rs
// =============================================================================
// The immutable settings of one crawl.
//
// The CLI gives us raw strings and numbers; `CrawlConfig::from_cli` validates
// them once, up front. After that the config is shared read-only by every
// crawl task.
// =============================================================================

use std::time::Duration;

use url::Url;

use crate::cli::Cli;
use crate::error::ConfigError;

pub const DEFAULT_SEED: &str = "https://example.com/";
pub const DEFAULT_MAX_DEPTH: usize = 10;
pub const DEFAULT_CONCURRENCY: usize = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Sent with every request so site owners can tell who is crawling them.
pub const USER_AGENT: &str = concat!("link-crawler/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Where the crawl starts. Its host is the only host we follow.
    pub seed: Url,
    /// Inclusive bound: pages at depth > max_depth are never fetched.
    pub max_depth: usize,
    pub debug: bool,
    /// Admission cap K on concurrent fetches.
    pub concurrency: usize,
    pub timeout: Duration,
    pub follow_redirects: bool,
}

impl CrawlConfig {
    /// Builds a config with defaults for everything except the seed.
    pub fn new(seed: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            seed: parse_seed(seed)?,
            max_depth: DEFAULT_MAX_DEPTH,
            debug: false,
            concurrency: DEFAULT_CONCURRENCY,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            follow_redirects: false,
        })
    }

    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let config = Self {
            max_depth: cli.depth,
            debug: cli.debug,
            concurrency: cli.concurrency,
            timeout: Duration::from_secs(cli.timeout),
            follow_redirects: cli.follow_redirects,
            ..Self::new(&cli.url)?
        };
        config.validate()?;
        Ok(config)
    }

    #[cfg(test)]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[cfg(test)]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

// The seed has to be something we could actually fetch: an absolute
// http(s) URL with a host. Its fragment is dropped like any other link's.
fn parse_seed(raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ConfigError::EmptySeed);
    }

    let mut url = Url::parse(raw).map_err(|source| ConfigError::InvalidSeed {
        url: raw.to_string(),
        source,
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme {
            url: raw.to_string(),
            scheme: url.scheme().to_string(),
        });
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::MissingHost(raw.to_string()));
    }

    url.set_fragment(None);
    Ok(url)
}
