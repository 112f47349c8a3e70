// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Usage:
//   link-crawler [URL] [--depth=n] [--debug] [--concurrency=k] [--json]
//
// clap handles --help (exit 0) and rejects malformed numbers such as
// --depth=-1 or --depth=abc with a usage error (non-zero exit) before we
// ever build a crawler.
// =============================================================================

use clap::Parser;

use crate::config::{DEFAULT_CONCURRENCY, DEFAULT_MAX_DEPTH, DEFAULT_SEED, DEFAULT_TIMEOUT_SECS};

// #[derive(Parser)] generates the parsing code from the fields below
#[derive(Parser, Debug)]
#[command(
    name = "link-crawler",
    version,
    about = "Recursively collect the internal links of a website",
    long_about = "link-crawler starts at a URL, follows every link that stays on the same host \
                  up to a depth limit, and prints each (label, link) pair it found, sorted by label."
)]
pub struct Cli {
    /// The URL to start crawling from
    #[arg(default_value = DEFAULT_SEED)]
    pub url: String,

    /// Limit recursive link depth
    ///
    /// Depth 0 = only the links on the starting page
    /// Depth 1 = ... plus the links on every page it links to
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub depth: usize,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Maximum number of requests in flight at once
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Follow HTTP redirects instead of classifying the 3xx response itself
    #[arg(long)]
    pub follow_redirects: bool,

    /// Print the crawl report as JSON instead of `label -> href` lines
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["link-crawler"]).unwrap();
        assert_eq!(cli.url, "https://example.com/");
        assert_eq!(cli.depth, 10);
        assert!(!cli.debug);
        assert_eq!(cli.concurrency, 100);
    }

    #[test]
    fn test_depth_with_equals_sign() {
        let cli = Cli::try_parse_from(["link-crawler", "https://rust-lang.org", "--depth=3", "--debug"])
            .unwrap();
        assert_eq!(cli.url, "https://rust-lang.org");
        assert_eq!(cli.depth, 3);
        assert!(cli.debug);
    }

    #[test]
    fn test_rejects_negative_depth() {
        assert!(Cli::try_parse_from(["link-crawler", "--depth=-1"]).is_err());
        assert!(Cli::try_parse_from(["link-crawler", "--depth=ten"]).is_err());
    }

    #[test]
    fn test_help_is_not_a_failure() {
        let err = Cli::try_parse_from(["link-crawler", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
        assert_eq!(err.exit_code(), 0);
    }
}
