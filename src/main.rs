// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing) to stderr
// 3. Validate the arguments into a CrawlConfig
// 4. Run the crawl, stopping early on Ctrl-C
// 5. Print the sorted links and exit with a proper code
//    (0 = success, 1 = interrupted, 2 = bad configuration or internal error)
// =============================================================================

mod cli;
mod config;
mod crawl;
mod error;
mod fetch;
mod links;

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, warn};

use cli::Cli;
use config::CrawlConfig;
use crawl::{CrawlReport, Crawler};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    // clap prints usage and exits on --help (0) or malformed arguments (2)
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = match CrawlConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            warn!("{e}");
            return Ok(2);
        }
    };

    let crawler = Crawler::new(config).context("failed to set up the crawler")?;
    let stop = crawler.stop_signal();

    let crawl = crawler.run();
    tokio::pin!(crawl);

    tokio::select! {
        report = &mut crawl => {
            write_report(&mut std::io::stdout().lock(), &report, cli.json)?;
            Ok(0)
        }
        _ = interrupted() => {
            warn!("interrupted, waiting for in-flight pages to finish (Ctrl-C again to quit now)");
            stop.request();
            tokio::select! {
                report = &mut crawl => {
                    warn!(links = report.links.len(), "crawl stopped early, results are incomplete");
                }
                _ = interrupted() => {
                    warn!("interrupted again, exiting without waiting");
                }
            }
            Ok(1)
        }
    }
}

// Resolves on Ctrl-C. If the handler can't be installed we just never resolve
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

fn init_tracing(debug: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if debug {
        "link_crawler=debug"
    } else {
        "link_crawler=info"
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// Links go to stdout, everything else goes to stderr through tracing
fn write_report(out: &mut impl Write, report: &CrawlReport, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "Collected internal links (sorted by label):")?;
    for link in &report.links {
        writeln!(out, "{} -> {}", link.label, link.href)?;
    }
    writeln!(out, "Found links: {}", report.links.len())?;
    Ok(())
}
