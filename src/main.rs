//! # pydocs_scrape
//!
//! Scrapes the Python documentation and PEP sites into small tables.
//!
//! ## Modes
//!
//! - `whats-new`: link, title and editors of every "What's New" article
//! - `latest-versions`: documented Python versions and their support status
//! - `download`: saves the zipped A4 PDF documentation into `downloads/`
//! - `pep`: cross-checks every PEP's index status against its own page and
//!   counts the statuses
//!
//! ## Usage
//!
//! ```sh
//! pydocs_scrape pep -o pretty
//! pydocs_scrape latest-versions --output file
//! RUST_LOG=debug pydocs_scrape whats-new --clear-cache
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: pages come through a [`fetch::PageFetcher`], by default
//!    HTTP behind an on-disk response cache
//! 2. **Scraping**: the selected mode builds a [`models::ResultTable`]
//! 3. **Output**: the table goes to stdout, a pretty table or a CSV file
//!
//! Logs go to stderr; stdout carries only results.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cache;
mod cli;
mod config;
mod error;
mod fetch;
mod markup;
mod models;
mod outputs;
mod progress;
mod scrapers;

use cache::{CachingFetcher, ResponseCache};
use cli::Cli;
use config::Settings;
use fetch::HttpFetcher;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("pydocs_scrape starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut settings = Settings::load(args.config.as_deref())?;
    settings.show_progress = !args.no_progress;

    let cache = ResponseCache::new(settings.cache_path());
    if args.clear_cache {
        if let Err(e) = cache.clear().await {
            warn!(dir = %cache.dir().display(), error = %e, "Failed to clear response cache");
        }
    }
    let fetcher = CachingFetcher::new(HttpFetcher::new(&settings)?, cache);

    info!(mode = %args.mode, "Running scraper");
    let results = match scrapers::run(args.mode, &fetcher, &settings).await {
        Ok(results) => results,
        Err(e) => {
            error!(mode = %args.mode, error = %e, "Scraper failed; no output written");
            return Err(e.into());
        }
    };

    match results {
        Some(table) => {
            info!(rows = table.len(), "Writing results");
            if let Some(path) = outputs::control_output(&table, args.output, args.mode, &settings)? {
                info!(path = %path.display(), "Results file written");
            }
        }
        None => info!(mode = %args.mode, "No table produced"),
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Scraper finished"
    );

    Ok(())
}
