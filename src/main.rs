//! # Article Scraper
//!
//! Fetches a list of article pages, pulls article fields out of each one with
//! CSS selectors, and writes one CSV row per page.
//!
//! ## Usage
//!
//! ```sh
//! article_scraper
//! article_scraper --urls urls.txt --selectors blog.yaml --output blog.csv
//! ```
//!
//! ## Flow
//!
//! 1. **Configure**: load the URL list and selector table (built-in by default)
//! 2. **Open output**: truncate the CSV file and write its header
//! 3. **Scrape**: for each URL in order, fetch it, extract a record, append a row
//!
//! A page that fails to download or extract is logged and skipped; the run
//! carries on with the next URL.

use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod error;
mod models;
mod outputs;
mod scrapers;
mod selectors;
mod sources;
mod utils;

use cli::Cli;
use outputs::csv_sink::CsvSink;
use scrapers::fetch::HttpFetcher;
use selectors::SelectorConfig;
use utils::ensure_parent_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("article_scraper starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Configuration ----
    let urls = match &args.urls {
        Some(path) => sources::load_url_file(path).await?,
        None => sources::default_urls(),
    };
    info!(count = urls.len(), "URL list ready");

    let selector_config = match &args.selectors {
        Some(path) => SelectorConfig::load(path).await?,
        None => SelectorConfig::default(),
    };
    let rules = selector_config.compile()?;

    let fetcher = HttpFetcher::new(args.timeout_secs.map(Duration::from_secs))?;

    // ---- Output ----
    let output_path = Path::new(&args.output);
    if let Err(e) = ensure_parent_dir(output_path).await {
        error!(path = %args.output, error = %e, "Cannot create output directory");
        return Err(e);
    }
    let mut sink = CsvSink::create(output_path)?;

    // ---- Scrape ----
    let summary = scrapers::scrape_all(&fetcher, &urls, &rules, &mut sink).await?;
    let rows = sink.finish()?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        attempted = summary.attempted,
        written = rows,
        skipped = summary.fetch_failures + summary.parse_failures,
        path = %args.output,
        "Execution complete"
    );

    Ok(())
}
