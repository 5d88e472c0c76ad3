//! Page scraping: download, extract, record.
//!
//! - [`fetch`]: the [`PageFetcher`](fetch::PageFetcher) seam and its HTTP implementation
//! - [`article`]: turns one HTML document into a [`Record`](crate::models::Record)
//!
//! [`scrape_all`] drives the run. URLs are handled strictly one after
//! another, in list order: one fetch, one extraction, one appended row.
//! A URL that fails to fetch or extract is logged and skipped; nothing is
//! retried.

pub mod article;
pub mod fetch;

use crate::error::ScrapeError;
use crate::outputs::csv_sink::CsvSink;
use crate::selectors::CompiledRules;
use fetch::PageFetcher;
use futures::stream::{self, StreamExt};
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};

/// Per-run counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub attempted: usize,
    pub written: usize,
    pub fetch_failures: usize,
    pub parse_failures: usize,
}

/// Scrape every URL in order and append each successful record to `sink`.
///
/// Only a failure to write the output file is returned as an error; per-URL
/// failures are counted in the summary.
#[instrument(level = "info", skip_all, fields(urls = urls.len()))]
pub async fn scrape_all<F: PageFetcher>(
    fetcher: &F,
    urls: &[String],
    rules: &CompiledRules,
    sink: &mut CsvSink,
) -> Result<RunSummary, Box<dyn Error>> {
    let mut summary = RunSummary::default();

    let outcomes = stream::iter(urls.iter().enumerate()).then(move |(index, url)| async move {
        (index, url, article::fetch_and_extract(fetcher, url, rules).await)
    });
    futures::pin_mut!(outcomes);

    while let Some((index, url, outcome)) = outcomes.next().await {
        summary.attempted += 1;
        match outcome {
            Ok(record) => {
                sink.append(&record)?;
                summary.written += 1;
                info!(index, %url, title = %record.title, "Scraped");
                if let Ok(json) = serde_json::to_string(&record) {
                    debug!(index, record = %json, "Record written");
                }
            }
            Err(ScrapeError::Fetch(e)) => {
                summary.fetch_failures += 1;
                error!(index, %url, error = %e, "Fetch failed; skipping URL");
            }
            Err(ScrapeError::Parse(e)) => {
                summary.parse_failures += 1;
                warn!(index, %url, error = %e, "Extraction failed; skipping URL");
            }
        }
    }

    info!(
        attempted = summary.attempted,
        written = summary.written,
        fetch_failures = summary.fetch_failures,
        parse_failures = summary.parse_failures,
        "Finished scraping"
    );
    Ok(summary)
}
