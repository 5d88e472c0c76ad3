//! Command-line interface definitions.
//!
//! Every option is optional: with no arguments the scraper walks the
//! built-in URL list with the built-in selector table and writes
//! `scraping_results.csv` in the current directory.

use clap::Parser;

/// Default output file name.
pub const DEFAULT_OUTPUT: &str = "scraping_results.csv";

/// Command-line arguments for the article scraper.
///
/// # Examples
///
/// ```sh
/// # Built-in URL list and selectors
/// article_scraper
///
/// # Own URL list and selector table
/// article_scraper --urls urls.txt --selectors blog.yaml -o blog.csv
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// CSV file to write (truncated at the start of every run)
    #[arg(short, long, env = "SCRAPER_OUTPUT", default_value = DEFAULT_OUTPUT)]
    pub output: String,

    /// File with one URL per line; replaces the built-in URL list
    #[arg(short, long, env = "SCRAPER_URLS")]
    pub urls: Option<String>,

    /// YAML selector table; fields it omits keep their built-in rule
    #[arg(short, long, env = "SCRAPER_SELECTORS")]
    pub selectors: Option<String>,

    /// Per-request timeout in seconds (no timeout when omitted)
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}
