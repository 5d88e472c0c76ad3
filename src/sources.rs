//! Which pages to scrape.
//!
//! By default the run walks [`DEFAULT_URLS`]. A URL file (one URL per line,
//! `#` comments and blank lines ignored) replaces that list.

use crate::error::ConfigError;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

/// Pages scraped when no URL file is given.
pub const DEFAULT_URLS: &[&str] = &[
    "https://www.indiblogger.in/post/sri-lakshmi-narasimmar-temple-avaniyapuram-tiruvannamalai-district-tamil-nadu",
    "https://www.indiblogger.in/post/african-tulip-tree",
    "https://www.indiblogger.in/post/self-worth-698da496e6",
    "https://www.animalarthouse.com/",
    "https://visual.ly/community/Infographics/animals/vic-west-pet-hospital-one-stop-animal-veterinary-care",
    "https://www.amazon.com/stores/page/6B20A11B-F085-4202-A36F-8FF4E822BD3E",
    "https://apps.apple.com/us/app/pre-k-preschool-learning-games/id1398891807",
    "https://www.bloggingfusion.com/listing/florida/florida-city-4/food-delivery-apps/spotneats",
    "https://www.afternic.com/forsale/terragame.com?utm_source=TDFS_DASLNC&utm_medium=parkedpages&utm_campaign=x_corp_tdfs-daslnc_base&traffic_type=TDFS_DASLNC&traffic_id=daslnc&",
    "https://www.washingtonpost.com/politics/",
    "https://mashable.com/",
    "https://www.reddit.com/r/news/comments/1cncwru/contractors_spraypainted_over_propalestinian/?rdt=50430",
    "https://www.bbc.co.uk/news/health-68900203",
    "https://www.bbc.com/news/articles/ck5k0874nzro",
    "https://www.bbc.co.uk/sport/football/68978816",
    "https://milkroad.com/news/ftx-reveals-plan-to-reimburse-creditors-most-will-receive-118-of-claims/",
    "https://milkroad.com/news/donald-trumps-potential-return-could-boost-bitcoin-standard-chartered/",
    "https://www.nature.com/articles/s41586-024-07238-x",
    "https://www.bbc.com/sport/articles/cmm3v9ny78eo",
    "https://www.nature.com/articles/s41586-024-07182-w",
    "https://www.investopedia.com/terms/a/articles-of-association.asp",
];

/// The built-in list as owned strings.
pub fn default_urls() -> Vec<String> {
    DEFAULT_URLS.iter().map(|u| u.to_string()).collect()
}

/// Parse a URL list. Every entry must be an absolute http(s) URL.
pub fn parse_url_list(text: &str) -> Result<Vec<String>, ConfigError> {
    let mut urls = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let valid = Url::parse(line)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !valid {
            return Err(ConfigError::InvalidUrl {
                line: i + 1,
                url: line.to_string(),
            });
        }
        urls.push(line.to_string());
    }
    Ok(urls)
}

/// Read a URL list from disk.
#[instrument(level = "info", skip_all, fields(%path))]
pub async fn load_url_file(path: &str) -> Result<Vec<String>, ConfigError> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
    let urls = parse_url_list(&text)?;
    info!(count = urls.len(), "Loaded URL list");
    Ok(urls)
}
