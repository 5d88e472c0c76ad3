//! Error types for fetching, extracting and configuring the scraper.
//!
//! Per-URL failures are expressed as a [`ScrapeError`], which tells the
//! caller whether the page never arrived ([`FetchError`]) or arrived but
//! could not be turned into a record ([`ParseErrorKind`]). Neither ever
//! aborts a run. [`ConfigError`] covers everything that is wrong before
//! the first request is made.

/// Why a page could not be downloaded.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The connection could not be established (DNS, refused, TLS, ...).
    #[error("connection failed: {0}")]
    Connect(String),

    /// The redirect chain exceeded the client's redirect limit.
    #[error("too many redirects")]
    TooManyRedirects,

    /// The server answered with a non-2xx status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// The response started but its body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),

    /// Any other request failure, including malformed URLs.
    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_redirect() {
            FetchError::TooManyRedirects
        } else if let Some(status) = e.status() {
            FetchError::Status(status.as_u16())
        } else if e.is_connect() {
            FetchError::Connect(e.to_string())
        } else if e.is_body() || e.is_decode() {
            FetchError::Body(e.to_string())
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

/// Why a downloaded document could not be turned into a record.
#[derive(Debug, thiserror::Error)]
pub enum ParseErrorKind {
    /// A numeric field matched an element whose text is not an integer.
    ///
    /// Only produced under [`NumberPolicy::Strict`](crate::selectors::NumberPolicy).
    #[error("field '{field}' expected an integer, found '{text}'")]
    InvalidNumber {
        field: &'static str,
        text: String,
        #[source]
        error: std::num::ParseIntError,
    },
}

/// Outcome of a failed scrape of a single URL.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("parse failed: {0}")]
    Parse(#[from] ParseErrorKind),
}

/// Problems with the run's configuration: selector table or URL list.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid selector config {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// A rule's CSS selector does not parse.
    #[error("invalid CSS selector for field '{field}' ('{selector}'): {error}")]
    InvalidSelector {
        field: &'static str,
        selector: String,
        error: String,
    },

    /// A line of the URL list is not an absolute http(s) URL.
    #[error("invalid URL on line {line}: '{url}'")]
    InvalidUrl { line: usize, url: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_error_wraps_fetch_error() {
        let err: ScrapeError = FetchError::Status(404).into();
        assert!(matches!(err, ScrapeError::Fetch(FetchError::Status(404))));
        assert_eq!(err.to_string(), "fetch failed: HTTP status 404");
    }

    #[test]
    fn test_scrape_error_wraps_parse_error() {
        let error = "12 claps".parse::<u64>().unwrap_err();
        let err: ScrapeError = ParseErrorKind::InvalidNumber {
            field: "claps",
            text: "12 claps".to_string(),
            error,
        }
        .into();
        assert!(matches!(err, ScrapeError::Parse(_)));
        assert!(err.to_string().contains("'12 claps'"));
    }

    #[test]
    fn test_invalid_selector_message_names_field() {
        let err = ConfigError::InvalidSelector {
            field: "title",
            selector: "h1[".to_string(),
            error: "unexpected end".to_string(),
        };
        assert!(err.to_string().contains("field 'title'"));
    }
}
