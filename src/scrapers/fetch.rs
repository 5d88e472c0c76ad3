//! Page download.
//!
//! [`PageFetcher`] is the seam between the extractor and the network. The
//! production implementation, [`HttpFetcher`], makes one GET per URL with
//! reqwest's default redirect policy and no retries.
//!
//! Bodies are decoded with the charset from `Content-Type` when the server
//! sends one, otherwise with the `<meta charset>` (or `http-equiv`) declared
//! near the top of the document, otherwise as UTF-8.

use crate::error::FetchError;
use crate::utils::truncate_for_log;
use encoding_rs::{Encoding, UTF_8};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Something that can turn a URL into an HTML document.
pub trait PageFetcher {
    /// Download `url` and return its body as text.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// [`PageFetcher`] backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client, optionally with a per-request timeout.
    pub fn new(timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status();
        info!(status = status.as_u16(), "Response received");

        let response = response.error_for_status().inspect_err(|_| {
            warn!(
                status = status.as_u16(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Non-success status"
            );
        })?;
        let header_charset = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|ct| charset_label(ct.as_bytes()))
            .and_then(|label| Encoding::for_label(label.as_bytes()));
        let bytes = response.bytes().await?;
        let encoding = header_charset
            .or_else(|| sniff_meta_charset(&bytes))
            .unwrap_or(UTF_8);
        let (body, _, had_errors) = encoding.decode(&bytes);
        if had_errors {
            warn!(encoding = encoding.name(), "Malformed sequences replaced while decoding");
        }
        let body = body.into_owned();
        debug!(
            encoding = encoding.name(),
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            preview = %truncate_for_log(&body, 500),
            "Fetched page"
        );
        Ok(body)
    }
}

/// Bytes scanned for an in-document charset declaration.
const META_SNIFF_LIMIT: usize = 1024;

/// Encoding declared by a `<meta>` tag in the head of the document.
fn sniff_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(META_SNIFF_LIMIT)];
    let lower = head.to_ascii_lowercase();
    let meta = lower.windows(5).position(|w| w == b"<meta")?;
    charset_label(&lower[meta..]).and_then(|label| Encoding::for_label(label.as_bytes()))
}

/// Value following the first `charset=` in `text`, without quotes.
fn charset_label(text: &[u8]) -> Option<String> {
    let lower = text.to_ascii_lowercase();
    let at = lower.windows(8).position(|w| w == b"charset=")?;
    let label: String = lower[at + 8..]
        .iter()
        .skip_while(|&&b| b == b'"' || b == b'\'' || b == b' ')
        .take_while(|&&b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.'))
        .map(|&b| b as char)
        .collect();
    (!label.is_empty()).then_some(label)
}
