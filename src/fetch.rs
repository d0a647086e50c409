//! HTTP fetching for base pages and policy pages
//!
//! Single attempt per call, bounded timeout, limited redirects, and a
//! content-type gate so only HTML bodies flow into the parsing stages.
//! Every failure mode is represented in [`FetchErrorKind`]; nothing
//! escapes this boundary as a panic or untyped error.

use futures::StreamExt;
use reqwest::redirect::Policy;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::HttpConfig;

/// Why a fetch attempt failed. One variant per failure class so callers
/// can map outcomes onto site statuses without string matching.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchErrorKind {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    ConnectionError(String),

    #[error("HTTP status {0}")]
    HttpError(u16),

    #[error("unsupported content type: {0}")]
    InvalidContentType(String),
}

/// A successfully fetched HTML page.
///
/// `final_url` is the URL after redirects were followed; relative links on
/// the page must be resolved against it, not the URL originally requested.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub html: String,
    pub final_url: Url,
}

/// HTTP client wrapper shared across the whole batch.
pub struct PolicyFetcher {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl PolicyFetcher {
    pub fn new(config: &HttpConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes,
        })
    }

    /// Fetch a URL and return its HTML body.
    ///
    /// Success requires a 2xx terminal status after redirects and an HTML
    /// compatible content type. The body is read with a streaming cap of
    /// `max_body_bytes`; oversized responses are truncated, not rejected.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchErrorKind> {
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            debug!("Non-success status {} for {}", status, url);
            return Err(FetchErrorKind::HttpError(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();

        // Absent content-type headers are tolerated; anything explicitly
        // non-HTML (JSON APIs, PDFs, images) is rejected before download.
        if !content_type.is_empty()
            && !content_type.starts_with("text/html")
            && !content_type.starts_with("application/xhtml")
        {
            return Err(FetchErrorKind::InvalidContentType(content_type));
        }

        let final_url = response.url().clone();
        let html = read_body_capped(response, self.max_body_bytes).await?;

        Ok(FetchedPage { html, final_url })
    }

    /// Probe a URL with a HEAD request, returning true on a 2xx response.
    /// Used only by the opt-in common-path fallback in the site processor.
    pub async fn head_ok(&self, url: &Url) -> bool {
        match self.client.head(url.clone()).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!("HEAD probe failed for {}: {}", url, e);
                false
            }
        }
    }
}

/// Map a reqwest transport error to the fetch taxonomy.
fn classify_transport_error(e: reqwest::Error) -> FetchErrorKind {
    if e.is_timeout() {
        FetchErrorKind::Timeout
    } else {
        FetchErrorKind::ConnectionError(e.to_string())
    }
}

/// Read an HTTP response body with streaming truncation.
///
/// Reads the body in chunks, stopping at `max_bytes` to prevent memory
/// exhaustion from adversarial or unexpectedly large responses. Returns
/// the body as a String (lossy UTF-8 conversion covers truncated
/// multi-byte boundaries).
async fn read_body_capped(
    response: reqwest::Response,
    max_bytes: usize,
) -> Result<String, FetchErrorKind> {
    let mut body = Vec::with_capacity(max_bytes.min(256 * 1024));
    let mut stream = response.bytes_stream();
    let mut total = 0usize;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(classify_transport_error)?;
        let remaining = max_bytes.saturating_sub(total);
        if remaining == 0 {
            debug!("Response body truncated at {} bytes (limit: {})", total, max_bytes);
            break;
        }
        let take = chunk.len().min(remaining);
        body.extend_from_slice(&chunk[..take]);
        total += take;
    }

    Ok(String::from_utf8_lossy(&body).into_owned())
}
