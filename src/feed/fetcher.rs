use crate::feed::parser::{parse_feed, FetchedFeed};
use crate::feed::sources::SourceSpec;
use crate::util::{validate_feed_url, UrlValidationError};
use futures::stream::{self, StreamExt};
use std::time::Duration;
use thiserror::Error;

const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Default number of feeds fetched at the same time.
pub const DEFAULT_CONCURRENCY: usize = 10;
/// Default per-feed timeout, covering both the request and the body.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("feedboard/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur while fetching one feed.
///
/// Any of these removes that one source from the run; the others carry on.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The configured URL is not a fetchable http(s) URL
    #[error("Invalid feed URL: {0}")]
    InvalidUrl(#[from] UrlValidationError),
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request plus body exceeded the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// Feed XML could not be parsed as RSS or Atom
    #[error("Parse error: {0}")]
    Parse(String),
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

/// How feeds are fetched.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub concurrency: usize,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Builds the HTTP client used for every feed in a run.
pub fn build_client(options: &FetchOptions) -> Result<reqwest::Client, FetchError> {
    let client = reqwest::Client::builder()
        .user_agent(options.user_agent.clone())
        .build()?;
    Ok(client)
}

/// Fetches every source concurrently.
///
/// Up to `options.concurrency` requests are in flight at once. Results come
/// back in the same order as `sources`, whatever order the requests finish
/// in, and the function only returns once every fetch has completed.
///
/// Failures are returned per source and logged; they never stop the other
/// fetches.
pub async fn fetch_all(
    client: &reqwest::Client,
    sources: &[SourceSpec],
    options: &FetchOptions,
) -> Vec<Result<FetchedFeed, FetchError>> {
    if sources.is_empty() {
        return Vec::new();
    }

    let results: Vec<Result<FetchedFeed, FetchError>> = stream::iter(sources)
        .map(|spec| async move {
            let result = fetch_one(client, &spec.url, options.timeout).await;
            match &result {
                Ok(feed) => tracing::debug!(
                    url = %spec.url,
                    entries = feed.entries.len(),
                    "Fetched feed"
                ),
                Err(e) => tracing::warn!(
                    url = %spec.url,
                    error = %e,
                    "Feed fetch failed, skipping source"
                ),
            }
            result
        })
        .buffered(options.concurrency.max(1))
        .collect()
        .await;

    let failed = results.iter().filter(|r| r.is_err()).count();
    tracing::info!(
        total = results.len(),
        failed = failed,
        "Finished fetching feeds"
    );

    results
}

/// Fetches and parses a single feed.
///
/// One attempt only; there is no retry. `timeout` bounds the whole exchange
/// including the body download.
///
/// # Errors
///
/// - [`FetchError::InvalidUrl`] - not an http(s) URL
/// - [`FetchError::Network`] - connection or TLS errors
/// - [`FetchError::Timeout`] - `timeout` elapsed
/// - [`FetchError::HttpStatus`] - non-2xx response
/// - [`FetchError::ResponseTooLarge`] - body over 10MB
/// - [`FetchError::IncompleteResponse`] - body shorter than Content-Length
/// - [`FetchError::Parse`] - not RSS or Atom
pub async fn fetch_one(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<FetchedFeed, FetchError> {
    let url = validate_feed_url(url)?;

    let bytes = tokio::time::timeout(timeout, async {
        let response = client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        read_limited_bytes(response, MAX_FEED_SIZE).await
    })
    .await
    .map_err(|_| FetchError::Timeout(timeout))??;

    parse_feed(&bytes).map_err(|e| FetchError::Parse(e.to_string()))
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    // Fast path: check Content-Length header
    if let Some(len) = expected_length {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}
