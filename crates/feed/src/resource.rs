// ABOUTME: HTTP retrieval of feed documents with a bounded timeout and charset decoding.
// ABOUTME: FeedFetcher wraps a reqwest client; FeedFetcherBuilder configures it fluently.

use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::{debug, info, warn};

use crate::error::FeedError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_USER_AGENT: &str = "PodcastFeed/1.0";
pub const DEFAULT_ACCEPT: &str = "application/rss+xml, application/xml, text/xml";

/// Options applied to every feed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Upper bound for the whole exchange, body included.
    pub timeout: Duration,
    pub user_agent: String,
    pub accept: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
        }
    }
}

/// Downloads feed documents as text.
#[derive(Debug, Clone)]
pub struct FeedFetcher {
    opts: FetchOptions,
    http_client: reqwest::Client,
}

impl FeedFetcher {
    /// Create a new FeedFetcherBuilder for configuring the fetcher.
    pub fn builder() -> FeedFetcherBuilder {
        FeedFetcherBuilder::new()
    }

    /// Create a fetcher with the given options.
    pub fn new(opts: FetchOptions) -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent(&opts.user_agent)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self { opts, http_client }
    }

    pub fn options(&self) -> &FetchOptions {
        &self.opts
    }

    /// Fetches `url` and returns the decoded body.
    ///
    /// Fails with `InvalidUrl` before any I/O for non-http(s) URLs, `Timeout`
    /// when the exchange outlives the configured timeout, `HttpStatus` for
    /// non-2xx answers and `EmptyResponse` for blank bodies.
    pub async fn fetch(&self, url: &str) -> Result<String, FeedError> {
        let parsed = url::Url::parse(url).map_err(|e| FeedError::invalid_url(url, e))?;
        let scheme = parsed.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(FeedError::invalid_url(url, "scheme must be http or https"));
        }

        debug!(url, timeout_ms = self.opts.timeout.as_millis() as u64, "fetching feed");
        let started = Instant::now();

        // Dropping the inner future on expiry cancels the request.
        let body = tokio::time::timeout(self.opts.timeout, self.fetch_body(parsed))
            .await
            .map_err(|_| FeedError::Timeout(self.opts.timeout))??;

        info!(
            url,
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "feed fetched"
        );
        Ok(body)
    }

    async fn fetch_body(&self, url: url::Url) -> Result<String, FeedError> {
        let response = self
            .http_client
            .get(url)
            .header(ACCEPT, &self.opts.accept)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::HttpStatus {
                code: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_lowercase());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let text = decode_body(&bytes, content_type.as_deref());
        if text.trim().is_empty() {
            return Err(FeedError::EmptyResponse);
        }
        Ok(text)
    }

    fn map_transport_error(&self, err: reqwest::Error) -> FeedError {
        if err.is_timeout() {
            FeedError::Timeout(self.opts.timeout)
        } else {
            FeedError::network(err)
        }
    }
}

impl Default for FeedFetcher {
    fn default() -> Self {
        Self::new(FetchOptions::default())
    }
}

/// Builder for FeedFetcher.
#[derive(Debug, Clone, Default)]
pub struct FeedFetcherBuilder {
    opts: FetchOptions,
}

impl FeedFetcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Set the Accept header.
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.opts.accept = accept.into();
        self
    }

    /// Replace all options at once.
    pub fn options(mut self, opts: FetchOptions) -> Self {
        self.opts = opts;
        self
    }

    pub fn build(self) -> FeedFetcher {
        FeedFetcher::new(self.opts)
    }
}

/// Decode body bytes using the Content-Type charset, else byte-level detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(encoding) = content_type
        .and_then(extract_charset)
        .and_then(|charset| encoding_rs::Encoding::for_label(charset.as_bytes()))
    {
        let (decoded, _, _) = encoding.decode(body);
        return decoded.into_owned();
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from a Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .to_lowercase()
        .split(';')
        .find_map(|part| part.trim().strip_prefix("charset=").map(str::to_string))
        .map(|charset| charset.trim_matches('"').trim_matches('\'').to_string())
}
