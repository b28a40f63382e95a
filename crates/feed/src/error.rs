// ABOUTME: Error types for feed fetching, XML parsing, and feed mapping.
// ABOUTME: Provides FeedError with one variant per terminal failure plus classifier helpers.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Terminal failures of one fetch → parse → map invocation.
///
/// Per-field and per-episode problems never surface here; they resolve to
/// defaults inside the mapper.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The feed URL is malformed or uses a scheme other than http/https.
    #[error("invalid feed URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// DNS failure, refused connection, reset, or a broken body stream.
    #[error("Request failed: {0}")]
    Network(String),

    /// The request did not complete within the configured timeout.
    #[error("Request timeout after {} seconds", .0.as_secs())]
    Timeout(Duration),

    /// The upstream answered with a non-2xx status.
    #[error("HTTP {code}: {message}")]
    HttpStatus { code: u16, message: String },

    /// The upstream answered 2xx with a blank body.
    #[error("Empty response from RSS feed")]
    EmptyResponse,

    /// The document is not well-formed XML.
    #[error("failed to parse feed XML: {0}")]
    XmlSyntax(String),

    /// Well-formed XML that lacks an RSS channel.
    #[error("Invalid RSS feed structure - {0}")]
    Structure(String),
}

impl FeedError {
    /// Creates an InvalidUrl error.
    pub fn invalid_url(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        FeedError::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a Network error from any transport failure.
    pub fn network(err: impl fmt::Display) -> Self {
        FeedError::Network(err.to_string())
    }

    /// Creates an XmlSyntax error from the underlying reader message.
    pub fn xml(err: impl fmt::Display) -> Self {
        FeedError::XmlSyntax(err.to_string())
    }

    /// Creates a Structure error with a custom message.
    pub fn structure(msg: impl Into<String>) -> Self {
        FeedError::Structure(msg.into())
    }

    /// Returns true if this is a Timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FeedError::Timeout(_))
    }

    /// Returns true if this is a Network error.
    pub fn is_network(&self) -> bool {
        matches!(self, FeedError::Network(_))
    }

    /// Returns true for failures caused by the network path rather than the feed itself.
    pub fn is_transient(&self) -> bool {
        self.is_network() || self.is_timeout()
    }
}
