// ABOUTME: Errors surfaced by the data routes and their HTTP status mapping.
// ABOUTME: Network-path failures map to 503; everything else is a 500.

use podcast_feed::FeedError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("RSS feed URL not configured")]
    NotConfigured,

    #[error(transparent)]
    Feed(#[from] FeedError),
}

impl ServiceError {
    pub fn status(&self) -> u16 {
        match self {
            ServiceError::Feed(err) if err.is_transient() => 503,
            _ => 500,
        }
    }
}
