// ABOUTME: Serving layer for parsed podcast feeds: routes, envelope, pagination, cache, listener.
// ABOUTME: PodcastService is transport-agnostic; server::serve exposes it over plain HTTP/1.1.

pub mod cache;
pub mod config;
pub mod envelope;
pub mod error;
pub mod pagination;
pub mod server;
pub mod service;

pub use cache::FeedCache;
pub use config::{ConfigError, ServiceConfig, ServiceConfigBuilder};
pub use envelope::{Envelope, HealthStatus, Pagination};
pub use error::ServiceError;
pub use pagination::PageRequest;
pub use server::{serve, serve_with_shutdown};
pub use service::{ApiRequest, ApiResponse, PodcastService, Route};
