// ABOUTME: Transport-agnostic request handling for the podcast JSON API.
// ABOUTME: Routes requests, loads the feed through the cache, and builds enveloped responses.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use podcast_feed::{load_feed, FeedFetcher, ParsedFeed};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::cache::FeedCache;
use crate::config::ServiceConfig;
use crate::envelope::{Envelope, HealthStatus};
use crate::error::ServiceError;
use crate::pagination::PageRequest;

const EPISODES_CACHE_CONTROL: &str = "public, max-age=300";
const PODCAST_INFO_CACHE_CONTROL: &str = "public, max-age=600";
const NO_STORE: &str = "no-store";

const EPISODES_FAILURE: &str = "Failed to fetch episodes";
const PODCAST_INFO_FAILURE: &str = "Failed to fetch podcast information";

/// Known endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Episodes,
    PodcastInfo,
    Health,
}

impl Route {
    pub fn from_path(path: &str) -> Option<Self> {
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        match path {
            "/api/episodes" | "/api/rss/episodes" => Some(Route::Episodes),
            "/api/podcast-info" | "/api/rss/podcast-info" => Some(Route::PodcastInfo),
            "/health" => Some(Route::Health),
            _ => None,
        }
    }

    fn cache_control(self) -> Option<&'static str> {
        match self {
            Route::Episodes => Some(EPISODES_CACHE_CONTROL),
            Route::PodcastInfo => Some(PODCAST_INFO_CACHE_CONTROL),
            Route::Health => None,
        }
    }
}

/// An incoming request reduced to what routing needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
}

impl ApiRequest {
    /// Builds a request from a method and a request target such as `/api/episodes?limit=5`.
    /// The first occurrence of a repeated query key wins.
    pub fn new(method: impl Into<String>, target: &str) -> Self {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let mut params = HashMap::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()).into_owned() {
            params.entry(key).or_insert(value);
        }

        Self {
            method: method.into().to_ascii_uppercase(),
            path: path.to_string(),
            query: params,
        }
    }

    pub fn get(target: &str) -> Self {
        Self::new("GET", target)
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }
}

/// A fully rendered response: status, headers and JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ApiResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// The podcast API: configuration, upstream fetcher and shared feed cache.
pub struct PodcastService {
    config: ServiceConfig,
    fetcher: FeedFetcher,
    cache: FeedCache,
}

impl PodcastService {
    pub fn new(config: ServiceConfig) -> Self {
        let fetcher = FeedFetcher::builder().options(config.fetch.clone()).build();
        let cache = FeedCache::new(config.cache_ttl);
        Self {
            config,
            fetcher,
            cache,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Dispatches one request. Never fails: every outcome is a response.
    pub async fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let started = Instant::now();
        let response = match Route::from_path(&request.path) {
            None => self.error_response(404, "Route not found", None),
            Some(route) => match request.method.as_str() {
                "OPTIONS" => self.respond(200, String::new(), route.cache_control()),
                "GET" => match route {
                    Route::Episodes => self.episodes(request).await,
                    Route::PodcastInfo => self.podcast_info().await,
                    Route::Health => self.json_response(200, &HealthStatus::ok(), None),
                },
                _ => self.error_response(405, "Method not allowed", None),
            },
        };

        info!(
            method = %request.method,
            path = %request.path,
            status = response.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request handled"
        );
        response
    }

    /// Response for requests the transport could not parse.
    pub fn bad_request(&self) -> ApiResponse {
        self.error_response(400, "Bad request", None)
    }

    /// The parsed feed, from cache when fresh.
    pub async fn feed(&self) -> Result<Arc<ParsedFeed>, ServiceError> {
        let url = self
            .config
            .feed_url
            .as_deref()
            .ok_or(ServiceError::NotConfigured)?;

        if let Some(feed) = self.cache.get(url) {
            debug!(url, "feed cache hit");
            return Ok(feed);
        }

        let feed = Arc::new(load_feed(&self.fetcher, url).await?);
        self.cache.insert(url, Arc::clone(&feed));
        Ok(feed)
    }

    async fn episodes(&self, request: &ApiRequest) -> ApiResponse {
        let page = PageRequest::from_params(request.param("limit"), request.param("offset"));
        match self.feed().await {
            Ok(feed) => {
                let (episodes, pagination) = page.apply(&feed.episodes);
                self.json_response(
                    200,
                    &Envelope::page(episodes, pagination),
                    Some(EPISODES_CACHE_CONTROL),
                )
            }
            Err(err) => self.failure(EPISODES_FAILURE, err),
        }
    }

    async fn podcast_info(&self) -> ApiResponse {
        match self.feed().await {
            Ok(feed) => self.json_response(
                200,
                &Envelope::ok(&feed.podcast),
                Some(PODCAST_INFO_CACHE_CONTROL),
            ),
            Err(err) => self.failure(PODCAST_INFO_FAILURE, err),
        }
    }

    fn failure(&self, message: &str, err: ServiceError) -> ApiResponse {
        let status = err.status();
        match err {
            ServiceError::NotConfigured => {
                error!("feed URL is not configured");
                self.error_response(status, "RSS feed URL not configured", None)
            }
            ServiceError::Feed(cause) => {
                if status == 503 {
                    warn!(error = %cause, "upstream feed unavailable");
                } else {
                    error!(error = %cause, "feed load failed");
                }
                self.error_response(status, message, Some(cause.to_string()))
            }
        }
    }

    fn error_response(&self, status: u16, error: &str, details: Option<String>) -> ApiResponse {
        let envelope: Envelope<()> = Envelope::failure(error, details);
        self.json_response(status, &envelope, Some(NO_STORE))
    }

    fn json_response<T: Serialize>(
        &self,
        status: u16,
        body: &T,
        cache_control: Option<&str>,
    ) -> ApiResponse {
        match serde_json::to_string(body) {
            Ok(json) => self.respond(status, json, cache_control),
            Err(err) => {
                error!(error = %err, "failed to serialize response");
                self.respond(
                    500,
                    r#"{"success":false,"error":"Internal server error"}"#.to_string(),
                    Some(NO_STORE),
                )
            }
        }
    }

    fn respond(&self, status: u16, body: String, cache_control: Option<&str>) -> ApiResponse {
        let mut headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            (
                "Access-Control-Allow-Origin".to_string(),
                self.config.allowed_origin.clone(),
            ),
            (
                "Access-Control-Allow-Headers".to_string(),
                "Content-Type, Accept".to_string(),
            ),
            (
                "Access-Control-Allow-Methods".to_string(),
                "GET, OPTIONS".to_string(),
            ),
        ];
        if let Some(value) = cache_control {
            headers.push(("Cache-Control".to_string(), value.to_string()));
        }

        ApiResponse {
            status,
            headers,
            body,
        }
    }
}
