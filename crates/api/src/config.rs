// ABOUTME: Serving configuration: feed URL, fetch options, cache TTL and CORS origin.
// ABOUTME: Built fluently via ServiceConfigBuilder or read from environment variables.

use std::time::Duration;

use podcast_feed::FetchOptions;
use thiserror::Error;

pub const ENV_FEED_URL: &str = "RSS_FEED_URL";
pub const ENV_TIMEOUT_SECS: &str = "FEED_TIMEOUT_SECS";
pub const ENV_CACHE_TTL_SECS: &str = "CACHE_TTL_SECS";
pub const ENV_CORS_ORIGIN: &str = "CORS_ORIGIN";

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_ALLOWED_ORIGIN: &str = "*";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Configuration for PodcastService.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Upstream feed. Data routes answer 500 while this is unset.
    pub feed_url: Option<String>,
    pub fetch: FetchOptions,
    /// Zero disables caching.
    pub cache_ttl: Duration,
    pub allowed_origin: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            feed_url: None,
            fetch: FetchOptions::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::new()
    }

    /// Reads `RSS_FEED_URL`, `FEED_TIMEOUT_SECS`, `CACHE_TTL_SECS` and `CORS_ORIGIN`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like `from_env`, with variables supplied by `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut builder = ServiceConfig::builder();
        if let Some(url) = get(ENV_FEED_URL) {
            builder = builder.feed_url(url);
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            builder = builder.timeout(Duration::from_secs(parse_secs(ENV_TIMEOUT_SECS, &raw)?));
        }
        if let Some(raw) = get(ENV_CACHE_TTL_SECS) {
            builder = builder.cache_ttl(Duration::from_secs(parse_secs(ENV_CACHE_TTL_SECS, &raw)?));
        }
        if let Some(origin) = get(ENV_CORS_ORIGIN) {
            builder = builder.allowed_origin(origin);
        }
        Ok(builder.build())
    }
}

fn parse_secs(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Builder for ServiceConfig.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed_url(mut self, url: impl Into<String>) -> Self {
        self.config.feed_url = Some(url.into());
        self
    }

    /// Set the upstream request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.fetch.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.fetch.user_agent = user_agent.into();
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.cache_ttl = ttl;
        self
    }

    pub fn allowed_origin(mut self, origin: impl Into<String>) -> Self {
        self.config.allowed_origin = origin.into();
        self
    }

    pub fn build(self) -> ServiceConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.feed_url, None);
        assert_eq!(config.fetch.timeout, Duration::from_secs(10));
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.allowed_origin, "*");
    }

    #[test]
    fn reads_all_variables() {
        let config = ServiceConfig::from_lookup(lookup(&[
            (ENV_FEED_URL, "https://example.com/feed.xml"),
            (ENV_TIMEOUT_SECS, "4"),
            (ENV_CACHE_TTL_SECS, "0"),
            (ENV_CORS_ORIGIN, "https://podcast.example.com"),
        ]))
        .unwrap();

        assert_eq!(config.feed_url.as_deref(), Some("https://example.com/feed.xml"));
        assert_eq!(config.fetch.timeout, Duration::from_secs(4));
        assert_eq!(config.cache_ttl, Duration::ZERO);
        assert_eq!(config.allowed_origin, "https://podcast.example.com");
    }

    #[test]
    fn blank_feed_url_is_unset() {
        let config = ServiceConfig::from_lookup(lookup(&[(ENV_FEED_URL, "  ")])).unwrap();
        assert_eq!(config.feed_url, None);
    }

    #[test]
    fn bad_number_is_rejected() {
        let err = ServiceConfig::from_lookup(lookup(&[(ENV_CACHE_TTL_SECS, "five")])).unwrap_err();
        match err {
            ConfigError::InvalidValue { key, value, .. } => {
                assert_eq!(key, ENV_CACHE_TTL_SECS);
                assert_eq!(value, "five");
            }
        }
    }
}
