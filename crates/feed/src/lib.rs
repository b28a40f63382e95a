// ABOUTME: Core podcast feed library: fetch, XML tree parsing, field extraction, and mapping.
// ABOUTME: Exposes load_feed for remote feeds and parse_feed_str for already-downloaded documents.

pub mod duration_parse;
pub mod error;
pub mod fields;
pub mod html_utils;
pub mod mapper;
pub mod models;
pub mod normalize;
pub mod resource;
pub mod time_parse;
pub mod xml_tree;

pub use duration_parse::normalize_duration;
pub use error::FeedError;
pub use html_utils::{decode_entities, strip_html};
pub use mapper::{build_episode, build_podcast_info, map_feed, map_feed_at};
pub use models::{Episode, ParsedFeed, PodcastInfo};
pub use normalize::{is_explicit, parse_keywords, Ordinal};
pub use resource::{FeedFetcher, FeedFetcherBuilder, FetchOptions};
pub use time_parse::parse_feed_date;
pub use xml_tree::{parse_xml, XmlNode};

use std::time::Instant;

use tracing::debug;

/// Parses and maps a feed document that is already in memory.
pub fn parse_feed_str(xml: &str) -> Result<ParsedFeed, FeedError> {
    let started = Instant::now();
    let doc = parse_xml(xml)?;
    debug!(
        bytes = xml.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "feed XML parsed"
    );
    map_feed(&doc)
}

/// Fetches `url` and runs it through the full pipeline.
pub async fn load_feed(fetcher: &FeedFetcher, url: &str) -> Result<ParsedFeed, FeedError> {
    let xml = fetcher.fetch(url).await?;
    parse_feed_str(&xml)
}
