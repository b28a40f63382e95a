// ABOUTME: Maps a generic XML tree onto PodcastInfo and a sorted list of valid Episodes.
// ABOUTME: Applies the documented fallback chains; only a missing channel is fatal.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::duration_parse::normalize_duration;
use crate::error::FeedError;
use crate::fields::{
    extract_attribute, extract_audio_url, extract_categories, extract_image_url, extract_text,
    first_non_empty,
};
use crate::html_utils::strip_html;
use crate::models::{Episode, ParsedFeed, PodcastInfo};
use crate::normalize::{is_explicit, parse_keywords, Ordinal};
use crate::time_parse::{parse_feed_date, parse_feed_date_or};
use crate::xml_tree::XmlNode;

/// Maps a parsed document, using the current time for missing dates.
pub fn map_feed(doc: &XmlNode) -> Result<ParsedFeed, FeedError> {
    map_feed_at(doc, Utc::now())
}

/// Maps a parsed document with an explicit "now" for date fallbacks.
///
/// Items missing a title or audio URL are dropped; the rest are sorted newest
/// first, keeping feed order for equal dates.
pub fn map_feed_at(doc: &XmlNode, now: DateTime<Utc>) -> Result<ParsedFeed, FeedError> {
    let channel = doc
        .first("rss")
        .and_then(|rss| rss.first("channel"))
        .ok_or_else(|| FeedError::structure("no channel found"))?;

    let podcast = build_podcast_info(channel, now);
    info!(title = %podcast.title, author = %podcast.author, "podcast metadata extracted");

    let items = channel.get("item");
    debug!(count = items.len(), "processing feed items");

    let mut seen_ids: HashSet<String> = HashSet::with_capacity(items.len());
    let episodes: Vec<Episode> = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let mut episode = build_episode(item, index, &podcast.image_url, now);
            if episode.audio_url.is_empty() {
                warn!(index, "episode missing audio URL");
            }
            if !seen_ids.insert(episode.id.clone()) {
                let id = unique_positional_id(&seen_ids, index);
                warn!(index, id = %episode.id, replacement = %id, "duplicate episode id");
                seen_ids.insert(id.clone());
                episode.id = id;
            }
            episode
        })
        .collect();

    let mut valid: Vec<Episode> = episodes
        .into_iter()
        .filter(|episode| {
            let keep = episode.is_valid();
            if !keep {
                debug!(id = %episode.id, "dropping episode without title or audio URL");
            }
            keep
        })
        .collect();

    // sort_by is stable: equal dates keep feed order.
    valid.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
    info!(valid = valid.len(), total = items.len(), "episodes processed");

    Ok(ParsedFeed {
        podcast,
        episodes: valid,
    })
}

/// Builds channel-level metadata.
pub fn build_podcast_info(channel: &XmlNode, now: DateTime<Utc>) -> PodcastInfo {
    let description = strip_html(&first_non_empty([
        extract_text(channel.get("description")),
        extract_text(channel.get("itunes:summary")),
    ]));

    let image_url = extract_image_url(channel.get("itunes:image"))
        .or_else(|| extract_image_url(channel.get("image")))
        .unwrap_or_default();

    let author = first_non_empty([
        extract_text(channel.get("itunes:author")),
        extract_text(channel.get("managingEditor")),
        "Unknown".to_string(),
    ]);

    let last_build_date = parse_feed_date_or(
        [
            extract_text(channel.get("lastBuildDate")).as_str(),
            extract_text(channel.get("pubDate")).as_str(),
        ],
        now,
    );

    let email = channel
        .first("itunes:owner")
        .map(|owner| extract_text(owner.get("itunes:email")))
        .filter(|email| !email.is_empty());

    PodcastInfo {
        title: extract_text(channel.get("title")),
        description,
        image_url,
        author,
        categories: extract_categories(channel),
        language: first_non_empty([extract_text(channel.get("language")), "en".to_string()]),
        last_build_date,
        explicit: is_explicit(&extract_text(channel.get("itunes:explicit"))),
        podcast_type: first_non_empty([
            extract_text(channel.get("itunes:type")),
            "episodic".to_string(),
        ]),
        email,
    }
}

/// Builds one episode from the item at `index`.
///
/// `fallback_image` is the podcast-level artwork, used when the item has none.
/// The result may be invalid; filtering is the caller's job.
pub fn build_episode(
    item: &XmlNode,
    index: usize,
    fallback_image: &str,
    now: DateTime<Utc>,
) -> Episode {
    let guid = extract_text(item.get("guid"));
    let id = if guid.is_empty() {
        positional_id(index)
    } else {
        guid
    };

    let audio_url = first_non_empty([
        extract_audio_url(item.get("enclosure")),
        extract_attribute(item.get("media:content"), "url"),
    ]);

    let description = strip_html(&first_non_empty([
        extract_text(item.get("content:encoded")),
        extract_text(item.get("description")),
        extract_text(item.get("itunes:summary")),
        extract_text(item.get("itunes:subtitle")),
    ]));

    let pub_date = extract_text(item.get("pubDate"));
    let publish_date = parse_feed_date(&pub_date).unwrap_or_else(|| {
        if !pub_date.is_empty() {
            debug!(index, pub_date = %pub_date, "unparseable pubDate, using current time");
        }
        now
    });

    let image_url = extract_image_url(item.get("itunes:image")).or_else(|| {
        if fallback_image.is_empty() {
            None
        } else {
            Some(fallback_image.to_string())
        }
    });

    let explicit_nodes = item.get("itunes:explicit");
    let explicit = if explicit_nodes.is_empty() {
        None
    } else {
        Some(is_explicit(&extract_text(explicit_nodes)))
    };

    let subtitle = Some(strip_html(&extract_text(item.get("itunes:subtitle"))))
        .filter(|subtitle| !subtitle.is_empty());

    Episode {
        id,
        title: first_non_empty([
            extract_text(item.get("title")),
            extract_text(item.get("itunes:title")),
        ]),
        description,
        audio_url,
        publish_date,
        duration: normalize_duration(&extract_text(item.get("itunes:duration"))),
        episode_number: ordinal(item, "itunes:episode", index),
        season: ordinal(item, "itunes:season", index),
        image_url,
        keywords: parse_keywords(&extract_text(item.get("itunes:keywords"))),
        explicit,
        subtitle,
    }
}

fn ordinal(item: &XmlNode, tag: &str, index: usize) -> Option<u32> {
    let parsed = Ordinal::parse(&extract_text(item.get(tag)));
    if parsed == Ordinal::Unparseable {
        debug!(index, tag, "ignoring non-numeric value");
    }
    parsed.positive()
}

fn positional_id(index: usize) -> String {
    format!("episode-{}", index)
}

/// `episode-<index>`, or `episode-<index>-<n>` with the smallest free `n >= 2`.
fn unique_positional_id(seen: &HashSet<String>, index: usize) -> String {
    let base = positional_id(index);
    if !seen.contains(&base) {
        return base;
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !seen.contains(candidate))
        .unwrap_or(base)
}
