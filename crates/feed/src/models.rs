// ABOUTME: Canonical data model produced by the feed mapper.
// ABOUTME: Episode, PodcastInfo and ParsedFeed serialize to the camelCase JSON contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One feed item that passed the validity filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: String,
    pub title: String,
    pub description: String,
    pub audio_url: String,
    pub publish_date: DateTime<Utc>,
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

impl Episode {
    /// An episode is publishable only with both a title and a playable URL.
    pub fn is_valid(&self) -> bool {
        !self.audio_url.is_empty() && !self.title.is_empty()
    }
}

/// Channel-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodcastInfo {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub author: String,
    pub categories: Vec<String>,
    pub language: String,
    pub last_build_date: DateTime<Utc>,
    pub explicit: bool,
    #[serde(rename = "type")]
    pub podcast_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Result of mapping one feed document: podcast metadata plus valid
/// episodes, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedFeed {
    pub podcast: PodcastInfo,
    pub episodes: Vec<Episode>,
}
