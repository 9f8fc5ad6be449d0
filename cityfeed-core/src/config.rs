//! The configuration surface consumed by the aggregation core.

use chrono_tz::Tz;
use serde::Deserialize;

use crate::dedup::{DedupConfig, DEFAULT_DESCRIPTION_OVERLAP_THRESHOLD};
use crate::error::{FeedError, FeedResult};
use crate::event::{BlacklistEntry, Event};

/// Core feed settings. The binary crate loads these from the config
/// file; adapters and the store both read from here.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// City name, used for the feed's `location` metadata and discounted
    /// as a stop word by the duplicate heuristic.
    pub city: String,
    /// IANA timezone name, e.g. "Asia/Singapore".
    pub timezone: String,
    /// chrono format string used to render `formatted_time`,
    /// e.g. "%d %b %Y, %a, %I:%M %p". Must carry the full date: the
    /// future-only filter and the hour view parse it back.
    pub display_time_format: String,
    pub api_version: String,
    /// Seed events merged into the feed at the start of every update
    /// cycle. Their `formatted_time` must match `display_time_format`.
    #[serde(default)]
    pub whitelist_events: Vec<Event>,
    /// Event ids excluded from the feed regardless of source.
    #[serde(default)]
    pub blacklist_events: Vec<BlacklistEntry>,
    /// Extra words the duplicate heuristic ignores on top of its built-in
    /// stop list.
    #[serde(default)]
    pub ignore_words_in_duplicate_events: Vec<String>,
    /// Minimum description-token overlap for two same-time events to be
    /// considered duplicates when their names only partially overlap.
    #[serde(default = "default_description_overlap_threshold")]
    pub description_overlap_threshold: usize,
}

fn default_description_overlap_threshold() -> usize {
    DEFAULT_DESCRIPTION_OVERLAP_THRESHOLD
}

impl FeedConfig {
    /// Resolve the configured timezone name.
    pub fn tz(&self) -> FeedResult<Tz> {
        self.timezone
            .parse()
            .map_err(|_| FeedError::UnknownTimezone(self.timezone.clone()))
    }

    /// Duplicate-heuristic settings derived from this config.
    pub fn dedup(&self) -> DedupConfig {
        DedupConfig::new(
            &self.ignore_words_in_duplicate_events,
            &self.city,
            self.description_overlap_threshold,
        )
    }
}
