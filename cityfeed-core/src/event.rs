//! Canonical event and feed types.
//!
//! Source adapters normalize their platform's payloads into [`Event`];
//! the aggregation core works exclusively with these types for merging,
//! duplicate detection, and the derived views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single upcoming event, normalized from whichever source produced it.
///
/// `id` is unique within its originating source only. Cross-source
/// duplicate detection goes through the lexical heuristic in
/// [`crate::dedup`], not through ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    pub group_name: String,
    pub group_url: String,
    /// Display-formatted local time, already rendered through the
    /// configured timezone and format. Duplicate matching and the
    /// future-only filter both key on this string.
    pub formatted_time: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Tag of the source adapter that produced this event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsvp_count: Option<u32>,
}

/// An event id excluded from the feed regardless of which source sent it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlacklistEntry {
    pub id: String,
}

/// Feed metadata.
///
/// For the stored feed, `generated_at` is the start time of the last
/// update cycle. Snapshots returned by `get()` carry the read time
/// instead; the two are distinct on purpose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedMeta {
    pub generated_at: DateTime<Utc>,
    pub location: String,
    pub api_version: String,
    pub total_events: usize,
}

/// The current deduplicated, sorted, future-only collection of events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feed {
    pub meta: FeedMeta,
    pub events: Vec<Event>,
}
