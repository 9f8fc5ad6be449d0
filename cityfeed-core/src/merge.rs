//! The merge pipeline: one completed source fetch folded into the feed.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::warn;

use crate::dedup::{self, DedupConfig};
use crate::event::{Event, Feed};
use crate::timefmt;

/// Settings shared by every merge against one feed.
#[derive(Debug, Clone)]
pub struct MergeContext {
    /// Event ids excluded regardless of source.
    pub blacklist: HashSet<String>,
    pub dedup: DedupConfig,
    pub tz: Tz,
    pub display_time_format: String,
}

/// Fold `incoming` into `feed`: blacklist filter, concatenation,
/// future-only filter on display time, stable sort by start time,
/// duplicate removal, meta recount.
///
/// Pure with respect to the store: the caller swaps the returned feed in
/// under the store lock so the read-compute-write never interleaves with
/// another merge.
pub fn merge(feed: &Feed, incoming: Vec<Event>, ctx: &MergeContext, now: DateTime<Utc>) -> Feed {
    let allowed = incoming
        .into_iter()
        .filter(|event| !ctx.blacklist.contains(&event.id));

    let mut events: Vec<Event> = feed.events.iter().cloned().chain(allowed).collect();

    events.retain(|event| {
        match timefmt::parse_display_time(&event.formatted_time, ctx.tz, &ctx.display_time_format) {
            Some(display) => display > now,
            None => {
                // Malformed record: drop it, not the batch.
                warn!(
                    "Dropping event with unparseable display time {:?}: {}",
                    event.formatted_time, event.url
                );
                false
            }
        }
    });

    // Stable sort: same-start events keep their arrival order, so the
    // dedup scan below prefers whichever arrived first.
    events.sort_by_key(|event| event.start_time);
    let events = dedup::remove_duplicates(&ctx.dedup, events);

    let mut meta = feed.meta.clone();
    meta.total_events = events.len();

    Feed { meta, events }
}
