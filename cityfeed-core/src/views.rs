//! Derived read views of the feed.
//!
//! Both views copy the parent feed's metadata and carry their own event
//! count; they are recomputed after every merge and never mutated on
//! their own.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

use crate::event::{Event, Feed};
use crate::timefmt;

/// Events whose start date is the same calendar date as the feed's
/// `generated_at`, comparing the stored timestamps directly.
///
/// An event two hours away can fall outside this view (just past
/// midnight) while one thirteen hours away is inside it; behavior near
/// midnight and timezone boundaries follows the stored timestamps, not
/// the local wall clock.
pub fn today_view(feed: &Feed) -> Feed {
    let generated_on = feed.meta.generated_at.date_naive();
    let events: Vec<Event> = feed
        .events
        .iter()
        .filter(|event| event.start_time.date_naive() == generated_on)
        .cloned()
        .collect();

    project(feed, events)
}

/// Events whose display time falls before `now + 1h`.
///
/// The base feed is already future-only, so this reads as "starts within
/// the next hour", not a two-sided window.
pub fn hour_view(feed: &Feed, now: DateTime<Utc>, tz: Tz, display_time_format: &str) -> Feed {
    let cutoff = now + Duration::hours(1);
    let events: Vec<Event> = feed
        .events
        .iter()
        .filter(|event| {
            matches!(
                timefmt::parse_display_time(&event.formatted_time, tz, display_time_format),
                Some(display) if display < cutoff
            )
        })
        .cloned()
        .collect();

    project(feed, events)
}

fn project(feed: &Feed, events: Vec<Event>) -> Feed {
    let mut meta = feed.meta.clone();
    meta.total_events = events.len();
    Feed { meta, events }
}
