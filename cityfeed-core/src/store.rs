//! The feed store: the only shared mutable state in the core.
//!
//! One mutex guards the feed and its two derived views together. A
//! merge's read-compute-write, a view refresh, and every read all take
//! the same lock, so no source's merge can interleave with another's and
//! lose its contribution.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use log::info;

use crate::config::FeedConfig;
use crate::error::FeedResult;
use crate::event::{Event, Feed, FeedMeta};
use crate::merge::{self, MergeContext};
use crate::views;

/// The feed plus its derived projections, always swapped together.
#[derive(Debug, Clone)]
pub struct FeedState {
    pub feed: Feed,
    pub today: Feed,
    pub hour: Feed,
}

/// Process-wide holder of the current feed. Owned behind an `Arc` by the
/// orchestrator and whoever serves reads; there are no globals.
pub struct FeedStore {
    city: String,
    api_version: String,
    whitelist: Vec<Event>,
    ctx: MergeContext,
    state: Mutex<FeedState>,
}

impl FeedStore {
    /// Create a store seeded with the whitelist events (filtered to the
    /// future, like any other merge input).
    pub fn new(config: &FeedConfig, now: DateTime<Utc>) -> FeedResult<Self> {
        let ctx = MergeContext {
            blacklist: config
                .blacklist_events
                .iter()
                .map(|entry| entry.id.clone())
                .collect(),
            dedup: config.dedup(),
            tz: config.tz()?,
            display_time_format: config.display_time_format.clone(),
        };

        let empty = Feed {
            meta: FeedMeta {
                generated_at: now,
                location: config.city.clone(),
                api_version: config.api_version.clone(),
                total_events: 0,
            },
            events: Vec::new(),
        };

        let store = FeedStore {
            city: config.city.clone(),
            api_version: config.api_version.clone(),
            whitelist: config.whitelist_events.clone(),
            ctx,
            state: Mutex::new(FeedState {
                feed: empty.clone(),
                today: empty.clone(),
                hour: empty,
            }),
        };

        store.begin_cycle(now);
        Ok(store)
    }

    /// Start an update cycle: reset the feed metadata and re-seed the
    /// whitelist. Runs under the store lock like any merge, so an
    /// overlapping cycle cannot corrupt the feed.
    pub fn begin_cycle(&self, now: DateTime<Utc>) {
        let mut state = self.lock();
        state.feed.meta = FeedMeta {
            generated_at: now,
            location: self.city.clone(),
            api_version: self.api_version.clone(),
            total_events: 0,
        };
        state.feed.events.clear();
        state.feed = merge::merge(&state.feed, self.whitelist.clone(), &self.ctx, now);
        self.refresh_views(&mut state, now);
    }

    /// Apply one source's completed fetch: merge and view recomputation
    /// happen as a single atomic read-compute-write under the lock.
    pub fn ingest(&self, source: &str, incoming: Vec<Event>, now: DateTime<Utc>) {
        let mut state = self.lock();
        let before = state.feed.events.len() as i64;
        state.feed = merge::merge(&state.feed, incoming, &self.ctx, now);
        let delta = state.feed.events.len() as i64 - before;
        info!("Added {} {} events", delta, source);
        self.refresh_views(&mut state, now);
    }

    /// Snapshot of the first `count` events.
    ///
    /// `generated_at` here is the read time; the stored feed keeps its
    /// own `generated_at` from the last update cycle. `total_events`
    /// echoes the requested count, even when fewer events exist.
    pub fn get(&self, count: usize) -> Feed {
        let state = self.lock();
        Feed {
            meta: FeedMeta {
                generated_at: Utc::now(),
                location: state.feed.meta.location.clone(),
                api_version: state.feed.meta.api_version.clone(),
                total_events: count,
            },
            events: state.feed.events.iter().take(count).cloned().collect(),
        }
    }

    /// Read access to the live feed and views.
    ///
    /// The guard holds the same lock merges take: hold it briefly and
    /// never across an await point.
    pub fn read(&self) -> MutexGuard<'_, FeedState> {
        self.lock()
    }

    fn refresh_views(&self, state: &mut FeedState, now: DateTime<Utc>) {
        state.today = views::today_view(&state.feed);
        state.hour = views::hour_view(&state.feed, now, self.ctx.tz, &self.ctx.display_time_format);
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        // A poisoned lock means a merge panicked mid-swap; the stored
        // feed is still the last fully merged one, so keep serving it.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
