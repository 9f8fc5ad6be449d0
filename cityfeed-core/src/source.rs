//! The source adapter contract.
//!
//! Each adapter converts one platform's API into a sequence of canonical
//! events. A failing or slow adapter must never keep another adapter's
//! results out of the feed; the orchestrator treats a fetch failure as
//! zero events from that source for the cycle.

use async_trait::async_trait;
use log::warn;

use crate::error::{FeedError, FeedResult};
use crate::event::Event;

/// One event source.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Short tag identifying the source (also used as the platform tag on
    /// the events it produces).
    fn name(&self) -> &str;

    /// Fetch and normalize this source's upcoming events.
    async fn fetch(&self) -> FeedResult<Vec<Event>>;
}

/// Tries candidate sources in order until one succeeds.
///
/// This is the shape of rotating through credentials where any one of
/// several may have expired: the first candidate that fetches wins and
/// later ones are not consulted. Exhausting every candidate is an
/// explicit error, reported once, rather than a silent empty result.
pub struct FallbackSource {
    name: String,
    candidates: Vec<Box<dyn EventSource>>,
}

impl FallbackSource {
    pub fn new(name: impl Into<String>, candidates: Vec<Box<dyn EventSource>>) -> Self {
        FallbackSource {
            name: name.into(),
            candidates,
        }
    }
}

#[async_trait]
impl EventSource for FallbackSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> FeedResult<Vec<Event>> {
        for candidate in &self.candidates {
            match candidate.fetch().await {
                Ok(events) => return Ok(events),
                Err(err) => {
                    warn!(
                        "Source candidate '{}' failed, trying next: {}",
                        candidate.name(),
                        err
                    );
                }
            }
        }

        Err(FeedError::SourcesExhausted(self.candidates.len()))
    }
}
