//! Concrete event sources.
//!
//! Each source implements the [`EventSource`] contract from
//! cityfeed-core and normalizes its platform's payloads into canonical
//! events. The orchestrator runs them independently; one source failing
//! or hanging never holds up the others.

pub mod ics;

use std::sync::Arc;

use anyhow::Result;
use cityfeed_core::EventSource;

use crate::config::Config;

/// Build every source configured in the config file.
pub fn build_sources(config: &Config) -> Result<Vec<Arc<dyn EventSource>>> {
    let mut sources: Vec<Arc<dyn EventSource>> = Vec::new();

    if !config.ics_feeds.is_empty() {
        sources.push(Arc::new(ics::IcsSource::new(
            &config.feed,
            config.ics_feeds.clone(),
        )?));
    }

    Ok(sources)
}
