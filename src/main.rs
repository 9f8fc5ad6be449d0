mod config;
mod sources;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;

use cityfeed_core::{EventAggregator, FeedStore};

#[derive(Parser)]
#[command(name = "cityfeed")]
#[command(about = "Aggregate upcoming local events from independent sources into one deduplicated feed")]
struct Cli {
    /// Path to the config file (defaults to ~/.config/cityfeed/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh the feed on an interval and keep running
    Run {
        /// Seconds between update cycles
        #[arg(short, long, default_value_t = 300)]
        interval: u64,
    },
    /// Run one update cycle and print the feed as JSON
    Fetch {
        /// Maximum number of events to print
        #[arg(short = 'n', long, default_value_t = 20)]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref())?;

    let store = Arc::new(FeedStore::new(&cfg.feed, chrono::Utc::now())?);
    let aggregator = Arc::new(EventAggregator::new(store, sources::build_sources(&cfg)?));

    match cli.command {
        Commands::Run { interval } => cmd_run(aggregator, interval).await,
        Commands::Fetch { count } => cmd_fetch(aggregator, count).await,
    }
}

async fn cmd_run(aggregator: Arc<EventAggregator>, interval: u64) -> Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval.max(1)));

    loop {
        ticker.tick().await;
        // Fire-and-forget: a slow source delays only its own merge,
        // never the next tick or any read.
        aggregator.update();

        let state = aggregator.store().read();
        info!(
            "Feed: {} events total, {} today, {} within the hour",
            state.feed.meta.total_events,
            state.today.meta.total_events,
            state.hour.meta.total_events
        );
    }
}

async fn cmd_fetch(aggregator: Arc<EventAggregator>, count: usize) -> Result<()> {
    aggregator.run_cycle().await;

    let snapshot = aggregator.store().get(count);
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    Ok(())
}
