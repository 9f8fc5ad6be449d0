use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use cityfeed_core::FeedConfig;

/// Full configuration for the cityfeed binary: the core feed settings
/// plus the per-source adapter tables.
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub feed: FeedConfig,

    /// ICS subscriptions to aggregate.
    #[serde(default)]
    pub ics_feeds: Vec<IcsFeedConfig>,
}

/// One ICS subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct IcsFeedConfig {
    pub group_name: String,
    pub group_url: String,
    pub ics_url: String,
}

/// Get the config directory path (~/.config/cityfeed)
pub fn config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join("cityfeed");
    Ok(config_dir)
}

/// Get the config file path (~/.config/cityfeed/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load the config from the given path, or ~/.config/cityfeed/config.toml
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => config_path()?,
    };

    if !path.exists() {
        anyhow::bail!(
            "Config file not found at {}\n\n\
            Create it with your city settings:\n\n\
            city = \"Singapore\"\n\
            timezone = \"Asia/Singapore\"\n\
            display_time_format = \"%d %b %Y, %a, %I:%M %p\"\n\
            api_version = \"1.0\"\n\n\
            [[ics_feeds]]\n\
            group_name = \"Hack & Tell\"\n\
            group_url = \"https://example.com/hack-and-tell\"\n\
            ics_url = \"https://example.com/hack-and-tell/events.ics\"",
            path.display()
        );
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;

    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

    Ok(config)
}
