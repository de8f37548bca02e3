//! Reel configuration file handling

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Name of the configuration file looked up next to a project
pub const CONFIG_FILE: &str = "reel.toml";

/// Top-level Reel configuration (reel.toml)
#[derive(Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ReelConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub roster: RosterConfig,
}

/// Frame pacing for `play` and `render`
#[derive(Debug, PartialEq, Deserialize, Serialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_fps")]
    pub fps: u32,
}

fn default_fps() -> u32 {
    30
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { fps: default_fps() }
    }
}

/// Log filter used when `RUST_LOG` is not set
#[derive(Debug, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

#[derive(Debug, PartialEq, Deserialize, Serialize)]
pub struct RosterConfig {
    #[serde(default = "default_max_survivors")]
    pub max_survivors: usize,
}

fn default_max_survivors() -> usize {
    reel_core::project::DEFAULT_MAX_SURVIVORS
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            max_survivors: default_max_survivors(),
        }
    }
}

impl ReelConfig {
    /// Load configuration from a directory or file path
    ///
    /// A missing reel.toml is not an error; defaults apply.
    pub fn load_from_dir(path: &Path) -> Result<Self> {
        let config_path = if path.is_file() {
            path.to_path_buf()
        } else {
            path.join(CONFIG_FILE)
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
