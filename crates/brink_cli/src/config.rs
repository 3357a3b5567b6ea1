//! `brink.toml` loading

use anyhow::{Context, Result};
use brink_refresh::RefreshConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Everything the CLI can be configured with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrinkConfig {
    /// Edge controller settings
    pub refresh: RefreshConfig,
    /// Simulated list
    pub demo: DemoConfig,
}

/// The simulated table view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub row_height: f32,
    /// Rows shown after a refresh
    pub initial_rows: u32,
    /// Rows appended by each load-more
    pub rows_per_page: u32,
    /// Simulated network latency of a handler, in seconds
    pub load_time: f32,
    pub fps: u32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            viewport_width: 320.0,
            viewport_height: 568.0,
            row_height: 44.0,
            initial_rows: 10,
            rows_per_page: 4,
            load_time: 3.0,
            fps: 60,
        }
    }
}

impl BrinkConfig {
    /// Load from a TOML file, or the defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: BrinkConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config
            .refresh
            .validate()
            .with_context(|| format!("Invalid refresh settings in {}", path.display()))?;
        if config.demo.fps == 0 {
            anyhow::bail!("demo.fps must be at least 1 in {}", path.display());
        }

        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
