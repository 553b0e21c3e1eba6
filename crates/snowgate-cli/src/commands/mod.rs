//! CLI command implementations.

pub mod check;
pub mod serve;

use anyhow::{Context, Result};
use snowgate_core::SnowgateConfig;
use std::path::Path;
use tracing::warn;

/// Default configuration file name.
pub const DEFAULT_CONFIG: &str = "snowgate.yaml";

/// Load the configuration file, falling back to defaults when it does not exist.
pub fn load_config(path: &Path) -> Result<SnowgateConfig> {
    if !path.exists() {
        warn!(config = %path.display(), "Config file not found, using defaults");
        return Ok(SnowgateConfig::default());
    }

    SnowgateConfig::from_file(path)
        .with_context(|| format!("Failed to load config file: {}", path.display()))
}
