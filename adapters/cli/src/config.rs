//! Loading of simulation tuning from TOML files.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use horde_defence_core::SimulationConfig;

/// Reads the configuration at `path`, or the stock tuning when no path is given.
pub(crate) fn load(path: Option<&Path>) -> Result<SimulationConfig> {
    let Some(path) = path else {
        return Ok(SimulationConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid configuration in {}", path.display()))
}

fn parse(contents: &str) -> Result<SimulationConfig> {
    let config: SimulationConfig =
        toml::from_str(contents).context("failed to parse configuration toml contents")?;
    config
        .validate()
        .context("configuration failed validation")?;
    Ok(config)
}
