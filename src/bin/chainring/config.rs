use std::{fs, path::Path};

use anyhow::Context;
use chainring::{avec::EncodeOptions, text::ParseOptions};
use serde::Deserialize;
use tracing::debug;

/// Settings read from a TOML file, before command-line overrides.
///
/// ```toml
/// [parse]
/// name = "Sweet Spot"
/// ftp = 250
///
/// [parse.thresholds]
/// rest_below = 55
///
/// [encode]
/// strings = "variable"
/// repeats = "native"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub parse: ParseOptions,
    pub encode: EncodeOptions,
}

impl Config {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        debug!(path = %path.display(), ?config, "Loaded config");

        Ok(config)
    }
}
