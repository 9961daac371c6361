//! Engine configuration file support.
//!
//! Tunables are read from a TOML file; every field has a default so an
//! absent or partial file still yields a working configuration.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tunable engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How many alternative slots a conflict rejection carries.
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,
    /// Seed for the randomized search order. Unset means a fresh entropy
    /// seed per run; set it to make generation reproducible.
    #[serde(default)]
    pub generator_seed: Option<u64>,
}

fn default_suggestion_limit() -> usize {
    5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            suggestion_limit: default_suggestion_limit(),
            generator_seed: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("failed to read config file {}", path.as_ref().display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.as_ref().display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.suggestion_limit, 5);
        assert!(config.generator_seed.is_none());
    }

    #[test]
    fn test_parse_full() {
        let config: EngineConfig =
            toml::from_str("suggestion_limit = 3\ngenerator_seed = 42\n").unwrap();
        assert_eq!(config.suggestion_limit, 3);
        assert_eq!(config.generator_seed, Some(42));
    }

    #[test]
    fn test_parse_partial_uses_defaults() {
        let config: EngineConfig = toml::from_str("generator_seed = 7\n").unwrap();
        assert_eq!(config.suggestion_limit, 5);
        assert_eq!(config.generator_seed, Some(7));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(EngineConfig::from_file("/nonexistent/engine.toml").is_err());
    }
}
