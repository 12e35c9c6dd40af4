//! Configuration loading
//!
//! Layers, lowest to highest precedence: built-in defaults, the root config
//! file, environment variable overrides.

use super::{paths, schema::Config};
use crate::graph::Direction;
use anyhow::{Context, Result};
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers applied
    pub fn load() -> Result<Config> {
        Self::load_from(&paths::root_config_path())
    }

    /// Load with `path` as the file layer; a missing file means defaults
    pub fn load_from(path: &Path) -> Result<Config> {
        let config = if path.exists() {
            Self::load_file(path)?
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Self::load_defaults()
        };
        Ok(Self::apply_env_overrides(config))
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        Config::default()
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: Config) -> Config {
        if let Ok(url) = std::env::var("FLUXTREE_API_URL") {
            config.api_url = url;
        }

        if let Ok(namespace) = std::env::var("FLUXTREE_FLUX_NAMESPACE") {
            config.flux_namespace = namespace;
        }

        if let Ok(direction) = std::env::var("FLUXTREE_LAYOUT_DIRECTION") {
            match direction.parse::<Direction>() {
                Ok(val) => config.layout.direction = val,
                Err(e) => tracing::warn!("Ignoring FLUXTREE_LAYOUT_DIRECTION: {}", e),
            }
        }

        config
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Save root configuration
    pub fn save_root(config: &Config) -> Result<()> {
        Self::save(config, &paths::root_config_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ConfigLoader::load_file(&tmp.path().join("config.yaml"));
        assert!(config.is_err());
        assert_eq!(
            ConfigLoader::load_defaults().flux_namespace,
            "flux-system"
        );
    }

    #[test]
    fn test_save_then_load_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.yaml");
        let mut config = Config::default();
        config.logs.buffer = 42;
        ConfigLoader::save(&config, &path).unwrap();
        assert_eq!(ConfigLoader::load_file(&path).unwrap(), config);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "layout: [not, a, map]").unwrap();
        assert!(ConfigLoader::load_file(&path).is_err());
    }

    #[test]
    fn test_env_overrides() {
        // SAFETY: set_var is unsafe in Rust 2024 due to potential data races.
        // No other test reads these variables.
        unsafe {
            std::env::set_var("FLUXTREE_API_URL", "http://override:1234");
            std::env::set_var("FLUXTREE_LAYOUT_DIRECTION", "down");
        }

        let config = ConfigLoader::apply_env_overrides(Config::default());

        assert_eq!(config.api_url, "http://override:1234");
        assert_eq!(config.layout.direction, Direction::Down);

        // SAFETY: see above
        unsafe {
            std::env::remove_var("FLUXTREE_API_URL");
            std::env::remove_var("FLUXTREE_LAYOUT_DIRECTION");
        }
    }
}
