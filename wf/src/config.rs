//! WaitFor configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::dispatch::DEFAULT_CHANNEL_CAPACITY;
use crate::error::{WaitError, WaitResult};

/// Wait configuration, scoped to one client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    /// Timeout applied when a call passes none; unset waits indefinitely
    pub default_timeout_ms: Option<u64>,

    /// Raw gateway event that carries interactions
    pub interaction_event: String,

    /// Field of the interaction object holding its kind
    pub discriminator_field: String,

    /// Prefix of synthetic event names
    pub synthetic_prefix: String,

    /// Channel capacity of the client's event bus
    pub bus_capacity: usize,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: None,
            interaction_event: "INTERACTION_CREATE".to_string(),
            discriminator_field: "type".to_string(),
            synthetic_prefix: "on_".to_string(),
            bus_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl WaitConfig {
    /// Default timeout as a Duration
    pub fn default_timeout(&self) -> Option<Duration> {
        debug!(default_timeout_ms = ?self.default_timeout_ms, "WaitConfig::default_timeout: called");
        self.default_timeout_ms.map(Duration::from_millis)
    }

    /// Load configuration with fallback chain
    ///
    /// Only an explicit path that fails to load is an error; broken fallback
    /// files are logged and skipped.
    pub fn load(config_path: Option<&PathBuf>) -> WaitResult<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path)
                .context(format!("Failed to load config from {}", path.display()))
                .map_err(WaitError::Config);
        }

        // Try project-local config: .waitfor.yml
        let local_config = PathBuf::from(".waitfor.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/waitfor/waitfor.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("waitfor").join("waitfor.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = WaitConfig::default();
        assert_eq!(config.default_timeout(), None);
        assert_eq!(config.interaction_event, "INTERACTION_CREATE");
        assert_eq!(config.discriminator_field, "type");
        assert_eq!(config.synthetic_prefix, "on_");
        assert_eq!(config.bus_capacity, DEFAULT_CHANNEL_CAPACITY);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = "default_timeout_ms: 60000\n";
        let config: WaitConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.default_timeout(), Some(Duration::from_secs(60)));
        assert_eq!(config.synthetic_prefix, "on_");
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "synthetic_prefix: evt_").unwrap();
        writeln!(file, "bus_capacity: 16").unwrap();

        let config = WaitConfig::load(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(config.synthetic_prefix, "evt_");
        assert_eq!(config.bus_capacity, 16);
        assert_eq!(config.interaction_event, "INTERACTION_CREATE");
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("nope.yml");
        let err = WaitConfig::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, WaitError::Config(_)));
        assert!(err.to_string().contains("nope.yml"));
        assert_eq!(err.event(), None);
    }

    #[test]
    fn test_load_invalid_yaml_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bus_capacity: [not, a, number]").unwrap();
        let err = WaitConfig::load(Some(&file.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, WaitError::Config(_)));
    }
}
