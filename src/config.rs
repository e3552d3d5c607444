//! TOML configuration with sensible defaults.
//!
//! Loaded from `tikun.toml` in the working directory when present; every
//! field has a default so a missing file is not an error. CLI flags override
//! whatever the file provides.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE: &str = "tikun.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub storage: StorageConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "tikun.db".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of synthetic progress events per submission.
    pub progress_steps: u32,
    /// Delay between progress events, in milliseconds.
    pub progress_interval_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            progress_steps: 10,
            progress_interval_ms: 300,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&raw).map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `tikun.toml` from the working directory, or fall back to defaults.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.analysis.progress_steps == 0 {
            return Err(ConfigError::Validation(
                "analysis.progress_steps must be at least 1".into(),
            ));
        }
        if self.storage.database_path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "storage.database_path must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_demo_cadence() {
        let config = Config::default();
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.analysis.progress_steps, 10);
        assert_eq!(config.analysis.progress_interval_ms, 300);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str("[gateway]\nport = 9000\n").unwrap();
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert_eq!(config.storage.database_path, "tikun.db");
    }

    #[test]
    fn zero_progress_steps_is_rejected() {
        let config: Config = toml::from_str("[analysis]\nprogress_steps = 0\n").unwrap();
        assert!(config.validate().is_err());
    }
}
