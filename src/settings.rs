//! Configuration management with file and environment variable support.

use anyhow::{anyhow, Result};
use config::{Config, Environment, File};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Upstream API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the recipe API.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.themealdb.com/api/json/v1/1".to_string(),
            timeout_seconds: 10,
        }
    }
}

/// Durable store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// On-disk location of the key-value store.
    pub path: PathBuf,
    /// Skip the disk entirely; favorites live for the process only.
    pub ephemeral: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/mealdex.db"),
            ephemeral: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Main settings structure with all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl Settings {
    /// Load settings from defaults, an optional `mealdex.toml`, and
    /// `MEALDEX__`-prefixed environment variables.
    pub fn load() -> Result<Self> {
        let defaults = Config::try_from(&Settings::default())?;
        let config = Config::builder()
            .add_source(defaults)
            .add_source(File::with_name("mealdex").required(false))
            .add_source(
                Environment::with_prefix("MEALDEX")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings for consistency.
    pub fn validate(&self) -> Result<()> {
        let base = Url::parse(&self.api.base_url)
            .map_err(|e| anyhow!("invalid api.base_url {:?}: {}", self.api.base_url, e))?;
        if base.cannot_be_a_base() {
            return Err(anyhow!("api.base_url {:?} cannot carry a path", self.api.base_url));
        }
        if self.api.timeout_seconds == 0 {
            return Err(anyhow!("api.timeout_seconds cannot be 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut settings = Settings::default();
        settings.api.timeout_seconds = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn unparseable_base_url_is_rejected() {
        let mut settings = Settings::default();
        settings.api.base_url = "not a url".to_string();
        assert!(settings.validate().is_err());
    }
}
