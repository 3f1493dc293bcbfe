//! Configuration loading utilities

use std::env;
use std::path::Path;

use thiserror::Error;
use tracing::debug;
use validator::Validate;

use crate::Config;
use selfdot_common::{Result as SelfbotResult, SelfbotError};

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading the configuration file
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParse {
        var: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for SelfbotError {
    fn from(err: ConfigError) -> Self {
        SelfbotError::config(err.to_string())
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration, resolving the file location in order:
    /// `SELFDOT_CONFIG_PATH`, then `config.yaml`/`config.yml` in the
    /// working directory, then built-in defaults. Environment overrides
    /// are applied on top and the result is validated.
    pub fn load() -> SelfbotResult<Config> {
        let config = if let Ok(path) = env::var("SELFDOT_CONFIG_PATH") {
            Self::load_config(&path)?
        } else if Path::new("config.yaml").exists() {
            Self::load_config("config.yaml")?
        } else if Path::new("config.yml").exists() {
            Self::load_config("config.yml")?
        } else {
            debug!("No configuration file found, using defaults with env overrides");
            let mut config = Config::default();
            Self::apply_env_overrides(&mut config)?;
            config.validate().map_err(ConfigError::Validation)?;
            config
        };

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> SelfbotResult<Config> {
        Ok(Self::load_config(path)?)
    }

    /// Load a YAML file, apply env overrides and validate
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config: Config = serde_yaml::from_str(&content)?;

        Self::apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        if let Ok(token) = env::var("DISCORD_TOKEN") {
            config.discord.token = token;
        }

        if let Ok(prefix) = env::var("COMMAND_PREFIX") {
            config.discord.command_prefix = prefix;
        }

        if let Ok(timeout) = env::var("HEARTBEAT_TIMEOUT") {
            config.discord.heartbeat_timeout_seconds =
                timeout.parse().map_err(|e| ConfigError::EnvParse {
                    var: "HEARTBEAT_TIMEOUT".to_string(),
                    source: Box::new(e),
                })?;
        }

        if let Ok(timeout) = env::var("REQUEST_TIMEOUT") {
            config.discord.request_timeout_seconds =
                timeout.parse().map_err(|e| ConfigError::EnvParse {
                    var: "REQUEST_TIMEOUT".to_string(),
                    source: Box::new(e),
                })?;
        }

        if let Ok(enabled) = env::var("ENABLE_METRICS") {
            config.features.enable_metrics =
                enabled.parse().map_err(|e| ConfigError::EnvParse {
                    var: "ENABLE_METRICS".to_string(),
                    source: Box::new(e),
                })?;
        }

        if let Ok(enabled) = env::var("ENABLE_STATS") {
            config.features.enable_stats =
                enabled.parse().map_err(|e| ConfigError::EnvParse {
                    var: "ENABLE_STATS".to_string(),
                    source: Box::new(e),
                })?;
        }

        if let Ok(level) = env::var("LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(file) = env::var("LOG_FILE") {
            config.logging.file = Some(file);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TEST_TOKEN: &str =
        "MTExNzU4MzQ4NzEyNzY1NjQxNw.GZKbkF.1234567890123456789012345678901234567890";

    fn create_test_config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write temp file");
        file
    }

    #[test]
    fn test_load_valid_yaml_config() {
        let yaml = format!(
            "discord:\n  token: '{TEST_TOKEN}'\n  command_prefix: '.'\n  heartbeat_timeout_seconds: 45\nlogging:\n  level: 'debug'\n"
        );
        let file = create_test_config_file(&yaml);

        let config = ConfigLoader::load_config(file.path()).expect("Failed to load config");
        assert_eq!(config.discord.heartbeat_timeout_seconds, 45);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_invalid_yaml() {
        let file = create_test_config_file("discord:\n  token: [unclosed");
        let result = ConfigLoader::load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error() {
        let file = create_test_config_file("discord:\n  token: 'way-too-short'\n");
        let result = ConfigLoader::load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_missing_config_file() {
        let result = ConfigLoader::load_config("/nonexistent/path/config.yaml");
        assert!(matches!(result.unwrap_err(), ConfigError::Io(_)));
    }

    #[test]
    fn test_config_error_converts_to_selfbot_error() {
        let file = create_test_config_file("discord:\n  token: ''\n");
        let error: SelfbotError = ConfigLoader::load_config(file.path()).unwrap_err().into();
        assert_eq!(error.category(), "Config");
    }
}
