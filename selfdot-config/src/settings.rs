//! Application configuration structures

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use selfdot_common::LoggingConfig;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Config {
    /// Discord-related configuration
    #[validate]
    pub discord: DiscordConfig,

    /// Feature toggles read by the bootstrap layer
    #[serde(default)]
    pub features: FeatureFlags,

    /// Logging configuration
    #[validate]
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Discord account and gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DiscordConfig {
    /// Discord user token for authentication
    #[validate(custom = "validate_discord_token")]
    pub token: String,

    /// Prefix character that every command trigger must start with
    #[validate(length(equal = 1, message = "Command prefix must be a single character"))]
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,

    /// Gateway heartbeat timeout in seconds
    #[validate(range(min = 10, max = 300, message = "Heartbeat timeout must be between 10 and 300 seconds"))]
    #[serde(default = "default_heartbeat_timeout")]
    pub heartbeat_timeout_seconds: u64,

    /// HTTP request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Request timeout must be between 1 and 300 seconds"))]
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

/// Feature toggles; the dispatch core itself never reads these
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Log a full metrics export on shutdown
    #[serde(default = "default_true")]
    pub enable_metrics: bool,

    /// Track bot statistics while running
    #[serde(default = "default_true")]
    pub enable_stats: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enable_metrics: true,
            enable_stats: true,
        }
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoggingSection {
    /// Log level (trace, debug, info, warn, error)
    #[validate(custom = "validate_log_level")]
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Optional log file path
    #[serde(default)]
    pub file: Option<String>,

    /// Whether to use colored console output
    #[serde(default = "default_true")]
    pub colored: bool,

    /// Whether to include timestamps in log output
    #[serde(default = "default_true")]
    pub include_timestamps: bool,

    /// Whether to include file/line information in logs
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            colored: true,
            include_timestamps: true,
            include_location: false,
        }
    }
}

impl LoggingSection {
    /// Convert into the logging bootstrap configuration
    pub fn to_logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.level.clone(),
            file: self.file.clone(),
            colored: self.colored,
            include_timestamps: self.include_timestamps,
            include_location: self.include_location,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discord: DiscordConfig::default(),
            features: FeatureFlags::default(),
            logging: LoggingSection::default(),
        }
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            command_prefix: default_command_prefix(),
            heartbeat_timeout_seconds: default_heartbeat_timeout(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl DiscordConfig {
    /// The prefix character commands must be triggered with
    pub fn prefix_char(&self) -> char {
        self.command_prefix.chars().next().unwrap_or('.')
    }
}

fn default_command_prefix() -> String {
    ".".to_string()
}

fn default_heartbeat_timeout() -> u64 {
    60
}

fn default_request_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

// Custom validation functions

fn validate_discord_token(token: &str) -> Result<(), ValidationError> {
    if token.is_empty() {
        return Err(ValidationError::new("missing_token"));
    }
    if token.len() < 50 {
        return Err(ValidationError::new("token_too_short"));
    }
    if !token.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("invalid_token_format"));
    }
    Ok(())
}

fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    match level {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ValidationError::new("invalid_log_level")),
    }
}
