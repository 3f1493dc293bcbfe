//! Error types and utilities shared across the selfdot crates

use thiserror::Error;

/// Result type alias for selfdot operations
pub type Result<T> = std::result::Result<T, SelfbotError>;

/// Main error type for selfdot operations
#[derive(Error, Debug)]
pub enum SelfbotError {
    /// Configuration related errors (invalid settings, missing values)
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        config_key: Option<String>,
    },

    /// Malformed command definitions or malformed triggering messages
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        /// Masked rendition of the offending value for sensitive fields
        value: Option<String>,
    },

    /// A command's own inner logic failed
    #[error("Command error: {message}")]
    Command {
        message: String,
        command_name: Option<String>,
        code: Option<String>,
    },

    /// Gateway connection failures surfaced from the transport layer
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        connection_type: Option<String>,
    },

    /// Rate limits reported by the transport layer
    #[error("Rate limited: {message}")]
    RateLimit {
        message: String,
        retry_after: Option<f64>,
    },

    /// Permission checks that failed below the dispatch core
    #[error("Permission denied: {message}")]
    Permission {
        message: String,
        required: Option<String>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with a custom message
    #[error("{message}")]
    Internal { message: String },
}

impl SelfbotError {
    /// Create a new generic error with a custom message
    pub fn new(msg: impl Into<String>) -> Self {
        Self::Internal {
            message: msg.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            config_key: None,
        }
    }

    /// Create a new configuration error tied to a configuration key
    pub fn config_key(msg: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            config_key: Some(key.into()),
        }
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
            value: None,
        }
    }

    /// Create a new validation error with the failing field name
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
            value: None,
        }
    }

    /// Create a new validation error carrying the offending value.
    ///
    /// Values of fields whose name mentions "token" are masked before
    /// being stored so they never reach logs verbatim.
    pub fn validation_value(
        msg: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let field = field.into();
        let value = value.into();
        let value = if field.to_lowercase().contains("token") {
            crate::utils::mask_token(&value)
        } else {
            value
        };
        Self::Validation {
            message: msg.into(),
            field: Some(field),
            value: Some(value),
        }
    }

    /// Create a new command error
    pub fn command(msg: impl Into<String>, command_name: impl Into<String>) -> Self {
        Self::Command {
            message: msg.into(),
            command_name: Some(command_name.into()),
            code: None,
        }
    }

    /// Create a new command error with a machine-readable code
    pub fn command_code(
        msg: impl Into<String>,
        command_name: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self::Command {
            message: msg.into(),
            command_name: Some(command_name.into()),
            code: Some(code.into()),
        }
    }

    /// Create a new connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection {
            message: msg.into(),
            connection_type: None,
        }
    }

    /// Create a new rate limit error
    pub fn rate_limit(msg: impl Into<String>, retry_after: Option<f64>) -> Self {
        Self::RateLimit {
            message: msg.into(),
            retry_after,
        }
    }

    /// Create a new permission error
    pub fn permission(msg: impl Into<String>, required: Option<String>) -> Self {
        Self::Permission {
            message: msg.into(),
            required,
        }
    }

    /// Machine-readable error code, when one was attached
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Command { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Coarse category name used for error-type metadata and logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config { .. } => "Config",
            Self::Validation { .. } => "Validation",
            Self::Command { .. } => "Command",
            Self::Connection { .. } => "Connection",
            Self::RateLimit { .. } => "RateLimit",
            Self::Permission { .. } => "Permission",
            Self::Io(_) => "Io",
            Self::Serialization(_) => "Serialization",
            Self::Internal { .. } => "Internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = SelfbotError::new("test message");
        assert!(error.to_string().contains("test message"));

        let config_error = SelfbotError::config("config issue");
        assert!(config_error.to_string().contains("Configuration error"));
        assert_eq!(config_error.category(), "Config");

        let command_error = SelfbotError::command_code("boom", "ping", "LATENCY_MEASUREMENT_FAILED");
        assert!(command_error.to_string().contains("Command error"));
        assert_eq!(command_error.code(), Some("LATENCY_MEASUREMENT_FAILED"));
        assert_eq!(command_error.category(), "Command");
    }

    #[test]
    fn test_validation_error_fields() {
        let error = SelfbotError::validation_field("Command must have a non-empty name", "name");
        match error {
            SelfbotError::Validation { field, value, .. } => {
                assert_eq!(field.as_deref(), Some("name"));
                assert!(value.is_none());
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_sensitive_value_masking() {
        let error = SelfbotError::validation_value(
            "Invalid token format",
            "discord_token",
            "MTExNzU4MzQ4NzEyNzY1NjQxNw.GZKbkF.abcdefghijklmnop",
        );
        match error {
            SelfbotError::Validation { value, .. } => {
                let value = value.unwrap();
                assert!(!value.contains("GZKbkF"));
                assert!(value.contains("..."));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error: SelfbotError = io_error.into();
        assert!(error.to_string().contains("I/O error"));
        assert_eq!(error.category(), "Io");
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_error() -> Result<()> {
            Err(SelfbotError::new("failure"))
        }

        assert!(returns_error().is_err());
    }
}
