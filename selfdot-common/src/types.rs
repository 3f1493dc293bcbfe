//! Core data model shared by the dispatch subsystem and the bot binary

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::mask_token;

/// Gateway connection status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    Error,
}

impl ConnectionStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Reconnecting => "reconnecting",
            ConnectionStatus::Error => "error",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration options for a single command
///
/// `permissions` and `aliases` are reserved for later use; the dispatch
/// core carries them but never reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Whether the command is enabled
    pub enabled: bool,
    /// Per-user cooldown in milliseconds; `None` or zero means no cooldown
    pub cooldown: Option<u64>,
    /// Required permissions (reserved)
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Command aliases (reserved)
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cooldown: None,
            permissions: Vec::new(),
            aliases: Vec::new(),
        }
    }
}

impl CommandConfig {
    /// Create an enabled configuration with a per-user cooldown in milliseconds
    pub fn with_cooldown(cooldown_ms: u64) -> Self {
        Self {
            cooldown: Some(cooldown_ms),
            ..Self::default()
        }
    }

    /// Effective cooldown duration; zero and absent both disable the gate
    pub fn cooldown_duration(&self) -> Option<Duration> {
        self.cooldown.filter(|&ms| ms > 0).map(Duration::from_millis)
    }
}

/// Outcome of one command execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandExecutionResult {
    /// Whether the command executed successfully
    pub success: bool,
    /// The response text the message was edited to
    pub response: Option<String>,
    /// Error message when execution failed
    pub error: Option<String>,
    /// Gateway latency sample in milliseconds, when the command measured one
    pub latency: Option<f64>,
    /// Wall-clock milliseconds spent inside the pipeline; filled by the
    /// pipeline when the command leaves it unset
    pub response_time: Option<f64>,
    /// Free-form execution metadata; the pipeline always injects
    /// `command_name` and `user_id`
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl CommandExecutionResult {
    /// Successful result carrying a response text
    pub fn ok(response: impl Into<String>) -> Self {
        Self {
            success: true,
            response: Some(response.into()),
            error: None,
            latency: None,
            response_time: None,
            metadata: Map::new(),
        }
    }

    /// Failed result carrying an error text
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            response: None,
            error: Some(error.into()),
            latency: None,
            response_time: None,
            metadata: Map::new(),
        }
    }

    /// Attach a latency sample in milliseconds
    pub fn with_latency(mut self, latency_ms: f64) -> Self {
        self.latency = Some(latency_ms);
        self
    }

    /// Attach a response time in milliseconds
    pub fn with_response_time(mut self, response_time_ms: f64) -> Self {
        self.response_time = Some(response_time_ms);
        self
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Point-in-time bot statistics snapshot
#[derive(Debug, Clone, Serialize)]
pub struct BotStats {
    /// Current connection status
    pub status: ConnectionStatus,
    /// Current gateway ping in milliseconds
    pub ping: f64,
    /// Bot uptime in milliseconds
    pub uptime: f64,
    /// Number of commands executed
    pub commands_executed: u64,
    /// Number of messages processed
    pub messages_processed: u64,
    /// Timestamp of last activity
    pub last_activity: DateTime<Utc>,
    /// Bot start timestamp, fixed at construction
    pub start_time: DateTime<Utc>,
}

/// Per-command running execution aggregate
#[derive(Debug, Clone, Serialize)]
pub struct CommandMetrics {
    /// Name of the command
    pub command_name: String,
    /// Number of times executed
    pub execution_count: u64,
    /// Total execution time in milliseconds
    pub total_execution_time: f64,
    /// Average execution time in milliseconds, recomputed as total / count
    pub average_execution_time: f64,
    /// Minimum execution time in milliseconds
    pub min_execution_time: f64,
    /// Maximum execution time in milliseconds
    pub max_execution_time: f64,
    /// Number of successful executions
    pub success_count: u64,
    /// Number of failed executions
    pub error_count: u64,
    /// Timestamp of last execution
    pub last_executed: Option<DateTime<Utc>>,
}

impl CommandMetrics {
    /// Create an empty aggregate for a command
    pub fn new(command_name: impl Into<String>) -> Self {
        Self {
            command_name: command_name.into(),
            execution_count: 0,
            total_execution_time: 0.0,
            average_execution_time: 0.0,
            min_execution_time: f64::INFINITY,
            max_execution_time: 0.0,
            success_count: 0,
            error_count: 0,
            last_executed: None,
        }
    }

    /// Fold one execution into the aggregate
    pub fn record(&mut self, execution_time_ms: f64, success: bool) {
        self.execution_count += 1;
        self.total_execution_time += execution_time_ms;
        self.average_execution_time = self.total_execution_time / self.execution_count as f64;
        self.min_execution_time = self.min_execution_time.min(execution_time_ms);
        self.max_execution_time = self.max_execution_time.max(execution_time_ms);
        self.last_executed = Some(Utc::now());

        if success {
            self.success_count += 1;
        } else {
            self.error_count += 1;
        }
    }
}

/// Token validation outcome; the token itself is stored masked
#[derive(Debug, Clone, Serialize)]
pub struct TokenInfo {
    /// Masked token, safe for logs
    pub token: String,
    /// Whether the token passed validation
    pub is_valid: bool,
    /// User ID associated with the token
    pub user_id: Option<String>,
    /// Username associated with the token
    pub username: Option<String>,
    /// Whether the account is verified
    pub verified: Option<bool>,
    /// Whether MFA is enabled on the account
    pub mfa_enabled: Option<bool>,
    /// Error message when validation failed
    pub error_message: Option<String>,
}

impl TokenInfo {
    /// Invalid-token result with an error message
    pub fn invalid(token: &str, error: impl Into<String>) -> Self {
        Self {
            token: mask_token(token),
            is_valid: false,
            user_id: None,
            username: None,
            verified: None,
            mfa_enabled: None,
            error_message: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_duration() {
        assert!(CommandConfig::default().cooldown_duration().is_none());
        assert!(CommandConfig::with_cooldown(0).cooldown_duration().is_none());
        assert_eq!(
            CommandConfig::with_cooldown(1500).cooldown_duration(),
            Some(Duration::from_millis(1500))
        );
    }

    #[test]
    fn test_execution_result_constructors() {
        let ok = CommandExecutionResult::ok("pong").with_latency(42.0);
        assert!(ok.success);
        assert_eq!(ok.response.as_deref(), Some("pong"));
        assert_eq!(ok.latency, Some(42.0));
        assert!(ok.error.is_none());

        let fail = CommandExecutionResult::fail("boom").with_metadata("error_type", "Command");
        assert!(!fail.success);
        assert_eq!(fail.error.as_deref(), Some("boom"));
        assert_eq!(fail.metadata["error_type"], "Command");
    }

    #[test]
    fn test_command_metrics_record() {
        let mut metrics = CommandMetrics::new("test");
        assert_eq!(metrics.min_execution_time, f64::INFINITY);

        metrics.record(10.0, true);
        metrics.record(20.0, true);
        metrics.record(30.0, false);

        assert_eq!(metrics.execution_count, 3);
        assert_eq!(metrics.total_execution_time, 60.0);
        assert_eq!(metrics.average_execution_time, 20.0);
        assert_eq!(metrics.min_execution_time, 10.0);
        assert_eq!(metrics.max_execution_time, 30.0);
        assert_eq!(metrics.success_count, 2);
        assert_eq!(metrics.error_count, 1);
        assert!(metrics.last_executed.is_some());
    }

    #[test]
    fn test_connection_status_display() {
        assert_eq!(ConnectionStatus::Connected.to_string(), "connected");
        assert_eq!(ConnectionStatus::Reconnecting.as_str(), "reconnecting");
    }

    #[test]
    fn test_token_info_masks_token() {
        let info = TokenInfo::invalid(
            "MTExNzU4MzQ4NzEyNzY1NjQxNw.GZKbkF.abcdefghijklmnop",
            "Invalid token format",
        );
        assert!(!info.token.contains("GZKbkF"));
        assert!(!info.is_valid);
    }
}
