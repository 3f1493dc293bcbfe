//! Ping command: edits the triggering message with pong and latency

use std::sync::Arc;

use async_trait::async_trait;

use selfdot_common::{CommandExecutionResult, Result, SelfbotError};

use crate::command::CommandHandler;
use crate::message::{GatewayProbe, IncomingMessage};

/// Responds with pong plus a quality-graded gateway latency reading
pub struct PingHandler {
    probe: Arc<dyn GatewayProbe>,
}

impl PingHandler {
    pub fn new(probe: Arc<dyn GatewayProbe>) -> Self {
        Self { probe }
    }

    /// Current gateway latency in milliseconds, rounded to two decimals
    fn websocket_latency(&self) -> Result<f64> {
        let latency_ms = self.probe.latency() * 1000.0;
        if !latency_ms.is_finite() || latency_ms < 0.0 {
            return Err(SelfbotError::command_code(
                "Invalid latency value received",
                "ping",
                "INVALID_LATENCY",
            ));
        }
        Ok((latency_ms * 100.0).round() / 100.0)
    }

    fn assess_quality(latency_ms: f64) -> &'static str {
        if latency_ms < 50.0 {
            "excellent"
        } else if latency_ms < 100.0 {
            "good"
        } else if latency_ms < 200.0 {
            "fair"
        } else {
            "poor"
        }
    }

    fn quality_emoji(quality: &str) -> &'static str {
        match quality {
            "excellent" => "🟢",
            "good" => "🟡",
            "fair" => "🟠",
            "poor" => "🔴",
            _ => "⚪",
        }
    }

    fn format_response(latency_ms: f64) -> String {
        let quality = Self::assess_quality(latency_ms);
        let emoji = Self::quality_emoji(quality);

        let latency_text = if latency_ms < 10.0 {
            format!("{latency_ms:.1}ms")
        } else {
            format!("{}ms", latency_ms as u64)
        };

        let mut response = format!("{emoji} pong {latency_text}");
        match quality {
            "poor" => response.push_str(" (slow connection)"),
            "excellent" => response.push_str(" (excellent)"),
            _ => {}
        }
        response
    }
}

#[async_trait]
impl CommandHandler for PingHandler {
    fn name(&self) -> &str {
        "ping"
    }

    fn description(&self) -> &str {
        "Responds with pong and gateway latency information"
    }

    fn trigger(&self) -> &str {
        ".ping"
    }

    async fn run(&self, message: &IncomingMessage) -> Result<CommandExecutionResult> {
        let latency_ms = self.websocket_latency()?;
        let quality = Self::assess_quality(latency_ms);
        let response = Self::format_response(latency_ms);

        message.edit(&response).await?;

        Ok(CommandExecutionResult::ok(response)
            .with_latency(latency_ms)
            .with_metadata("connection_quality", quality)
            .with_metadata("client_ready", self.probe.is_ready()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::test_support::*;

    #[test]
    fn test_assess_connection_quality() {
        assert_eq!(PingHandler::assess_quality(25.0), "excellent");
        assert_eq!(PingHandler::assess_quality(75.0), "good");
        assert_eq!(PingHandler::assess_quality(150.0), "fair");
        assert_eq!(PingHandler::assess_quality(250.0), "poor");
    }

    #[test]
    fn test_format_response() {
        let response = PingHandler::format_response(45.0);
        assert!(response.contains("🟢"));
        assert!(response.contains("pong"));
        assert!(response.contains("45ms"));
        assert!(response.contains("(excellent)"));

        let response = PingHandler::format_response(250.0);
        assert!(response.contains("🔴"));
        assert!(response.contains("(slow connection)"));

        let response = PingHandler::format_response(7.5);
        assert!(response.contains("7.5ms"));
    }

    #[tokio::test]
    async fn test_run_edits_message_and_reports_latency() {
        let handler = PingHandler::new(Arc::new(FixedProbe::new(0.050)));
        let (message, editor) = self_message(".ping", 1);

        let result = handler.run(&message).await.unwrap();

        assert!(result.success);
        assert_eq!(result.latency, Some(50.0));
        assert_eq!(result.metadata["connection_quality"], "good");
        let edited = editor.last_edit().unwrap();
        assert!(edited.contains("pong"));
        assert!(edited.contains("50ms"));
    }

    #[tokio::test]
    async fn test_negative_latency_is_a_command_error() {
        let handler = PingHandler::new(Arc::new(FixedProbe::new(-1.0)));
        let (message, _editor) = self_message(".ping", 1);

        let err = handler.run(&message).await.unwrap_err();
        assert_eq!(err.code(), Some("INVALID_LATENCY"));
    }
}
