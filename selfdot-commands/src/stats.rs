//! Bot statistics and per-command execution metrics
//!
//! One synchronized unit tracks two concerns: connection/activity state
//! (status, counters, last activity) and the per-command running
//! aggregates. Uptime and ping are computed on demand, never cached.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use selfdot_common::{BotStats, CommandMetrics, ConnectionStatus};

use crate::message::GatewayProbe;

struct StatsState {
    status: ConnectionStatus,
    commands_executed: u64,
    messages_processed: u64,
    last_activity: DateTime<Utc>,
    metrics: HashMap<String, CommandMetrics>,
    /// First-seen order of command names; breaks most-used ties
    order: Vec<String>,
}

/// Key performance figures derived from the current statistics
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSummary {
    pub uptime_hours: f64,
    pub total_commands: u64,
    pub total_messages: u64,
    /// Mean execution time across all commands combined
    pub avg_execution_time_ms: f64,
    pub current_ping_ms: f64,
    pub connection_status: ConnectionStatus,
    /// Most-executed command by raw count; ties go to the first seen
    pub most_used_command: Option<String>,
    pub unique_commands_used: usize,
    /// Percentage of successful executions; 100.0 when nothing ran yet
    pub success_rate: f64,
}

/// Tracker for connection state, activity counters and command metrics
pub struct StatsTracker {
    probe: Arc<dyn GatewayProbe>,
    start_time: DateTime<Utc>,
    started: Instant,
    state: Mutex<StatsState>,
}

impl StatsTracker {
    pub fn new(probe: Arc<dyn GatewayProbe>) -> Self {
        info!("Bot statistics tracker initialized");
        Self {
            probe,
            start_time: Utc::now(),
            started: Instant::now(),
            state: Mutex::new(StatsState {
                status: ConnectionStatus::Disconnected,
                commands_executed: 0,
                messages_processed: 0,
                last_activity: Utc::now(),
                metrics: HashMap::new(),
                order: Vec::new(),
            }),
        }
    }

    /// Update the connection status; only a changed value is recorded and logged
    pub fn set_status(&self, status: ConnectionStatus) {
        let mut state = self.state.lock();
        if state.status != status {
            info!(old = %state.status, new = %status, "Connection status changed");
            state.status = status;
        }
        state.last_activity = Utc::now();
    }

    /// Count one executed command
    pub fn increment_commands_executed(&self) {
        let mut state = self.state.lock();
        state.commands_executed += 1;
        state.last_activity = Utc::now();
        debug!(total = state.commands_executed, "Command executed");
    }

    /// Count one processed message
    pub fn increment_messages_processed(&self) {
        let mut state = self.state.lock();
        state.messages_processed += 1;
        state.last_activity = Utc::now();
    }

    /// Fold one execution into the per-command aggregate, creating it on
    /// first sight of the command name
    pub fn record_command_execution(&self, command_name: &str, execution_time_ms: f64, success: bool) {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let metrics = match state.metrics.entry(command_name.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                state.order.push(command_name.to_string());
                entry.insert(CommandMetrics::new(command_name))
            }
        };
        metrics.record(execution_time_ms, success);

        debug!(
            command = command_name,
            execution_time_ms, success, "Recorded command execution"
        );
    }

    /// Bot uptime in milliseconds, computed from the fixed start instant
    pub fn uptime_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    /// Current gateway ping in milliseconds, read from the probe
    pub fn ping_ms(&self) -> f64 {
        self.probe.latency() * 1000.0
    }

    /// Point-in-time statistics snapshot
    pub fn get_stats(&self) -> BotStats {
        let state = self.state.lock();
        BotStats {
            status: state.status,
            ping: self.ping_ms(),
            uptime: self.uptime_ms(),
            commands_executed: state.commands_executed,
            messages_processed: state.messages_processed,
            last_activity: state.last_activity,
            start_time: self.start_time,
        }
    }

    /// Metrics for one command, when it has executed at least once
    pub fn get_command_metrics(&self, command_name: &str) -> Option<CommandMetrics> {
        self.state.lock().metrics.get(command_name).cloned()
    }

    /// Metrics for every command, in first-seen order
    pub fn get_all_command_metrics(&self) -> Vec<CommandMetrics> {
        let state = self.state.lock();
        state
            .order
            .iter()
            .filter_map(|name| state.metrics.get(name).cloned())
            .collect()
    }

    /// Key figures derived from the current counters and aggregates
    pub fn get_performance_summary(&self) -> PerformanceSummary {
        let state = self.state.lock();

        let total_time: f64 = state.metrics.values().map(|m| m.total_execution_time).sum();
        let total_executions: u64 = state.metrics.values().map(|m| m.execution_count).sum();
        let total_successes: u64 = state.metrics.values().map(|m| m.success_count).sum();

        let avg_execution_time_ms = if total_executions > 0 {
            total_time / total_executions as f64
        } else {
            0.0
        };

        let success_rate = if total_executions > 0 {
            (total_successes as f64 / total_executions as f64) * 100.0
        } else {
            100.0
        };

        // strict comparison over first-seen order keeps ties on the
        // earliest command
        let mut most_used_command = None;
        let mut max_executions = 0;
        for name in &state.order {
            if let Some(metrics) = state.metrics.get(name) {
                if metrics.execution_count > max_executions {
                    max_executions = metrics.execution_count;
                    most_used_command = Some(name.clone());
                }
            }
        }

        PerformanceSummary {
            uptime_hours: self.uptime_ms() / (1000.0 * 60.0 * 60.0),
            total_commands: state.commands_executed,
            total_messages: state.messages_processed,
            avg_execution_time_ms,
            current_ping_ms: self.ping_ms(),
            connection_status: state.status,
            most_used_command,
            unique_commands_used: state.metrics.len(),
            success_rate,
        }
    }

    /// Full timestamped dump of stats and every per-command metric
    pub fn export_metrics(&self) -> serde_json::Value {
        let stats = self.get_stats();
        let command_metrics: serde_json::Map<String, serde_json::Value> = self
            .get_all_command_metrics()
            .into_iter()
            .map(|metrics| {
                (
                    metrics.command_name.clone(),
                    serde_json::to_value(&metrics).unwrap_or(serde_json::Value::Null),
                )
            })
            .collect();

        json!({
            "timestamp": Utc::now(),
            "bot_stats": {
                "status": stats.status,
                "ping_ms": stats.ping,
                "uptime_ms": stats.uptime,
                "commands_executed": stats.commands_executed,
                "messages_processed": stats.messages_processed,
                "start_time": stats.start_time,
                "last_activity": stats.last_activity,
            },
            "command_metrics": command_metrics,
            "performance_summary": serde_json::to_value(self.get_performance_summary())
                .unwrap_or(serde_json::Value::Null),
        })
    }

    /// Zero the counters and drop all per-command metrics; `start_time`
    /// is never reset
    pub fn reset_stats(&self) {
        let mut state = self.state.lock();
        state.commands_executed = 0;
        state.messages_processed = 0;
        state.metrics.clear();
        state.order.clear();
        info!("Bot statistics reset");
    }
}

impl std::fmt::Debug for StatsTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("StatsTracker")
            .field("status", &state.status)
            .field("commands_executed", &state.commands_executed)
            .field("messages_processed", &state.messages_processed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::test_support::FixedProbe;

    fn tracker() -> StatsTracker {
        StatsTracker::new(Arc::new(FixedProbe::new(0.050)))
    }

    #[test]
    fn test_counters_and_snapshot() {
        let tracker = tracker();
        tracker.increment_messages_processed();
        tracker.increment_messages_processed();
        tracker.increment_commands_executed();

        let stats = tracker.get_stats();
        assert_eq!(stats.messages_processed, 2);
        assert_eq!(stats.commands_executed, 1);
        assert_eq!(stats.status, ConnectionStatus::Disconnected);
        assert!((stats.ping - 50.0).abs() < f64::EPSILON);
        assert!(stats.uptime >= 0.0);
        assert!(stats.last_activity >= stats.start_time);
    }

    #[test]
    fn test_status_transition_only_on_change() {
        let tracker = tracker();
        tracker.set_status(ConnectionStatus::Connecting);
        tracker.set_status(ConnectionStatus::Connected);
        tracker.set_status(ConnectionStatus::Connected);
        assert_eq!(tracker.get_stats().status, ConnectionStatus::Connected);
    }

    #[test]
    fn test_metrics_monotonicity() {
        let tracker = tracker();
        let durations = [10.0, 20.0, 30.0];
        for duration in durations {
            tracker.record_command_execution("test", duration, true);
        }

        let metrics = tracker.get_command_metrics("test").unwrap();
        assert_eq!(metrics.execution_count, 3);
        assert_eq!(
            metrics.average_execution_time,
            metrics.total_execution_time / 3.0
        );
        for duration in durations {
            assert!(metrics.min_execution_time <= duration);
            assert!(duration <= metrics.max_execution_time);
        }
    }

    #[test]
    fn test_success_rate_defaults_to_hundred() {
        let tracker = tracker();
        assert_eq!(tracker.get_performance_summary().success_rate, 100.0);
    }

    #[test]
    fn test_performance_summary_aggregates() {
        let tracker = tracker();
        tracker.record_command_execution("ping", 10.0, true);
        tracker.record_command_execution("ping", 30.0, true);
        tracker.record_command_execution("help", 50.0, false);
        tracker.increment_commands_executed();
        tracker.increment_commands_executed();
        tracker.increment_commands_executed();

        let summary = tracker.get_performance_summary();
        assert_eq!(summary.total_commands, 3);
        assert_eq!(summary.avg_execution_time_ms, 30.0);
        assert_eq!(summary.most_used_command.as_deref(), Some("ping"));
        assert_eq!(summary.unique_commands_used, 2);
        assert!((summary.success_rate - 200.0 / 3.0).abs() < 1e-9);
        assert!((summary.current_ping_ms - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_most_used_tie_goes_to_first_seen() {
        let tracker = tracker();
        tracker.record_command_execution("help", 5.0, true);
        tracker.record_command_execution("ping", 5.0, true);

        let summary = tracker.get_performance_summary();
        assert_eq!(summary.most_used_command.as_deref(), Some("help"));
    }

    #[test]
    fn test_export_metrics_shape() {
        let tracker = tracker();
        for (duration, success) in [(10.0, true), (20.0, true), (30.0, true), (40.0, false)] {
            tracker.record_command_execution("test", duration, success);
        }

        let export = tracker.export_metrics();
        assert!(export["timestamp"].is_string());
        assert_eq!(export["bot_stats"]["status"], "disconnected");

        let test_metrics = &export["command_metrics"]["test"];
        assert_eq!(test_metrics["execution_count"], 4);
        assert_eq!(test_metrics["success_count"], 3);
        assert_eq!(test_metrics["error_count"], 1);
        assert_eq!(test_metrics["average_execution_time"], 25.0);
        assert_eq!(test_metrics["min_execution_time"], 10.0);
        assert_eq!(test_metrics["max_execution_time"], 40.0);
    }

    #[test]
    fn test_reset_keeps_start_time() {
        let tracker = tracker();
        let start = tracker.get_stats().start_time;

        tracker.increment_commands_executed();
        tracker.record_command_execution("ping", 10.0, true);
        tracker.reset_stats();

        let stats = tracker.get_stats();
        assert_eq!(stats.commands_executed, 0);
        assert_eq!(stats.messages_processed, 0);
        assert!(tracker.get_all_command_metrics().is_empty());
        assert_eq!(stats.start_time, start);
    }
}
