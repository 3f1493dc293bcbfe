//! Message router: from the account's own stream to the matched command
//!
//! The gateway delivers every message; the dispatcher counts it, keeps
//! only self-authored ones, scans the registry for the first trigger
//! that prefixes the trimmed content and runs that command through its
//! pipeline, reporting the outcome to the stats tracker either way.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use tracing::{debug, warn};

use selfdot_common::CommandExecutionResult;

use crate::command::Command;
use crate::message::IncomingMessage;
use crate::registry::CommandRegistry;
use crate::stats::StatsTracker;

pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    stats: Arc<StatsTracker>,
    /// The authenticated account's user id, set once on gateway ready.
    /// Messages arriving earlier cannot match the self filter and are
    /// only counted.
    self_user_id: OnceLock<u64>,
}

impl Dispatcher {
    pub fn new(registry: Arc<CommandRegistry>, stats: Arc<StatsTracker>) -> Self {
        Self {
            registry,
            stats,
            self_user_id: OnceLock::new(),
        }
    }

    /// Record the authenticated account's user id; later calls are ignored
    pub fn set_self_user(&self, user_id: u64) {
        if self.self_user_id.set(user_id).is_ok() {
            debug!(user_id, "Dispatcher bound to self user");
        }
    }

    /// Route one inbound message. Returns the execution result when a
    /// command ran, `None` otherwise.
    pub async fn handle_message(&self, message: &IncomingMessage) -> Option<CommandExecutionResult> {
        self.stats.increment_messages_processed();

        let self_id = self.self_user_id.get().copied()?;
        if message.author_id != self_id {
            return None;
        }

        let content = message.content.trim();
        if content.is_empty() {
            return None;
        }

        let command = self.find_matching_command(content)?;
        debug!(
            command = command.name(),
            trigger = command.trigger(),
            user_id = message.author_id,
            "Executing command"
        );

        let started = Instant::now();
        let result = command.execute(message).await;
        let execution_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        self.stats.increment_commands_executed();
        self.stats
            .record_command_execution(command.name(), execution_time_ms, result.success);

        if result.success {
            debug!(
                command = command.name(),
                execution_time_ms,
                response_time = result.response_time,
                "Command completed"
            );
        } else {
            warn!(
                command = command.name(),
                error = result.error.as_deref().unwrap_or("unknown"),
                execution_time_ms,
                "Command failed"
            );
        }

        Some(result)
    }

    /// First registered command whose trigger prefixes the content and
    /// that is enabled. A disabled prefix match does not end the scan;
    /// only the absence of any enabled match does.
    fn find_matching_command(&self, content: &str) -> Option<Arc<Command>> {
        for command in self.registry.get_all_commands() {
            if content.starts_with(command.trigger()) {
                if command.is_enabled() {
                    return Some(command);
                }
                debug!(
                    command = command.name(),
                    "Matching command is disabled, continuing scan"
                );
            }
        }
        None
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("self_user_id", &self.self_user_id.get())
            .finish_non_exhaustive()
    }
}
