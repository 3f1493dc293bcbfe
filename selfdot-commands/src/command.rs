//! Command lifecycle wrapper and the per-invocation execution pipeline

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, error, warn};

use selfdot_common::{CommandConfig, CommandExecutionResult, Result, SelfbotError};

use crate::message::IncomingMessage;

/// Inner command logic: a named, triggered unit of work.
///
/// Implementations carry only the command's own behavior; enablement,
/// cooldowns, validation, timing and error containment are applied by
/// the [`Command`] wrapper that owns the handler.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Unique, stable command name
    fn name(&self) -> &str;

    /// Display text describing what the command does
    fn description(&self) -> &str;

    /// Literal prefix string that activates the command (e.g. `.ping`)
    fn trigger(&self) -> &str;

    /// Perform the command's side effect and produce a result
    async fn run(&self, message: &IncomingMessage) -> Result<CommandExecutionResult>;
}

/// Lifecycle wrapper around a [`CommandHandler`].
///
/// Every invocation passes through the same gate sequence:
/// enabled check, per-user cooldown, message validation, inner
/// execution, cooldown update, result enrichment. Errors raised by
/// validation or the inner logic never escape [`Command::execute`]; they
/// are logged, surfaced to the user as a masked in-place edit and
/// returned as a failure result.
pub struct Command {
    handler: Arc<dyn CommandHandler>,
    config: Mutex<CommandConfig>,
    /// Per-user last-execution timestamps. Grows for the process
    /// lifetime; user cardinality is bounded by server membership.
    cooldowns: DashMap<u64, Instant>,
}

impl Command {
    /// Wrap a handler with the default configuration
    pub fn new(handler: Arc<dyn CommandHandler>) -> Self {
        Self::with_config(handler, CommandConfig::default())
    }

    /// Wrap a handler with an explicit configuration
    pub fn with_config(handler: Arc<dyn CommandHandler>, config: CommandConfig) -> Self {
        Self {
            handler,
            config: Mutex::new(config),
            cooldowns: DashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.handler.name()
    }

    pub fn description(&self) -> &str {
        self.handler.description()
    }

    pub fn trigger(&self) -> &str {
        self.handler.trigger()
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> CommandConfig {
        self.config.lock().clone()
    }

    /// Replace the configuration wholesale
    pub fn update_config(&self, config: CommandConfig) {
        *self.config.lock() = config;
        debug!(command = self.name(), "Updated command configuration");
    }

    pub fn is_enabled(&self) -> bool {
        self.config.lock().enabled
    }

    /// Run the full execution pipeline for one message.
    ///
    /// Always returns a well-formed result; failures inside the pipeline
    /// are contained here and never propagate to the caller.
    pub async fn execute(&self, message: &IncomingMessage) -> CommandExecutionResult {
        let started = Instant::now();
        let config = self.config();

        if !config.enabled {
            warn!(command = self.name(), "Command is disabled");
            return self.finish(
                CommandExecutionResult::fail("Command is currently disabled"),
                message,
                started,
            );
        }

        if let Some(cooldown) = config.cooldown_duration() {
            if let Some(remaining) = self.cooldown_remaining(message.author_id, cooldown) {
                debug!(
                    command = self.name(),
                    user_id = message.author_id,
                    remaining_secs = remaining,
                    "Command on cooldown"
                );
                return self.finish(
                    CommandExecutionResult::fail(format!(
                        "Command on cooldown. Try again in {remaining:.1}s"
                    )),
                    message,
                    started,
                );
            }
        }

        match self.try_execute(message).await {
            Ok(result) => {
                let result = self.finish(result, message, started);
                debug!(
                    command = self.name(),
                    response_time = result.response_time,
                    "Command executed"
                );
                result
            }
            Err(err) => {
                error!(command = self.name(), error = %err, "Failed to execute command");
                self.notify_error(message, &err).await;

                let result = CommandExecutionResult::fail(err.to_string())
                    .with_metadata("error_type", err.category());
                self.finish(result, message, started)
            }
        }
    }

    /// Validation, inner execution and the cooldown update.
    ///
    /// The cooldown is stamped whenever the handler returns without an
    /// error, even when its result reports `success = false`; only an
    /// error return leaves the ledger untouched.
    async fn try_execute(&self, message: &IncomingMessage) -> Result<CommandExecutionResult> {
        self.validate_message(message)?;

        let result = self.handler.run(message).await?;
        self.apply_cooldown(message.author_id);

        Ok(result)
    }

    /// Reject messages that lack content or do not start with the trigger
    fn validate_message(&self, message: &IncomingMessage) -> Result<()> {
        let content = message.content.trim();
        if content.is_empty() {
            return Err(SelfbotError::validation_field(
                "Message has no content",
                "content",
            ));
        }
        if !content.starts_with(self.trigger()) {
            return Err(SelfbotError::validation_field(
                format!("Message does not start with trigger '{}'", self.trigger()),
                "content",
            ));
        }
        Ok(())
    }

    /// Remaining cooldown in seconds for this user, `None` when the gate passes.
    ///
    /// The gate is checked before inner execution and stamped after it,
    /// without holding any lock across the await: two overlapping
    /// invocations by the same user can both pass, and the later stamp
    /// wins. Known characteristic of the design.
    fn cooldown_remaining(&self, user_id: u64, cooldown: std::time::Duration) -> Option<f64> {
        let last = self.cooldowns.get(&user_id)?;
        let elapsed = last.elapsed();
        if elapsed >= cooldown {
            None
        } else {
            Some((cooldown - elapsed).as_secs_f64().max(0.0))
        }
    }

    /// Record the execution timestamp for this user
    fn apply_cooldown(&self, user_id: u64) {
        if self.config().cooldown_duration().is_some() {
            self.cooldowns.insert(user_id, Instant::now());
        }
    }

    /// Best-effort in-place edit with a user-safe error notice.
    ///
    /// Internals never reach the message: command failures expose only
    /// the command's own message, everything else collapses to a
    /// generic notice.
    async fn notify_error(&self, message: &IncomingMessage, err: &SelfbotError) {
        let notice = match err {
            SelfbotError::Command { message, .. } => format!("❌ Command failed: {message}"),
            SelfbotError::Validation { .. } => {
                "❌ Invalid input. Please check your command format.".to_string()
            }
            _ => "❌ An unexpected error occurred. Please try again.".to_string(),
        };

        if let Err(edit_err) = message.edit(&notice).await {
            error!(
                command = self.name(),
                error = %edit_err,
                "Failed to send error notice"
            );
        }
    }

    /// Fill in `response_time` when unset and inject the standard metadata
    fn finish(
        &self,
        mut result: CommandExecutionResult,
        message: &IncomingMessage,
        started: Instant,
    ) -> CommandExecutionResult {
        if result.response_time.is_none() {
            result.response_time = Some(started.elapsed().as_secs_f64() * 1000.0);
        }
        result
            .metadata
            .insert("command_name".to_string(), self.name().into());
        result
            .metadata
            .insert("user_id".to_string(), message.author_id.to_string().into());
        result
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name())
            .field("trigger", &self.trigger())
            .field("config", &self.config())
            .finish()
    }
}
