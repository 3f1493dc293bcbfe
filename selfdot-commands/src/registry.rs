//! Concurrency-safe command registry
//!
//! Two parallel mappings (trigger → command, name → command) live under
//! a single mutex so no reader can ever observe them disagreeing. The
//! lock guards in-memory map access only and is never held across an
//! await.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{info, warn};

use selfdot_common::{Result, SelfbotError};

use crate::command::Command;

#[derive(Default)]
struct RegistryState {
    by_trigger: HashMap<String, Arc<Command>>,
    by_name: HashMap<String, Arc<Command>>,
    /// Trigger registration order; drives first-match dispatch semantics
    order: Vec<String>,
    total_registered: u64,
    total_unregistered: u64,
    registration_errors: u64,
}

/// Registry statistics snapshot
#[derive(Debug, Clone, Serialize)]
pub struct RegistryStats {
    pub total_commands: usize,
    pub triggers: Vec<String>,
    pub command_names: Vec<String>,
    pub enabled_commands: usize,
    pub disabled_commands: usize,
    pub total_registered: u64,
    pub total_unregistered: u64,
    pub registration_errors: u64,
}

/// Store of all registered commands, keyed by trigger and by name
pub struct CommandRegistry {
    prefix: char,
    state: Mutex<RegistryState>,
}

impl CommandRegistry {
    /// Create a registry enforcing the given trigger prefix character
    pub fn new(prefix: char) -> Self {
        info!(prefix = %prefix, "Command registry initialized");
        Self {
            prefix,
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// The prefix character every registered trigger starts with
    pub fn prefix(&self) -> char {
        self.prefix
    }

    /// Register a command.
    ///
    /// Re-registering an occupied trigger replaces the previous command
    /// (logged, not rejected). Registering a name that is already bound
    /// to a different trigger fails with `DUPLICATE_COMMAND_NAME` and
    /// leaves both mappings untouched.
    pub fn register(&self, command: Arc<Command>) -> Result<()> {
        self.validate_command(&command)?;

        let mut state = self.state.lock();

        let conflicting_trigger = state
            .by_name
            .get(command.name())
            .filter(|existing| existing.trigger() != command.trigger())
            .map(|existing| existing.trigger().to_string());
        if let Some(existing_trigger) = conflicting_trigger {
            state.registration_errors += 1;
            return Err(SelfbotError::command_code(
                format!(
                    "Command name '{}' already exists with different trigger '{existing_trigger}'",
                    command.name()
                ),
                command.name(),
                "DUPLICATE_COMMAND_NAME",
            ));
        }

        let trigger = command.trigger().to_string();
        if let Some(replaced) = state.by_trigger.insert(trigger.clone(), command.clone()) {
            warn!(
                trigger = %trigger,
                existing_command = replaced.name(),
                new_command = command.name(),
                "Overwriting command registration"
            );
            // the replaced command is gone from the trigger map; drop its
            // name entry too so the mappings stay in agreement
            if replaced.name() != command.name() {
                state.by_name.remove(replaced.name());
            }
        } else {
            state.order.push(trigger.clone());
        }

        state
            .by_name
            .insert(command.name().to_string(), command.clone());
        state.total_registered += 1;

        info!(command = command.name(), trigger = %trigger, "Registered command");
        Ok(())
    }

    /// Look a command up by its exact trigger
    pub fn get_command(&self, trigger: &str) -> Option<Arc<Command>> {
        if trigger.is_empty() {
            return None;
        }
        self.state.lock().by_trigger.get(trigger).cloned()
    }

    /// Look a command up by its name
    pub fn get_command_by_name(&self, name: &str) -> Option<Arc<Command>> {
        if name.is_empty() {
            return None;
        }
        self.state.lock().by_name.get(name).cloned()
    }

    /// Snapshot of all registered commands in registration order
    pub fn get_all_commands(&self) -> Vec<Arc<Command>> {
        let state = self.state.lock();
        state
            .order
            .iter()
            .filter_map(|trigger| state.by_trigger.get(trigger).cloned())
            .collect()
    }

    /// Whether a trigger is registered
    pub fn has_command(&self, trigger: &str) -> bool {
        !trigger.is_empty() && self.state.lock().by_trigger.contains_key(trigger)
    }

    /// Remove a command by trigger; returns whether a removal occurred
    pub fn unregister(&self, trigger: &str) -> bool {
        if trigger.is_empty() {
            return false;
        }

        let mut state = self.state.lock();
        match state.by_trigger.remove(trigger) {
            Some(command) => {
                state.by_name.remove(command.name());
                state.order.retain(|t| t != trigger);
                state.total_unregistered += 1;
                info!(
                    command = command.name(),
                    trigger = %trigger,
                    remaining = state.by_trigger.len(),
                    "Unregistered command"
                );
                true
            }
            None => {
                warn!(trigger = %trigger, "Command not found for unregistration");
                false
            }
        }
    }

    /// Remove every registered command
    pub fn clear(&self) {
        let mut state = self.state.lock();
        let cleared = state.by_trigger.len();
        state.by_trigger.clear();
        state.by_name.clear();
        state.order.clear();
        info!(cleared, "Cleared command registry");
    }

    /// Case-insensitive substring search over triggers
    pub fn find_commands(&self, partial_trigger: &str) -> Vec<Arc<Command>> {
        if partial_trigger.is_empty() {
            return Vec::new();
        }

        let partial = partial_trigger.to_lowercase();
        let state = self.state.lock();
        state
            .order
            .iter()
            .filter(|trigger| trigger.to_lowercase().contains(&partial))
            .filter_map(|trigger| state.by_trigger.get(trigger).cloned())
            .collect()
    }

    /// Registry statistics snapshot
    pub fn get_stats(&self) -> RegistryStats {
        let state = self.state.lock();
        let commands: Vec<_> = state.by_trigger.values().collect();
        let enabled = commands.iter().filter(|c| c.is_enabled()).count();

        RegistryStats {
            total_commands: commands.len(),
            triggers: state.order.clone(),
            command_names: commands.iter().map(|c| c.name().to_string()).collect(),
            enabled_commands: enabled,
            disabled_commands: commands.len() - enabled,
            total_registered: state.total_registered,
            total_unregistered: state.total_unregistered,
            registration_errors: state.registration_errors,
        }
    }

    /// Shape validation applied before a command may enter the registry
    fn validate_command(&self, command: &Command) -> Result<()> {
        if command.name().trim().is_empty() {
            return Err(SelfbotError::validation_field(
                "Command must have a non-empty name",
                "name",
            ));
        }
        if command.description().trim().is_empty() {
            return Err(SelfbotError::validation_field(
                "Command must have a non-empty description",
                "description",
            ));
        }
        if command.trigger().trim().is_empty() {
            return Err(SelfbotError::validation_field(
                "Command must have a non-empty trigger",
                "trigger",
            ));
        }
        if !command.trigger().starts_with(self.prefix) {
            return Err(SelfbotError::validation_value(
                format!("Command trigger must start with '{}'", self.prefix),
                "trigger",
                command.trigger(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("CommandRegistry")
            .field("prefix", &self.prefix)
            .field("commands", &state.order)
            .finish()
    }
}
