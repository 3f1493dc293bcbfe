//! Help command: lists registered commands or details one of them

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;

use selfdot_common::{CommandExecutionResult, Result};

use crate::command::{Command, CommandHandler};
use crate::message::IncomingMessage;
use crate::registry::CommandRegistry;

/// Shows available commands; `.help <command>` details a single one
pub struct HelpHandler {
    registry: Arc<CommandRegistry>,
}

impl HelpHandler {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    fn status_emoji(command: &Command) -> &'static str {
        if command.is_enabled() {
            "✅"
        } else {
            "❌"
        }
    }

    fn general_help(&self) -> String {
        let commands = self.registry.get_all_commands();
        if commands.is_empty() {
            return "❌ No commands available".to_string();
        }

        let enabled = commands.iter().filter(|c| c.is_enabled()).count();
        let mut text = String::new();
        let _ = writeln!(text, "📚 **Self-Bot Commands**");
        let _ = writeln!(text);
        let _ = writeln!(
            text,
            "📊 **Statistics**: {enabled}/{} commands enabled",
            commands.len()
        );
        let _ = writeln!(text);

        for command in &commands {
            let _ = writeln!(
                text,
                "  {} `{}` - {}",
                Self::status_emoji(command),
                command.trigger(),
                command.description()
            );
        }

        let _ = writeln!(text);
        let _ = writeln!(
            text,
            "📖 **Detailed Help**: `{}help <command>` for specific command info",
            self.registry.prefix()
        );
        text.push_str("⚠️ **Note**: Self-bot for educational purposes only");
        text
    }

    fn detailed_help(&self, query: &str) -> String {
        let Some(command) = self.find_command(query) else {
            return format!(
                "❌ **Command not found**: `{query}`\n\n💡 Use `{}help` to see all available commands",
                self.registry.prefix()
            );
        };

        let config = command.config();
        let mut text = String::new();
        let _ = writeln!(text, "📖 **Help for `{}`**", command.trigger());
        let _ = writeln!(text);
        let _ = writeln!(text, "**Name**: {}", command.name());
        let _ = writeln!(text, "**Description**: {}", command.description());
        let _ = writeln!(text, "**Usage**: `{}`", command.trigger());
        let _ = writeln!(text);
        let _ = writeln!(
            text,
            "**Status**: {} {}",
            Self::status_emoji(&command),
            if config.enabled { "Enabled" } else { "Disabled" }
        );

        if let Some(cooldown) = config.cooldown_duration() {
            let _ = writeln!(text, "**Cooldown**: {:.1}s", cooldown.as_secs_f64());
        }
        if !config.aliases.is_empty() {
            let _ = writeln!(text, "**Aliases**: {}", config.aliases.join(", "));
        }
        if !config.permissions.is_empty() {
            let _ = writeln!(text, "**Permissions**: {}", config.permissions.join(", "));
        }

        text.truncate(text.trim_end().len());
        text
    }

    /// Resolve a query as an exact trigger, a prefix-less trigger or a
    /// case-insensitive command name
    fn find_command(&self, query: &str) -> Option<Arc<Command>> {
        if let Some(command) = self.registry.get_command(query) {
            return Some(command);
        }

        let with_prefix = format!("{}{query}", self.registry.prefix());
        if let Some(command) = self.registry.get_command(&with_prefix) {
            return Some(command);
        }

        self.registry
            .get_all_commands()
            .into_iter()
            .find(|command| command.name().eq_ignore_ascii_case(query))
    }

    fn parse_argument<'a>(&self, content: &'a str) -> Option<&'a str> {
        content
            .trim()
            .strip_prefix(self.trigger())
            .map(str::trim)
            .filter(|rest| !rest.is_empty())
            .and_then(|rest| rest.split_whitespace().next())
    }
}

#[async_trait]
impl CommandHandler for HelpHandler {
    fn name(&self) -> &str {
        "help"
    }

    fn description(&self) -> &str {
        "Shows available commands and their descriptions"
    }

    fn trigger(&self) -> &str {
        ".help"
    }

    async fn run(&self, message: &IncomingMessage) -> Result<CommandExecutionResult> {
        let response = match self.parse_argument(&message.content) {
            Some(query) => self.detailed_help(query),
            None => self.general_help(),
        };

        message.edit(&response).await?;

        let total_commands = self.registry.get_all_commands().len();
        Ok(CommandExecutionResult::ok(response)
            .with_metadata("total_commands", total_commands))
    }
}
