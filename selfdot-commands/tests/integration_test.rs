//! End-to-end dispatch scenarios through registry, pipeline and stats

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use selfdot_commands::{
    Command, CommandHandler, CommandRegistry, Dispatcher, GatewayProbe, HelpHandler,
    IncomingMessage, MessageEditor, PingHandler, StatsTracker,
};
use selfdot_common::{CommandConfig, CommandExecutionResult, Result};

const SELF_ID: u64 = 4242;

#[derive(Default)]
struct RecordingEditor {
    edits: Mutex<Vec<String>>,
}

impl RecordingEditor {
    fn last_edit(&self) -> Option<String> {
        self.edits.lock().last().cloned()
    }
}

#[async_trait]
impl MessageEditor for RecordingEditor {
    async fn edit(&self, content: &str) -> Result<()> {
        self.edits.lock().push(content.to_string());
        Ok(())
    }
}

struct FixedProbe(f64);

impl GatewayProbe for FixedProbe {
    fn latency(&self) -> f64 {
        self.0
    }
    fn is_ready(&self) -> bool {
        true
    }
    fn is_closed(&self) -> bool {
        false
    }
}

struct StaticHandler {
    name: &'static str,
    trigger: &'static str,
}

#[async_trait]
impl CommandHandler for StaticHandler {
    fn name(&self) -> &str {
        self.name
    }
    fn description(&self) -> &str {
        "static test command"
    }
    fn trigger(&self) -> &str {
        self.trigger
    }
    async fn run(&self, message: &IncomingMessage) -> Result<CommandExecutionResult> {
        message.edit(self.name).await?;
        Ok(CommandExecutionResult::ok(self.name))
    }
}

fn self_message(content: &str) -> (IncomingMessage, Arc<RecordingEditor>) {
    let editor = Arc::new(RecordingEditor::default());
    (
        IncomingMessage::new(content, SELF_ID, editor.clone()),
        editor,
    )
}

fn setup() -> (Dispatcher, Arc<CommandRegistry>, Arc<StatsTracker>) {
    let registry = Arc::new(CommandRegistry::new('.'));
    let stats = Arc::new(StatsTracker::new(Arc::new(FixedProbe(0.042))));
    let dispatcher = Dispatcher::new(registry.clone(), stats.clone());
    dispatcher.set_self_user(SELF_ID);
    (dispatcher, registry, stats)
}

/// Scenario A: ping with a 1s cooldown succeeds, is blocked halfway
/// through the window and succeeds again once the window elapsed.
#[tokio::test]
async fn scenario_ping_cooldown_timeline() {
    let (dispatcher, registry, _stats) = setup();
    registry
        .register(Arc::new(Command::with_config(
            Arc::new(PingHandler::new(Arc::new(FixedProbe(0.042)))),
            CommandConfig::with_cooldown(1000),
        )))
        .unwrap();

    let (message, editor) = self_message(".ping");
    let first = dispatcher.handle_message(&message).await.unwrap();
    assert!(first.success);
    assert!(first.response.unwrap().contains("pong"));
    assert!(editor.last_edit().unwrap().contains("pong"));

    tokio::time::sleep(Duration::from_millis(500)).await;
    let (message, _editor) = self_message(".ping");
    let second = dispatcher.handle_message(&message).await.unwrap();
    assert!(!second.success);
    let error = second.error.unwrap();
    assert!(error.contains("cooldown"), "unexpected error: {error}");
    assert!(
        error.contains("Try again in 0."),
        "remaining time should be under a second: {error}"
    );

    tokio::time::sleep(Duration::from_millis(520)).await;
    let (message, _editor) = self_message(".ping");
    let third = dispatcher.handle_message(&message).await.unwrap();
    assert!(third.success);
}

/// Scenario B: with `.ping` and `.p` both registered, the first
/// registered prefix match wins; longest-prefix is not a tie-breaker.
#[tokio::test]
async fn scenario_first_match_semantics() {
    let (dispatcher, registry, _stats) = setup();
    registry
        .register(Arc::new(Command::new(Arc::new(StaticHandler {
            name: "ping",
            trigger: ".ping",
        }))))
        .unwrap();
    registry
        .register(Arc::new(Command::new(Arc::new(StaticHandler {
            name: "p",
            trigger: ".p",
        }))))
        .unwrap();

    let (message, editor) = self_message(".ping extra");
    let result = dispatcher.handle_message(&message).await.unwrap();
    assert_eq!(result.metadata["command_name"], "ping");
    assert_eq!(editor.last_edit().as_deref(), Some("ping"));
}

/// Scenario C: export after three successes and one failure of the same
/// command with durations 10/20/30/40 ms.
#[test]
fn scenario_export_metrics() {
    let stats = StatsTracker::new(Arc::new(FixedProbe(0.042)));
    for (duration, success) in [(10.0, true), (20.0, true), (30.0, true), (40.0, false)] {
        stats.record_command_execution("test", duration, success);
    }

    let export = stats.export_metrics();
    let metrics = &export["command_metrics"]["test"];
    assert_eq!(metrics["execution_count"], 4);
    assert_eq!(metrics["success_count"], 3);
    assert_eq!(metrics["error_count"], 1);
    assert_eq!(metrics["average_execution_time"], 25.0);
    assert_eq!(metrics["min_execution_time"], 10.0);
    assert_eq!(metrics["max_execution_time"], 40.0);
}

/// Registry uniqueness holds after every step of a register sequence.
#[test]
fn registry_uniqueness_through_register_sequence() {
    let registry = CommandRegistry::new('.');

    let steps: Vec<Arc<Command>> = vec![
        Arc::new(Command::new(Arc::new(StaticHandler {
            name: "ping",
            trigger: ".ping",
        }))),
        Arc::new(Command::new(Arc::new(StaticHandler {
            name: "help",
            trigger: ".help",
        }))),
        // same trigger, new name: silently replaces ping
        Arc::new(Command::new(Arc::new(StaticHandler {
            name: "pong",
            trigger: ".ping",
        }))),
    ];

    for command in steps {
        let _ = registry.register(command);
        for registered in registry.get_all_commands() {
            let by_trigger = registry.get_command(registered.trigger()).unwrap();
            let by_name = registry.get_command_by_name(registered.name()).unwrap();
            assert!(Arc::ptr_eq(&by_trigger, &by_name));
        }
    }

    // duplicate name on a different trigger is rejected and mutates nothing
    let err = registry
        .register(Arc::new(Command::new(Arc::new(StaticHandler {
            name: "pong",
            trigger: ".pg",
        }))))
        .unwrap_err();
    assert_eq!(err.code(), Some("DUPLICATE_COMMAND_NAME"));
    assert!(!registry.has_command(".pg"));
}

/// The full wired bot: ping and help registered the way the binary does
/// it, driven through the dispatcher.
#[tokio::test]
async fn full_dispatch_round() {
    let (dispatcher, registry, stats) = setup();
    let probe = Arc::new(FixedProbe(0.042));

    registry
        .register(Arc::new(Command::with_config(
            Arc::new(PingHandler::new(probe)),
            CommandConfig::with_cooldown(1000),
        )))
        .unwrap();
    registry
        .register(Arc::new(Command::with_config(
            Arc::new(HelpHandler::new(registry.clone())),
            CommandConfig::with_cooldown(2000),
        )))
        .unwrap();

    let (ping, _e1) = self_message(".ping");
    assert!(dispatcher.handle_message(&ping).await.unwrap().success);

    let (help, editor) = self_message(".help");
    let result = dispatcher.handle_message(&help).await.unwrap();
    assert!(result.success);
    let text = editor.last_edit().unwrap();
    assert!(text.contains(".ping"));
    assert!(text.contains(".help"));

    let summary = stats.get_performance_summary();
    assert_eq!(summary.total_commands, 2);
    assert_eq!(summary.unique_commands_used, 2);
    assert_eq!(summary.success_rate, 100.0);
    assert_eq!(stats.get_stats().messages_processed, 2);
}
