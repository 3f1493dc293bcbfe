//! Serenity gateway wiring: events in, message edits out

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serenity::all::{
    ChannelId, ConnectionStage, Context, EditMessage, EventHandler, Message, MessageId, Ready,
    ResumedEvent, ShardStageUpdateEvent,
};
use async_trait::async_trait;
use serenity::gateway::ShardManager;
use serenity::http::Http;
use tracing::{debug, info, warn};

use selfdot_commands::{Dispatcher, GatewayProbe, IncomingMessage, MessageEditor, StatsTracker};
use selfdot_common::{ConnectionStatus, Result, SelfbotError};

/// Connection health shared between the gateway and the dispatch core.
///
/// The latency sampler and the event handler write; the stats tracker
/// and the ping command read through the [`GatewayProbe`] trait.
#[derive(Debug, Default)]
pub struct GatewayStatus {
    latency_micros: AtomicU64,
    ready: AtomicBool,
    closed: AtomicBool,
}

impl GatewayStatus {
    pub fn record_latency(&self, latency: Duration) {
        self.latency_micros
            .store(latency.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Relaxed);
    }

    pub fn set_closed(&self, closed: bool) {
        self.closed.store(closed, Ordering::Relaxed);
    }
}

impl GatewayProbe for GatewayStatus {
    fn latency(&self) -> f64 {
        self.latency_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }
}

/// Edits the triggering Discord message through the REST API
struct SerenityEditor {
    http: Arc<Http>,
    channel_id: ChannelId,
    message_id: MessageId,
}

#[async_trait]
impl MessageEditor for SerenityEditor {
    async fn edit(&self, content: &str) -> Result<()> {
        self.channel_id
            .edit_message(
                &self.http,
                self.message_id,
                EditMessage::new().content(content),
            )
            .await
            .map_err(|e| SelfbotError::connection(format!("Failed to edit message: {e}")))?;
        Ok(())
    }
}

/// Serenity event handler feeding the dispatcher
pub struct Handler {
    dispatcher: Arc<Dispatcher>,
    stats: Arc<StatsTracker>,
    status: Arc<GatewayStatus>,
}

impl Handler {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        stats: Arc<StatsTracker>,
        status: Arc<GatewayStatus>,
    ) -> Self {
        Self {
            dispatcher,
            stats,
            status,
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        self.status.set_ready(true);
        self.stats.set_status(ConnectionStatus::Connected);
        self.dispatcher.set_self_user(ready.user.id.get());
        info!(user = %ready.user.name, user_id = ready.user.id.get(), "Logged in");
        warn!("Self-bot is now active - use responsibly");
    }

    async fn resume(&self, _ctx: Context, _event: ResumedEvent) {
        self.stats.set_status(ConnectionStatus::Connected);
        info!("Gateway connection resumed");
    }

    async fn shard_stage_update(&self, _ctx: Context, event: ShardStageUpdateEvent) {
        let status = match event.new {
            ConnectionStage::Connected => ConnectionStatus::Connected,
            ConnectionStage::Resuming => ConnectionStatus::Reconnecting,
            ConnectionStage::Disconnected => ConnectionStatus::Disconnected,
            _ => ConnectionStatus::Connecting,
        };
        debug!(shard = %event.shard_id, stage = ?event.new, "Shard stage update");
        self.stats.set_status(status);
    }

    async fn message(&self, ctx: Context, message: Message) {
        let editor = Arc::new(SerenityEditor {
            http: ctx.http.clone(),
            channel_id: message.channel_id,
            message_id: message.id,
        });
        let incoming = IncomingMessage::new(message.content, message.author.id.get(), editor);
        self.dispatcher.handle_message(&incoming).await;
    }
}

/// Periodically read shard latency into the shared gateway status
pub async fn run_latency_sampler(
    shard_manager: Arc<ShardManager>,
    status: Arc<GatewayStatus>,
    interval_secs: u64,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    loop {
        interval.tick().await;
        let runners = shard_manager.runners.lock().await;
        if let Some(info) = runners.values().next() {
            if let Some(latency) = info.latency {
                debug!(latency_ms = latency.as_millis() as u64, "Sampled gateway latency");
                status.record_latency(latency);
            }
        }
    }
}
