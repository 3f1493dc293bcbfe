//! selfdot - Discord self-bot entry point

mod auth;
mod gateway;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Parser;
use serenity::all::{Client, GatewayIntents};
use tracing::{error, info, warn};

use selfdot_commands::{
    Command, CommandRegistry, Dispatcher, HelpHandler, PingHandler, StatsTracker,
};
use selfdot_common::{init_logging, CommandConfig, ConnectionStatus};
use selfdot_config::{Config, ConfigLoader};

use crate::gateway::{run_latency_sampler, GatewayStatus, Handler};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Log level override
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configured token against the Discord API and exit
    #[arg(long)]
    validate_token: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    let mut logging = config.logging.to_logging_config();
    if let Some(level) = &args.log_level {
        logging.level = level.clone();
    }
    init_logging(&logging).context("Failed to initialize logging")?;

    info!("Starting selfdot");
    warn!("Self-bots violate Discord's Terms of Service - educational use only");

    auth::require_valid_format(&config.discord.token)?;

    if args.validate_token {
        return validate_token(&config).await;
    }

    run_bot(config).await
}

/// Probe the configured token against the Discord API and report
async fn validate_token(config: &Config) -> Result<()> {
    let validator = auth::TokenValidator::new(Duration::from_secs(
        config.discord.request_timeout_seconds,
    ))?;
    let info = validator.validate(&config.discord.token).await;

    println!("Token:       {}", info.token);
    println!("Valid:       {}", info.is_valid);
    if let Some(user_id) = &info.user_id {
        println!("User ID:     {user_id}");
    }
    if let Some(username) = &info.username {
        println!("Username:    {username}");
    }
    if let Some(mfa) = info.mfa_enabled {
        println!("MFA enabled: {mfa}");
    }
    if let Some(error) = &info.error_message {
        println!("Error:       {error}");
    }

    if info.is_valid {
        Ok(())
    } else {
        anyhow::bail!("token validation failed")
    }
}

/// Wire up the dispatch core and run the gateway client until shutdown
async fn run_bot(config: Config) -> Result<()> {
    let status = Arc::new(GatewayStatus::default());
    let stats = Arc::new(StatsTracker::new(status.clone()));
    let registry = Arc::new(CommandRegistry::new(config.discord.prefix_char()));

    register_commands(&registry, &status)?;
    let registry_stats = registry.get_stats();
    info!(
        total = registry_stats.total_commands,
        enabled = registry_stats.enabled_commands,
        "Commands registered"
    );

    let dispatcher = Arc::new(Dispatcher::new(registry.clone(), stats.clone()));
    stats.set_status(ConnectionStatus::Connecting);

    let intents =
        GatewayIntents::GUILD_MESSAGES | GatewayIntents::DIRECT_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord.token, intents)
        .event_handler(Handler::new(dispatcher, stats.clone(), status.clone()))
        .await
        .context("Failed to create Discord client")?;

    // background latency sampling for the stats tracker and ping command
    tokio::spawn(run_latency_sampler(
        client.shard_manager.clone(),
        status.clone(),
        config.discord.heartbeat_timeout_seconds,
    ));

    if config.features.enable_stats {
        tokio::spawn(log_stats_summary(stats.clone()));
    }

    // graceful shutdown on ctrl-c
    let shard_manager = client.shard_manager.clone();
    let shutdown_status = status.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
            return;
        }
        info!("Received shutdown signal, closing gateway connection");
        shutdown_status.set_closed(true);
        shard_manager.shutdown_all().await;
    });

    info!("Connecting to Discord");
    if let Err(why) = client.start().await {
        error!(error = %why, "Gateway client error");
        stats.set_status(ConnectionStatus::Error);
        return Err(why.into());
    }

    stats.set_status(ConnectionStatus::Disconnected);

    if config.features.enable_metrics {
        match serde_json::to_string(&stats.export_metrics()) {
            Ok(export) => info!(metrics = %export, "Final metrics export"),
            Err(e) => error!(error = %e, "Failed to export final metrics"),
        }
    }

    info!("selfdot stopped");
    Ok(())
}

/// Log a performance summary once an hour
async fn log_stats_summary(stats: Arc<StatsTracker>) {
    let mut interval = tokio::time::interval(Duration::from_secs(3600));
    interval.tick().await; // the first tick completes immediately
    loop {
        interval.tick().await;
        let summary = stats.get_performance_summary();
        info!(
            uptime_hours = summary.uptime_hours,
            total_commands = summary.total_commands,
            total_messages = summary.total_messages,
            success_rate = summary.success_rate,
            "Hourly statistics summary"
        );
    }
}

/// Create and register the built-in commands
fn register_commands(
    registry: &Arc<CommandRegistry>,
    status: &Arc<GatewayStatus>,
) -> Result<()> {
    registry
        .register(Arc::new(Command::with_config(
            Arc::new(PingHandler::new(status.clone())),
            CommandConfig::with_cooldown(1000),
        )))
        .context("Failed to register ping command")?;

    registry
        .register(Arc::new(Command::with_config(
            Arc::new(HelpHandler::new(registry.clone())),
            CommandConfig::with_cooldown(2000),
        )))
        .context("Failed to register help command")?;

    Ok(())
}
