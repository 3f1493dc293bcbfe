//! Configuration management for the selfdot self-bot

pub mod loader;
pub mod settings;

pub use loader::{ConfigError, ConfigLoader};
pub use settings::{Config, DiscordConfig, FeatureFlags, LoggingSection};
