//! Structured logging infrastructure built on tracing

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::Result;

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "selfdot_commands=trace")
    pub level: String,
    /// Optional file path for log output; stdout when absent
    pub file: Option<String>,
    /// Whether to use colored output
    pub colored: bool,
    /// Whether to include timestamps
    pub include_timestamps: bool,
    /// Whether to include file/line information
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            colored: true,
            include_timestamps: true,
            include_location: false,
        }
    }
}

/// Initialize the global tracing subscriber with the given configuration
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_new(&config.level)
        .or_else(|_| EnvFilter::try_new("info"))
        .expect("fallback filter is valid");

    let registry = tracing_subscriber::registry().with(env_filter);

    if let Some(path) = &config.file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        let layer = fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(file);
        registry.with(layer).init();
    } else {
        let layer = fmt::layer()
            .with_ansi(config.colored)
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location);

        if config.include_timestamps {
            registry.with(layer).init();
        } else {
            registry.with(layer.without_time()).init();
        }
    }

    Ok(())
}
