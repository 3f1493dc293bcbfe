//! Common error, logging and type definitions for the selfdot self-bot

pub mod error;
pub mod logging;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{Result, SelfbotError};
pub use logging::{init_logging, LoggingConfig};
pub use types::*;
