//! Command dispatch subsystem for the selfdot self-bot
//!
//! The pieces fit together as a short chain: the gateway hands every
//! inbound message to the [`Dispatcher`], which looks the trigger up in
//! the [`CommandRegistry`], runs the matched [`Command`]'s execution
//! pipeline and reports the outcome to the [`StatsTracker`].

pub mod command;
pub mod dispatcher;
pub mod help;
pub mod message;
pub mod ping;
pub mod registry;
pub mod stats;

pub use command::{Command, CommandHandler};
pub use dispatcher::Dispatcher;
pub use help::HelpHandler;
pub use message::{GatewayProbe, IncomingMessage, MessageEditor};
pub use ping::PingHandler;
pub use registry::{CommandRegistry, RegistryStats};
pub use stats::{PerformanceSummary, StatsTracker};
