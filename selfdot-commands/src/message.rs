//! The seam between the dispatch core and the gateway collaborator
//!
//! The gateway delivers messages as [`IncomingMessage`] values and
//! exposes connection health through [`GatewayProbe`]. Everything the
//! core needs from the transport is behind these two traits, so tests
//! drive the pipeline with in-memory doubles.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use selfdot_common::Result;

/// Edit access to the message that triggered a command
#[async_trait]
pub trait MessageEditor: Send + Sync {
    /// Replace the message content in place
    async fn edit(&self, content: &str) -> Result<()>;
}

/// Read-only connection health exposed by the gateway client
pub trait GatewayProbe: Send + Sync {
    /// Current gateway round-trip latency in seconds
    fn latency(&self) -> f64;

    /// Whether the client has completed its ready handshake
    fn is_ready(&self) -> bool;

    /// Whether the client has been shut down
    fn is_closed(&self) -> bool;
}

/// One inbound message from the account's own stream
#[derive(Clone)]
pub struct IncomingMessage {
    /// Raw message text
    pub content: String,
    /// Author snowflake
    pub author_id: u64,
    editor: Arc<dyn MessageEditor>,
}

impl IncomingMessage {
    pub fn new(
        content: impl Into<String>,
        author_id: u64,
        editor: Arc<dyn MessageEditor>,
    ) -> Self {
        Self {
            content: content.into(),
            author_id,
            editor,
        }
    }

    /// Edit the triggering message in place
    pub async fn edit(&self, content: &str) -> Result<()> {
        self.editor.edit(content).await
    }
}

impl fmt::Debug for IncomingMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncomingMessage")
            .field("content", &self.content)
            .field("author_id", &self.author_id)
            .finish_non_exhaustive()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn test_edit_delegates_to_editor() {
        let (message, editor) = self_message(".ping", 42);
        message.edit("pong").await.unwrap();
        assert_eq!(editor.last_edit().as_deref(), Some("pong"));
    }

    #[test]
    fn test_debug_omits_editor() {
        let (message, _editor) = self_message(".ping", 42);
        let rendered = format!("{message:?}");
        assert!(rendered.contains(".ping"));
        assert!(rendered.contains("42"));
    }
}
