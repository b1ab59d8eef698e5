//! The command channel to a live server.
//!
//! Two transports sit behind one trait: a fire-and-forget line written to the
//! server console, and a request/response query (RCON). Neither ever fails a
//! caller hard; status displays turn errors into "N/A".

use async_trait::async_trait;

use crate::error::transport::TransportError;

/// Placeholder rendered when the query endpoint cannot be reached.
pub const UNAVAILABLE: &str = "N/A";

#[async_trait]
pub trait CommandChannel: Send + Sync {
    /// Writes one line of console input, e.g. `stop` or `save-all`.
    ///
    /// Success only means the transport accepted the write.
    async fn send_line(&self, text: &str) -> Result<(), TransportError>;

    /// Runs a command and returns the server's textual reply.
    async fn query(&self, command: &str) -> Result<String, TransportError>;
}

/// Renders a query result for a status display.
pub fn or_unavailable(result: Result<String, TransportError>) -> String {
    match result {
        Ok(reply) if !reply.trim().is_empty() => reply,
        Ok(_) => "(no output)".to_string(),
        Err(e) => {
            tracing::debug!("Query unavailable: {}", e);
            UNAVAILABLE.to_string()
        }
    }
}
