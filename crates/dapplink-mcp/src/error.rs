//! MCP error types
//!
//! [`McpError`] covers failures of the transport and of the worker process
//! itself. [`ToolCallError`] is what a caller of the news tool sees: a tagged
//! outcome telling the fallback chain why the tool tier produced nothing.

use thiserror::Error;

/// MCP operation result type
pub type McpResult<T> = Result<T, McpError>;

/// Errors that can occur while running or connecting to the news worker
#[derive(Debug, Error)]
pub enum McpError {
    /// The worker process could not be started
    #[error("Failed to spawn tool server '{command}': {message}")]
    Spawn { command: String, message: String },

    /// The initialize handshake failed
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The handshake did not complete in time
    #[error("Handshake timed out after {0} seconds")]
    HandshakeTimeout(u64),

    /// Transport error
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Server error
    #[error("Server error: {0}")]
    ServerError(String),
}

/// Why a news tool call produced no items
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolCallError {
    /// No connection to the worker, or the call did not complete
    #[error("tool server unreachable: {0}")]
    Unreachable(String),

    /// The worker answered with a payload that is not a news item list
    #[error("malformed tool result: {0}")]
    Malformed(String),

    /// The worker does not know the requested tool
    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

impl ToolCallError {
    /// Short label for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            ToolCallError::Unreachable(_) => "unreachable",
            ToolCallError::Malformed(_) => "malformed",
            ToolCallError::UnknownTool(_) => "unknown_tool",
        }
    }
}
