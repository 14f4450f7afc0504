//! Error types for MCP operations

use thiserror::Error;

/// Errors that can occur during MCP operations
#[derive(Error, Debug)]
pub enum McpError {
    /// Connection to the server failed
    #[error("MCP connection failed: {0}")]
    ConnectionFailed(String),

    /// Not connected to the MCP server
    #[error("Not connected to MCP server")]
    NotConnected,

    /// A request failed or returned a JSON-RPC error
    #[error("MCP request failed: {0}")]
    RequestFailed(String),

    /// A tool call failed
    #[error("MCP tool call failed: {0}")]
    ToolCallFailed(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// Invalid resource URI
    #[error("Invalid MCP URI: {0}")]
    InvalidUri(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}
