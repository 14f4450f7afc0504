//! MCP plumbing for chatbot-rs
//!
//! This crate carries everything both sides of the tool/resource protocol
//! share:
//!
//! - JSON-RPC 2.0 wire types ([`rpc`])
//! - MCP data types: tool definitions, tool results, resources ([`types`])
//! - The [`McpClient`] trait and its HTTP implementation ([`client`])
//! - Resource URI helpers ([`uri`])

pub mod client;
pub mod error;
pub mod rpc;
pub mod types;
pub mod uri;

// Re-export commonly used types
pub use client::{HttpMcpClient, McpClient};
pub use error::McpError;
pub use types::{
    McpContent, McpResourceContent, McpResourceDefinition, McpServerInfo, McpToolDefinition,
    McpToolResult,
};

/// Result type for MCP operations
pub type Result<T> = std::result::Result<T, McpError>;
