//! Environment-backed settings

use serde::{Deserialize, Serialize};

/// Default endpoint of the tool/resource provider
pub const DEFAULT_MCP_SERVER_URL: &str = "http://127.0.0.1:8080/mcp";

/// Default base URL of the numeric service
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Shared settings for the workspace binaries
///
/// Every field has a sensible local-development default and can be
/// overridden through the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Tool/resource provider endpoint
    pub mcp_server_url: String,

    /// Numeric service base URL
    pub backend_url: String,
}

impl Settings {
    /// Load settings from the environment, falling back to defaults
    ///
    /// Reads `MCP_SERVER_URL` and `BACKEND_URL`.
    pub fn from_env() -> Self {
        Self {
            mcp_server_url: std::env::var("MCP_SERVER_URL")
                .unwrap_or_else(|_| DEFAULT_MCP_SERVER_URL.to_string()),
            backend_url: std::env::var("BACKEND_URL")
                .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string()),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mcp_server_url: DEFAULT_MCP_SERVER_URL.to_string(),
            backend_url: DEFAULT_BACKEND_URL.to_string(),
        }
    }
}
