//! MCP client: trait and HTTP transport
//!
//! The HTTP transport speaks JSON-RPC 2.0 over HTTP POST requests against a
//! single endpoint.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::McpError;
use crate::rpc::{RpcRequest, RpcResponse};
use crate::types::{
    McpResourceContent, McpResourceDefinition, McpServerCapabilities, McpServerInfo,
    McpToolDefinition, McpToolResult,
};
use crate::Result;

/// MCP client trait - abstracts over the transport
///
/// Note: all methods take &self to enable use through Arc. Implementations
/// use interior mutability for state changes.
#[async_trait]
pub trait McpClient: Send + Sync {
    /// Initialize the connection to the MCP server
    async fn connect(&self) -> Result<()>;

    /// Check if the client is connected
    fn is_connected(&self) -> bool;

    /// Disconnect from the server
    async fn disconnect(&self) -> Result<()>;

    /// List available tools
    async fn list_tools(&self) -> Result<Vec<McpToolDefinition>>;

    /// Call a tool
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<McpToolResult>;

    /// List available resources
    async fn list_resources(&self) -> Result<Vec<McpResourceDefinition>>;

    /// Read a resource
    async fn read_resource(&self, uri: &str) -> Result<McpResourceContent>;

    /// Get server info (from the initialize response)
    async fn server_info(&self) -> Option<McpServerInfo>;
}

/// MCP client using HTTP transport
///
/// Sends JSON-RPC 2.0 requests to the server endpoint via HTTP POST.
pub struct HttpMcpClient {
    url: String,

    /// HTTP client
    http_client: reqwest::Client,

    /// Server info from initialization
    server_info: Arc<Mutex<Option<McpServerInfo>>>,

    /// Connection state
    connected: Arc<Mutex<bool>>,

    /// Request ID counter
    request_id: Arc<Mutex<i64>>,
}

impl HttpMcpClient {
    /// Create a new HTTP MCP client
    ///
    /// # Arguments
    ///
    /// * `url` - Server endpoint URL
    /// * `timeout` - Request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            url: url.into(),
            http_client,
            server_info: Arc::new(Mutex::new(None)),
            connected: Arc::new(Mutex::new(false)),
            request_id: Arc::new(Mutex::new(0)),
        })
    }

    /// Get the server endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the next request ID
    async fn next_request_id(&self) -> i64 {
        let mut id = self.request_id.lock().await;
        *id += 1;
        *id
    }

    /// Send a JSON-RPC request over HTTP
    async fn send_request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_request_id().await;
        let request = RpcRequest::new(id, method, params);

        debug!("Sending HTTP request to {}: {}", self.url, method);

        let response = self
            .http_client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| McpError::ConnectionFailed(format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(McpError::RequestFailed(format!(
                "HTTP {} for {}: {}",
                response.status(),
                method,
                response.text().await.unwrap_or_default()
            )));
        }

        let response: RpcResponse = response
            .json()
            .await
            .map_err(|e| McpError::RequestFailed(format!("Failed to parse response: {e}")))?;

        debug!("Received response for: {}", method);

        if let Some(error) = response.error {
            return Err(McpError::RequestFailed(format!("{method}: {error}")));
        }

        response
            .result
            .ok_or_else(|| McpError::RequestFailed("No result in response".to_string()))
    }

    /// Send the initialize request and the initialized notification
    async fn initialize(&self) -> Result<McpServerInfo> {
        let params = json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {
                "tools": {},
                "resources": {}
            },
            "clientInfo": {
                "name": "chatbot-rs",
                "version": env!("CARGO_PKG_VERSION")
            }
        });

        let result = self.send_request("initialize", params).await?;

        let capabilities: McpServerCapabilities =
            serde_json::from_value(result["capabilities"].clone()).unwrap_or_default();

        let server_info = McpServerInfo {
            name: result["serverInfo"]["name"]
                .as_str()
                .unwrap_or("unknown")
                .to_string(),
            version: result["serverInfo"]["version"]
                .as_str()
                .unwrap_or("unknown")
                .to_string(),
            protocol_version: result["protocolVersion"]
                .as_str()
                .unwrap_or("2024-11-05")
                .to_string(),
            capabilities,
        };

        info!(
            "Connected to MCP server: {} v{}",
            server_info.name, server_info.version
        );

        // Initialized notification (fire and forget)
        let notification = RpcRequest::notification("notifications/initialized");
        let _ = self
            .http_client
            .post(&self.url)
            .json(&notification)
            .send()
            .await;

        Ok(server_info)
    }
}

#[async_trait]
impl McpClient for HttpMcpClient {
    async fn connect(&self) -> Result<()> {
        debug!("Connecting to MCP server: {}", self.url);

        let server_info = self.initialize().await?;

        *self.server_info.lock().await = Some(server_info);
        *self.connected.lock().await = true;

        Ok(())
    }

    fn is_connected(&self) -> bool {
        // Non-blocking check using try_lock
        self.connected
            .try_lock()
            .map(|guard| *guard)
            .unwrap_or(false)
    }

    async fn disconnect(&self) -> Result<()> {
        debug!("Disconnecting from MCP server");
        *self.connected.lock().await = false;
        Ok(())
    }

    async fn list_tools(&self) -> Result<Vec<McpToolDefinition>> {
        if !self.is_connected() {
            return Err(McpError::NotConnected);
        }

        let result = self.send_request("tools/list", json!({})).await?;

        let tools: Vec<McpToolDefinition> = serde_json::from_value(result["tools"].clone())
            .map_err(|e| McpError::RequestFailed(format!("Failed to parse tools: {e}")))?;

        Ok(tools)
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<McpToolResult> {
        if !self.is_connected() {
            return Err(McpError::NotConnected);
        }

        let params = json!({
            "name": name,
            "arguments": arguments
        });

        let result = self.send_request("tools/call", params).await?;

        let tool_result: McpToolResult = serde_json::from_value(result)
            .map_err(|e| McpError::ToolCallFailed(format!("Failed to parse result: {e}")))?;

        Ok(tool_result)
    }

    async fn list_resources(&self) -> Result<Vec<McpResourceDefinition>> {
        if !self.is_connected() {
            return Err(McpError::NotConnected);
        }

        let result = self.send_request("resources/list", json!({})).await?;

        let resources: Vec<McpResourceDefinition> =
            serde_json::from_value(result["resources"].clone())
                .map_err(|e| McpError::RequestFailed(format!("Failed to parse resources: {e}")))?;

        Ok(resources)
    }

    async fn read_resource(&self, uri: &str) -> Result<McpResourceContent> {
        if !self.is_connected() {
            return Err(McpError::NotConnected);
        }

        let params = json!({ "uri": uri });

        let result = self.send_request("resources/read", params).await?;

        let contents: Vec<McpResourceContent> =
            serde_json::from_value(result["contents"].clone())
                .map_err(|e| McpError::RequestFailed(format!("Failed to parse resource: {e}")))?;

        contents
            .into_iter()
            .next()
            .ok_or_else(|| McpError::ResourceNotFound(uri.to_string()))
    }

    async fn server_info(&self) -> Option<McpServerInfo> {
        self.server_info.lock().await.clone()
    }
}
