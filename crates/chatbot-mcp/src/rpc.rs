//! JSON-RPC 2.0 message types
//!
//! The tool/resource protocol runs JSON-RPC 2.0 over HTTP POST. These types
//! are shared by the client in this crate and the provider server binary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Error codes (JSON-RPC standard)
// ============================================================================

/// Parse error - invalid JSON was received
pub const PARSE_ERROR: i32 = -32700;

/// Invalid Request - the JSON sent is not a valid Request object
pub const INVALID_REQUEST: i32 = -32600;

/// Method not found
pub const METHOD_NOT_FOUND: i32 = -32601;

/// Invalid method parameter(s)
pub const INVALID_PARAMS: i32 = -32602;

/// Internal JSON-RPC error
pub const INTERNAL_ERROR: i32 = -32603;

// ============================================================================
// Request / response
// ============================================================================

/// JSON-RPC request/response identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(i64),
    String(String),
}

impl std::fmt::Display for RpcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RpcId::Number(n) => write!(f, "{n}"),
            RpcId::String(s) => write!(f, "{s}"),
        }
    }
}

/// JSON-RPC 2.0 request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Protocol version (must be "2.0")
    pub jsonrpc: String,

    /// Request identifier (None for notifications)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RpcId>,

    /// Method name to invoke
    pub method: String,

    /// Method parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RpcRequest {
    /// Create a request with a numeric id
    pub fn new(id: i64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(RpcId::Number(id)),
            method: method.into(),
            params: Some(params),
        }
    }

    /// Create a notification (no response expected)
    pub fn notification(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: None,
            method: method.into(),
            params: None,
        }
    }

    /// Check if this is a notification
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC 2.0 response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    /// Protocol version (always "2.0")
    pub jsonrpc: String,

    /// Request identifier (must match the request)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RpcId>,

    /// Result on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    /// Create a success response
    pub fn success(id: Option<RpcId>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: Option<RpcId>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Create a parse-error response (no id available)
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::error(None, PARSE_ERROR, message)
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    /// Error code
    pub code: i32,

    /// Human-readable message
    pub message: String,

    /// Optional extra data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}
