//! JSON-RPC request dispatch
//!
//! A single `POST /mcp` endpoint carries every method: `initialize`, the
//! `notifications/initialized` notification, `tools/list`, `tools/call`,
//! `resources/list`, and `resources/read`.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::{debug, info};

use chatbot_mcp::rpc::{INVALID_PARAMS, METHOD_NOT_FOUND, RpcRequest, RpcResponse};

use crate::{resources, tools};

/// Shared state for the provider server
#[derive(Clone)]
pub struct ProviderState {
    /// Base URL of the numeric service
    pub backend_url: String,

    /// HTTP client for proxied resource reads
    pub http_client: reqwest::Client,
}

impl ProviderState {
    /// Create provider state with a fresh HTTP client
    pub fn new(backend_url: impl Into<String>) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            backend_url: backend_url.into(),
            http_client,
        })
    }
}

/// Axum handler for the JSON-RPC endpoint
pub async fn rpc_handler(State(state): State<ProviderState>, body: String) -> Response {
    let request: RpcRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            return Json(RpcResponse::parse_error(e.to_string())).into_response();
        }
    };

    // Notifications get no response body
    if request.is_notification() {
        debug!("notification: {}", request.method);
        return StatusCode::ACCEPTED.into_response();
    }

    let response = dispatch(&state, request).await;
    Json(response).into_response()
}

/// Route one JSON-RPC request to its handler
pub async fn dispatch(state: &ProviderState, request: RpcRequest) -> RpcResponse {
    debug!("dispatching: {}", request.method);
    let id = request.id.clone();
    let params = request.params.unwrap_or_else(|| json!({}));

    match request.method.as_str() {
        "initialize" => RpcResponse::success(id, initialize_result()),

        "tools/list" => RpcResponse::success(id, json!({ "tools": tools::definitions() })),

        "tools/call" => {
            let Some(name) = params.get("name").and_then(Value::as_str) else {
                return RpcResponse::error(id, INVALID_PARAMS, "Missing tool name");
            };

            if !tools::exists(name) {
                return RpcResponse::error(id, INVALID_PARAMS, format!("Unknown tool: {name}"));
            }

            let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));
            info!(tool = name, "tool call");

            let result = tools::execute(name, &arguments);
            match serde_json::to_value(&result) {
                Ok(value) => RpcResponse::success(id, value),
                Err(e) => RpcResponse::error(id, INVALID_PARAMS, e.to_string()),
            }
        }

        "resources/list" => {
            RpcResponse::success(id, json!({ "resources": resources::definitions() }))
        }

        "resources/read" => {
            let Some(uri) = params.get("uri").and_then(Value::as_str) else {
                return RpcResponse::error(id, INVALID_PARAMS, "Missing resource uri");
            };

            if !resources::exists(uri) {
                return RpcResponse::error(id, INVALID_PARAMS, format!("Unknown resource: {uri}"));
            }

            info!(uri, "resource read");
            let content =
                resources::read_total_profit(&state.http_client, &state.backend_url).await;
            match serde_json::to_value(&content) {
                Ok(value) => RpcResponse::success(id, json!({ "contents": [value] })),
                Err(e) => RpcResponse::error(id, INVALID_PARAMS, e.to_string()),
            }
        }

        other => RpcResponse::error(id, METHOD_NOT_FOUND, format!("Unknown method: {other}")),
    }
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": "2024-11-05",
        "capabilities": {
            "tools": {},
            "resources": {}
        },
        "serverInfo": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}
