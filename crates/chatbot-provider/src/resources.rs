//! Resource definitions and reads

use serde_json::{Value, json};
use tracing::warn;

use chatbot_mcp::types::{McpResourceContent, McpResourceDefinition};

/// URI of the proxied profit resource
pub const TOTAL_PROFIT_URI: &str = "api://total_profit";

/// List the resource definitions exposed by this provider
pub fn definitions() -> Vec<McpResourceDefinition> {
    vec![McpResourceDefinition {
        uri: TOTAL_PROFIT_URI.to_string(),
        name: "total_profit".to_string(),
        description: Some("Total profit data fetched from the numeric service".to_string()),
        mime_type: Some("application/json".to_string()),
    }]
}

/// Check whether a resource with this URI exists
pub fn exists(uri: &str) -> bool {
    uri == TOTAL_PROFIT_URI
}

/// Read the profit resource by proxying the numeric service
///
/// Transport failures do not fail the read: the resource content becomes an
/// `{"error": <message>}` object, matching what a caller polling the
/// service directly would want to see.
pub async fn read_total_profit(
    http_client: &reqwest::Client,
    backend_url: &str,
) -> McpResourceContent {
    let url = format!("{backend_url}/total_profit");

    let body = match fetch_json(http_client, &url).await {
        Ok(body) => body,
        Err(message) => {
            warn!("total_profit fetch failed: {}", message);
            json!({ "error": message })
        }
    };

    McpResourceContent {
        uri: TOTAL_PROFIT_URI.to_string(),
        mime_type: Some("application/json".to_string()),
        text: Some(body.to_string()),
        blob: None,
    }
}

async fn fetch_json(http_client: &reqwest::Client, url: &str) -> Result<Value, String> {
    let response = http_client
        .get(url)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let response = response.error_for_status().map_err(|e| e.to_string())?;

    response.json().await.map_err(|e| e.to_string())
}
