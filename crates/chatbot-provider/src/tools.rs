//! Tool definitions and execution

use serde::Deserialize;
use serde_json::{Value, json};

use chatbot_llm::tools::schema;
use chatbot_mcp::types::{McpToolDefinition, McpToolResult};

/// Arguments shared by both arithmetic tools
#[derive(Debug, Deserialize)]
struct BinaryArgs {
    a: i64,
    b: i64,
}

/// List the tool definitions exposed by this provider
pub fn definitions() -> Vec<McpToolDefinition> {
    vec![
        McpToolDefinition {
            name: "add".to_string(),
            description: Some("Add two integers".to_string()),
            input_schema: binary_schema(),
        },
        McpToolDefinition {
            name: "multiply".to_string(),
            description: Some("Multiply two integers".to_string()),
            input_schema: binary_schema(),
        },
    ]
}

fn binary_schema() -> Value {
    schema::object(
        json!({
            "a": schema::integer("First operand"),
            "b": schema::integer("Second operand"),
        }),
        vec!["a", "b"],
    )
}

/// Check whether a tool with this name exists
pub fn exists(name: &str) -> bool {
    definitions().iter().any(|tool| tool.name == name)
}

/// Execute a tool by name
///
/// Execution failures (malformed arguments, arithmetic overflow) become an
/// `isError` tool result rather than a protocol error; the caller decides
/// how to surface them.
pub fn execute(name: &str, arguments: &Value) -> McpToolResult {
    match run(name, arguments) {
        Ok(result) => McpToolResult::text(result),
        Err(message) => McpToolResult {
            content: vec![chatbot_mcp::types::McpContent::Text { text: message }],
            is_error: Some(true),
        },
    }
}

fn run(name: &str, arguments: &Value) -> Result<String, String> {
    let args: BinaryArgs = serde_json::from_value(arguments.clone())
        .map_err(|e| format!("Invalid arguments for '{name}': {e}"))?;

    match name {
        "add" => args
            .a
            .checked_add(args.b)
            .map(|sum| sum.to_string())
            .ok_or_else(|| "Error in addition".to_string()),
        "multiply" => args
            .a
            .checked_mul(args.b)
            .map(|product| product.to_string())
            .ok_or_else(|| "Error in multiplication".to_string()),
        other => Err(format!("Unknown tool: {other}")),
    }
}
