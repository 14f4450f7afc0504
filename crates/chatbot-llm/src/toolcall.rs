//! Canonical tool-call records
//!
//! Upstream APIs emit tool-call requests in more than one shape: an object
//! with a top-level `name`, an OpenAI-style `function` wrapper, or a plain
//! dictionary with `args`. Everything is normalized here into one canonical
//! record before the resolution loop consumes it, so shape tolerance lives
//! in exactly one place.

use serde_json::Value;

use crate::error::{LlmError, Result};

/// A normalized tool-call request: `{id, name, arguments}`
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    /// Call identifier correlating request to result
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Argument payload for the tool
    pub arguments: Value,
}

impl ToolCall {
    /// Create a tool call, synthesizing an id from the name when absent
    pub fn new(id: Option<String>, name: impl Into<String>, arguments: Value) -> Self {
        let name = name.into();
        let id = id.unwrap_or_else(|| synthesize_id(&name));
        Self {
            id,
            name,
            arguments,
        }
    }

    /// Normalize an upstream tool-call value into the canonical record
    ///
    /// Accepted shapes:
    /// - `{"id"?, "name", "args" | "arguments"}`
    /// - `{"id"?, "function": {"name", "arguments"}}`
    ///
    /// String-encoded arguments are decoded as JSON; on decode failure the
    /// raw string is passed through unchanged. The tool itself is expected
    /// to reject malformed input.
    pub fn normalize(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| LlmError::UnexpectedResponse(format!("tool call is not an object: {value}")))?;

        let id = obj.get("id").and_then(Value::as_str).map(str::to_string);

        let (name, raw_args) = if let Some(function) = obj.get("function") {
            let name = function
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    LlmError::UnexpectedResponse("tool call function has no name".to_string())
                })?;
            (name, function.get("arguments").cloned())
        } else {
            let name = obj.get("name").and_then(Value::as_str).ok_or_else(|| {
                LlmError::UnexpectedResponse(format!("tool call has no name: {value}"))
            })?;
            (
                name,
                obj.get("args").or_else(|| obj.get("arguments")).cloned(),
            )
        };

        let arguments = parse_arguments(raw_args.unwrap_or(Value::Null));

        Ok(Self::new(id, name, arguments))
    }
}

/// Synthesize a call identifier for a tool-call request without one
pub fn synthesize_id(name: &str) -> String {
    format!("call_{name}")
}

/// Best-effort argument decoding
///
/// A string payload is treated as encoded JSON and decoded; if decoding
/// fails the raw string passes through unchanged. This is a deliberate
/// leniency policy, not an error path.
pub fn parse_arguments(raw: Value) -> Value {
    match raw {
        Value::String(s) => serde_json::from_str(&s).unwrap_or(Value::String(s)),
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other,
    }
}
