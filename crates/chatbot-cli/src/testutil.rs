//! Scripted fakes for session and resolver tests

use async_trait::async_trait;
use chatbot_llm::{
    CompletionRequest, CompletionResponse, ContentBlock, LlmError, LlmProvider, Message,
    MessageContent, Role, StopReason, TokenUsage,
};
use chatbot_mcp::types::{
    McpContent, McpResourceContent, McpResourceDefinition, McpServerInfo, McpToolDefinition,
    McpToolResult,
};
use chatbot_mcp::{McpClient, McpError, uri};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Model provider that replays a fixed script of responses
pub struct FakeProvider {
    script: Mutex<VecDeque<CompletionResponse>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeProvider {
    pub fn new(script: Vec<CompletionResponse>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request the provider has seen, in order
    pub fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// A plain text answer
    pub fn text_response(text: &str) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    /// A response requesting the given tool calls
    pub fn tool_response(calls: Vec<(&str, &str, Value)>) -> CompletionResponse {
        Self::response_with_blocks(Self::tool_blocks(calls))
    }

    /// A response with leading text and tool calls
    pub fn text_and_tool_response(
        text: &str,
        calls: Vec<(&str, &str, Value)>,
    ) -> CompletionResponse {
        let mut blocks = vec![ContentBlock::Text {
            text: text.to_string(),
        }];
        blocks.extend(Self::tool_blocks(calls));
        Self::response_with_blocks(blocks)
    }

    fn tool_blocks(calls: Vec<(&str, &str, Value)>) -> Vec<ContentBlock> {
        calls
            .into_iter()
            .map(|(id, name, input)| ContentBlock::ToolUse {
                id: id.to_string(),
                name: name.to_string(),
                input,
            })
            .collect()
    }

    fn response_with_blocks(blocks: Vec<ContentBlock>) -> CompletionResponse {
        CompletionResponse {
            message: Message {
                role: Role::Assistant,
                content: Some(MessageContent::Blocks(blocks)),
            },
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        }
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    async fn complete(&self, request: CompletionRequest) -> chatbot_llm::Result<CompletionResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        self.script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front())
            .ok_or_else(|| LlmError::RequestFailed("scripted responses exhausted".to_string()))
    }

    fn name(&self) -> &str {
        "fake"
    }
}

enum ToolBehavior {
    Succeed(String),
    Fail(String),
}

enum ResourceBehavior {
    Succeed(String),
    Fail,
}

/// Tool provider with configurable tools and resources
pub struct FakeClient {
    tools: Vec<(String, ToolBehavior)>,
    resources: Vec<(String, ResourceBehavior)>,
    calls: Mutex<Vec<(String, Value)>>,
    connected: AtomicBool,
}

impl FakeClient {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            resources: Vec::new(),
            calls: Mutex::new(Vec::new()),
            connected: AtomicBool::new(false),
        }
    }

    pub fn with_tool(mut self, name: &str, result: &str) -> Self {
        self.tools
            .push((name.to_string(), ToolBehavior::Succeed(result.to_string())));
        self
    }

    pub fn with_failing_tool(mut self, name: &str, error: &str) -> Self {
        self.tools
            .push((name.to_string(), ToolBehavior::Fail(error.to_string())));
        self
    }

    pub fn with_resource(mut self, resource_uri: &str, text: &str) -> Self {
        self.resources.push((
            resource_uri.to_string(),
            ResourceBehavior::Succeed(text.to_string()),
        ));
        self
    }

    pub fn with_failing_resource(mut self, resource_uri: &str) -> Self {
        self.resources
            .push((resource_uri.to_string(), ResourceBehavior::Fail));
        self
    }

    /// Every tool call the client has seen, in order
    pub fn recorded_calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl McpClient for FakeClient {
    async fn connect(&self) -> chatbot_mcp::Result<()> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn disconnect(&self) -> chatbot_mcp::Result<()> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn list_tools(&self) -> chatbot_mcp::Result<Vec<McpToolDefinition>> {
        Ok(self
            .tools
            .iter()
            .map(|(name, _)| McpToolDefinition {
                name: name.clone(),
                description: Some(format!("{name} tool")),
                input_schema: json!({"type": "object"}),
            })
            .collect())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> chatbot_mcp::Result<McpToolResult> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((name.to_string(), arguments));
        }

        let behavior = self
            .tools
            .iter()
            .find(|(tool, _)| tool == name)
            .map(|(_, behavior)| behavior)
            .ok_or_else(|| McpError::ToolCallFailed(format!("unknown tool: {name}")))?;

        match behavior {
            ToolBehavior::Succeed(result) => Ok(McpToolResult::text(result.clone())),
            ToolBehavior::Fail(error) => Ok(McpToolResult {
                content: vec![McpContent::Text {
                    text: error.clone(),
                }],
                is_error: Some(true),
            }),
        }
    }

    async fn list_resources(&self) -> chatbot_mcp::Result<Vec<McpResourceDefinition>> {
        Ok(self
            .resources
            .iter()
            .map(|(resource_uri, _)| McpResourceDefinition {
                uri: resource_uri.clone(),
                name: uri::short_name(resource_uri),
                description: None,
                mime_type: Some("application/json".to_string()),
            })
            .collect())
    }

    async fn read_resource(&self, resource_uri: &str) -> chatbot_mcp::Result<McpResourceContent> {
        let behavior = self
            .resources
            .iter()
            .find(|(known, _)| known == resource_uri)
            .map(|(_, behavior)| behavior)
            .ok_or_else(|| McpError::ResourceNotFound(resource_uri.to_string()))?;

        match behavior {
            ResourceBehavior::Succeed(text) => Ok(McpResourceContent {
                uri: resource_uri.to_string(),
                mime_type: Some("application/json".to_string()),
                text: Some(text.clone()),
                blob: None,
            }),
            ResourceBehavior::Fail => Err(McpError::ResourceNotFound(resource_uri.to_string())),
        }
    }

    async fn server_info(&self) -> Option<McpServerInfo> {
        Some(McpServerInfo {
            name: "fake-server".to_string(),
            version: "0.0.0".to_string(),
            protocol_version: "2024-11-05".to_string(),
            capabilities: Default::default(),
        })
    }
}

/// Handler that records the events it receives
#[derive(Default)]
pub struct RecordingHandler {
    events: Mutex<Vec<String>>,
}

impl RecordingHandler {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn record(&self, event: String) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[async_trait]
impl crate::resolver::ResolverHandler for RecordingHandler {
    async fn on_text(&self, text: &str) {
        self.record(format!("text:{text}"));
    }

    async fn on_tool_start(&self, _id: &str, name: &str, _input: &Value) {
        self.record(format!("start:{name}"));
    }

    async fn on_tool_done(
        &self,
        _id: &str,
        name: &str,
        result: std::result::Result<&str, &str>,
        _duration_ms: u64,
    ) {
        let status = if result.is_ok() { "ok" } else { "err" };
        self.record(format!("done:{name}:{status}"));
    }
}
