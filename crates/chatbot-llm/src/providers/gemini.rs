//! Gemini provider implementation
//!
//! Implements the [`LlmProvider`] trait against Google's Gemini
//! `generateContent` REST API.
//! See: https://ai.google.dev/api/generate-content
//!
//! # Examples
//!
//! ```no_run
//! use chatbot_llm::{CompletionRequest, Message, LlmProvider};
//! use chatbot_llm::providers::GeminiProvider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create provider from the GOOGLE_API_KEY environment variable
//!     let provider = GeminiProvider::from_env()?;
//!
//!     let request = CompletionRequest::builder("gemini-1.5-flash")
//!         .add_message(Message::user("Hello!"))
//!         .max_tokens(100)
//!         .build();
//!
//!     let response = provider.complete(request).await?;
//!     println!("{}", response.message.text().unwrap_or_default());
//!
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::toolcall::ToolCall;
use crate::{
    CompletionRequest, CompletionResponse, ContentBlock, LlmError, LlmProvider, Message,
    MessageContent, Result, Role, StopReason, TokenUsage, ToolDefinition,
};

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the Gemini provider
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Gemini API key
    pub api_key: String,

    /// Base URL for the Gemini API
    pub api_base: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,
}

impl GeminiConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Create config from the environment
    ///
    /// Reads the API key from `GOOGLE_API_KEY` and optionally the base URL
    /// from `GEMINI_API_BASE`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY").map_err(|_| {
            LlmError::ConfigurationError("GOOGLE_API_KEY environment variable not set".to_string())
        })?;

        let api_base =
            std::env::var("GEMINI_API_BASE").unwrap_or_else(|_| DEFAULT_GEMINI_API_BASE.to_string());

        Ok(Self {
            api_key,
            api_base,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Set a custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set the request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Gemini provider
///
/// Supports the Gemini model family (gemini-1.5-flash, gemini-1.5-pro, ...)
/// through the `generateContent` endpoint, including function calling.
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create a new Gemini provider with custom configuration
    pub fn with_config(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a new Gemini provider with an API key and default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(GeminiConfig::new(api_key))
    }

    /// Create a provider from the `GOOGLE_API_KEY` environment variable
    pub fn from_env() -> Result<Self> {
        let config = GeminiConfig::from_env()?;
        Self::with_config(config)
    }

    /// Get the current configuration
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!("Sending request to Gemini API at {}", self.config.api_base);

        let gemini_request = GeminiRequest {
            contents: build_gemini_contents(&request.messages),
            tools: request.tools.as_ref().map(|tools| {
                vec![GeminiToolSet {
                    function_declarations: convert_tools(tools),
                }]
            }),
            system_instruction: request.system.map(|text| GeminiContent {
                role: None,
                parts: vec![GeminiPart::text(text)],
            }),
            generation_config: Some(GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            }),
        };

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.api_base, request.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(&gemini_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;

            return Err(match status.as_u16() {
                401 | 403 => LlmError::AuthenticationFailed,
                429 => LlmError::RateLimitExceeded(error_text),
                400 => LlmError::InvalidRequest(error_text),
                404 => LlmError::ModelNotFound(request.model),
                _ => LlmError::RequestFailed(format!("HTTP {status}: {error_text}")),
            });
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::UnexpectedResponse(format!("Failed to parse response: {e}")))?;

        let candidate = gemini_response.candidates.into_iter().next().ok_or_else(|| {
            LlmError::UnexpectedResponse("No candidates in response".to_string())
        })?;

        let message = parse_candidate(candidate.content)?;
        let stop_reason = if message.has_tool_uses() {
            // Gemini reports STOP even when it requests function calls
            StopReason::ToolUse
        } else {
            map_finish_reason(candidate.finish_reason.as_deref())
        };

        let usage = gemini_response
            .usage_metadata
            .map(|u| TokenUsage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        debug!(
            stop_reason = ?stop_reason,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "Gemini response received"
        );

        Ok(CompletionResponse {
            message,
            stop_reason,
            usage,
        })
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

// ============================================================================
// Gemini wire types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GeminiToolSet>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

/// One part of a Gemini content turn: text, a function call, or a
/// function response. Modeled as a struct with optional fields because
/// the API mixes them freely within one `parts` array.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<GeminiFunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_response: Option<GeminiFunctionResponse>,
}

impl GeminiPart {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            function_call: None,
            function_response: None,
        }
    }

    fn function_call(name: String, args: Value) -> Self {
        Self {
            text: None,
            function_call: Some(GeminiFunctionCall { name, args }),
            function_response: None,
        }
    }

    fn function_response(name: String, response: Value) -> Self {
        Self {
            text: None,
            function_call: None,
            function_response: Some(GeminiFunctionResponse { name, response }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiToolSet {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_output_tokens: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: GeminiContent,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

// ============================================================================
// Conversion functions
// ============================================================================

/// Build Gemini contents from the generic conversation
///
/// Assistant turns map to role "model"; tool-result turns become user turns
/// carrying `functionResponse` parts keyed by tool name.
fn build_gemini_contents(messages: &[Message]) -> Vec<GeminiContent> {
    messages.iter().map(convert_message).collect()
}

fn convert_message(msg: &Message) -> GeminiContent {
    let role = match msg.role {
        Role::User | Role::Tool => "user",
        Role::Assistant => "model",
    };

    let parts = match &msg.content {
        Some(MessageContent::Text(text)) => vec![GeminiPart::text(text.clone())],
        Some(MessageContent::Blocks(blocks)) => blocks.iter().map(convert_block).collect(),
        None => vec![GeminiPart::text(String::new())],
    };

    GeminiContent {
        role: Some(role.to_string()),
        parts,
    }
}

fn convert_block(block: &ContentBlock) -> GeminiPart {
    match block {
        ContentBlock::Text { text } => GeminiPart::text(text.clone()),
        ContentBlock::ToolUse { name, input, .. } => {
            GeminiPart::function_call(name.clone(), input.clone())
        }
        ContentBlock::ToolResult { name, content, .. } => {
            // Gemini wants an object payload; wrap plain text results
            let response = match serde_json::from_str::<Value>(content) {
                Ok(v) if v.is_object() => v,
                _ => json!({ "result": content }),
            };
            GeminiPart::function_response(name.clone(), response)
        }
    }
}

/// Convert tool definitions to Gemini function declarations
///
/// Name and description carry over unchanged; `input_schema` is renamed to
/// `parameters` as the API requires.
fn convert_tools(tools: &[ToolDefinition]) -> Vec<FunctionDeclaration> {
    tools
        .iter()
        .map(|tool| FunctionDeclaration {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.input_schema.clone(),
        })
        .collect()
}

/// Parse a Gemini candidate into an assistant message
///
/// Function-call parts run through the canonical [`ToolCall`] normalization
/// (Gemini supplies no call id, so one is synthesized from the tool name).
fn parse_candidate(content: GeminiContent) -> Result<Message> {
    let mut blocks = Vec::new();

    for part in content.parts {
        if let Some(text) = part.text {
            if !text.is_empty() {
                blocks.push(ContentBlock::Text { text });
            }
        }
        if let Some(call) = part.function_call {
            let call = ToolCall::normalize(&json!({
                "name": call.name,
                "args": call.args,
            }))?;
            blocks.push(ContentBlock::ToolUse {
                id: call.id,
                name: call.name,
                input: call.arguments,
            });
        }
    }

    if blocks.is_empty() {
        blocks.push(ContentBlock::Text {
            text: String::new(),
        });
    }

    Ok(Message {
        role: Role::Assistant,
        content: Some(MessageContent::Blocks(blocks)),
    })
}

/// Map a Gemini finish reason to our format
fn map_finish_reason(reason: Option<&str>) -> StopReason {
    match reason {
        Some("MAX_TOKENS") => StopReason::MaxTokens,
        Some("STOP") | None => StopReason::EndTurn,
        Some(other) => {
            debug!("Unmapped finish reason: {}", other);
            StopReason::EndTurn
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
