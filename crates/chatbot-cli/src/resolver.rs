//! Tool-call resolution loop
//!
//! Drives the model until it stops requesting tools:
//! 1. Send the conversation and the available tools to the model
//! 2. If the response carries tool calls, invoke each one in order through
//!    the provider connection and append the results as tool turns
//! 3. Loop back until the model answers with plain text
//!
//! A failed tool invocation appends its error as a tool turn and ends the
//! query; the model is not called again for it.

use anyhow::Context;
use async_trait::async_trait;
use chatbot_llm::{
    CompletionRequest, ContentBlock, LlmProvider, Message, StopReason, ToolDefinition,
};
use chatbot_mcp::McpClient;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Event handler for resolution events
///
/// Implement this trait to receive callbacks while a query resolves, for
/// incremental text output or tool progress display.
#[async_trait]
pub trait ResolverHandler: Send + Sync {
    /// Called with each text segment the model produces
    async fn on_text(&self, _text: &str) {}

    /// Called when a tool invocation starts
    async fn on_tool_start(&self, _id: &str, _name: &str, _input: &Value) {}

    /// Called when a tool invocation completes
    async fn on_tool_done(
        &self,
        _id: &str,
        _name: &str,
        _result: std::result::Result<&str, &str>,
        _duration_ms: u64,
    ) {
    }
}

/// No-op handler for when events are not needed
pub struct NoOpHandler;

#[async_trait]
impl ResolverHandler for NoOpHandler {}

/// Configuration for the resolution loop
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Model to use
    pub model: String,

    /// Maximum number of model calls per query (prevents infinite loops)
    pub max_rounds: usize,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// System prompt
    pub system_prompt: Option<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            max_rounds: 10,
            max_tokens: 2048,
            system_prompt: None,
        }
    }
}

/// What ended a round of tool execution
enum ToolOutcome {
    /// Every requested tool ran; results are in the conversation
    Completed,
    /// A tool failed; its error turn is in the conversation and the query
    /// is over
    Failed,
}

/// Resolves queries by looping between the model and the tool provider
pub struct ToolCallResolver {
    provider: Arc<dyn LlmProvider>,
    client: Arc<dyn McpClient>,
    config: ResolverConfig,
}

impl ToolCallResolver {
    /// Create a new resolver
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        client: Arc<dyn McpClient>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            provider,
            client,
            config,
        }
    }

    /// Resolve one query to its final text
    ///
    /// `messages` is the opening conversation (normally a single user turn);
    /// `tools` is advertised to the model on every round.
    pub async fn resolve(
        &self,
        messages: Vec<Message>,
        tools: &[ToolDefinition],
        handler: &dyn ResolverHandler,
    ) -> anyhow::Result<String> {
        let mut conversation = messages;
        let mut collected: Vec<String> = Vec::new();

        for round in 1..=self.config.max_rounds {
            info!(round, model = %self.config.model, "model call");

            let mut builder = CompletionRequest::builder(&self.config.model)
                .messages(conversation.clone())
                .max_tokens(self.config.max_tokens);

            if let Some(system) = &self.config.system_prompt {
                builder = builder.system(system.clone());
            }
            if !tools.is_empty() {
                builder = builder.tools(tools.to_vec());
            }

            let response = self
                .provider
                .complete(builder.build())
                .await
                .context("model call failed")?;

            debug!(
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "model response"
            );

            if let Some(text) = response.message.text() {
                if !text.is_empty() {
                    handler.on_text(text).await;
                    collected.push(text.to_string());
                }
            }

            conversation.push(response.message.clone());

            match response.stop_reason {
                StopReason::EndTurn => {
                    info!(round, "query resolved");
                    return Ok(collected.join("\n"));
                }

                StopReason::MaxTokens => {
                    warn!("model response truncated at the token limit");
                    return Ok(collected.join("\n"));
                }

                StopReason::ToolUse => {
                    match self
                        .execute_tools(&response.message, &mut conversation, handler)
                        .await
                    {
                        ToolOutcome::Completed => {}
                        ToolOutcome::Failed => return Ok(collected.join("\n")),
                    }
                }
            }
        }

        warn!(
            max_rounds = self.config.max_rounds,
            "round cap reached before the model stopped requesting tools"
        );
        Ok(collected.join("\n"))
    }

    /// Invoke the requested tools in order, appending a tool turn for each
    ///
    /// Stops at the first failure; remaining requests in the same response
    /// are skipped.
    async fn execute_tools(
        &self,
        message: &Message,
        conversation: &mut Vec<Message>,
        handler: &dyn ResolverHandler,
    ) -> ToolOutcome {
        let tool_uses = message.tool_uses();

        for (index, tool_use) in tool_uses.iter().enumerate() {
            let ContentBlock::ToolUse { id, name, input } = tool_use else {
                continue;
            };

            info!(tool = %name, id = %id, "invoking tool");
            handler.on_tool_start(id, name, input).await;

            let start = std::time::Instant::now();
            let outcome = match self.client.call_tool(name, input.clone()).await {
                Ok(result) if result.is_error == Some(true) => Err(result.joined_text()),
                Ok(result) => Ok(result.joined_text()),
                Err(e) => Err(e.to_string()),
            };
            let duration_ms = start.elapsed().as_millis() as u64;

            match outcome {
                Ok(text) => {
                    debug!(tool = %name, duration_ms, "tool succeeded");
                    handler.on_tool_done(id, name, Ok(&text), duration_ms).await;
                    conversation.push(Message::tool_result(id.clone(), name.clone(), text));
                }
                Err(error) => {
                    warn!(tool = %name, duration_ms, error = %error, "tool failed");
                    handler
                        .on_tool_done(id, name, Err(&error), duration_ms)
                        .await;
                    conversation.push(Message::tool_error(id.clone(), name.clone(), error));

                    let skipped = tool_uses.len() - index - 1;
                    if skipped > 0 {
                        warn!(skipped, "skipping remaining tool requests");
                    }
                    return ToolOutcome::Failed;
                }
            }
        }

        ToolOutcome::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeClient, FakeProvider, RecordingHandler};
    use serde_json::json;

    fn resolver(provider: Arc<FakeProvider>, client: Arc<FakeClient>) -> ToolCallResolver {
        ToolCallResolver::new(provider, client, ResolverConfig::default())
    }

    #[tokio::test]
    async fn test_plain_answer_passes_through() {
        let provider = Arc::new(FakeProvider::new(vec![FakeProvider::text_response(
            "The answer is 42.",
        )]));
        let client = Arc::new(FakeClient::new());

        let result = resolver(provider.clone(), client.clone())
            .resolve(vec![Message::user("question")], &[], &NoOpHandler)
            .await
            .unwrap();

        assert_eq!(result, "The answer is 42.");
        assert!(client.recorded_calls().is_empty());
        assert_eq!(provider.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_tools_run_in_request_order() {
        let provider = Arc::new(FakeProvider::new(vec![
            FakeProvider::tool_response(vec![
                ("call_add", "add", json!({"a": 4, "b": 5})),
                ("call_multiply", "multiply", json!({"a": 9, "b": 2})),
            ]),
            FakeProvider::text_response("18"),
        ]));
        let client = Arc::new(FakeClient::new().with_tool("add", "9").with_tool("multiply", "18"));

        let result = resolver(provider.clone(), client.clone())
            .resolve(vec![Message::user("compute")], &[], &NoOpHandler)
            .await
            .unwrap();

        assert_eq!(result, "18");
        let calls = client.recorded_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "add");
        assert_eq!(calls[1].0, "multiply");

        // Second model call sees both tool-result turns
        let requests = provider.recorded_requests();
        assert_eq!(requests.len(), 2);
        let tool_turns = requests[1]
            .messages
            .iter()
            .filter(|m| m.role == chatbot_llm::Role::Tool)
            .count();
        assert_eq!(tool_turns, 2);
    }

    #[tokio::test]
    async fn test_tool_failure_ends_the_query() {
        let provider = Arc::new(FakeProvider::new(vec![
        FakeProvider::tool_response(vec![
                ("call_multiply", "multiply", json!({"a": 1, "b": 2})),
                ("call_add", "add", json!({"a": 3, "b": 4})),
            ]),
            FakeProvider::text_response("never reached"),
        ]));
        let client = Arc::new(
            FakeClient::new()
                .with_failing_tool("multiply", "Error in multiplication")
                .with_tool("add", "7"),
        );

        let result = resolver(provider.clone(), client.clone())
            .resolve(vec![Message::user("compute")], &[], &NoOpHandler)
            .await
            .unwrap();

        // No text was produced before the failure
        assert_eq!(result, "");

        // The failing tool ran, the one after it did not, and the model was
        // not called again
        assert_eq!(client.recorded_calls().len(), 1);
        assert_eq!(provider.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_forwarded_and_its_rejection_ends_the_query() {
        // The resolver does not pre-screen tool names; the provider's
        // rejection comes back as the error turn
        let provider = Arc::new(FakeProvider::new(vec![
            FakeProvider::tool_response(vec![("call_divide", "divide", json!({"a": 1, "b": 2}))]),
            FakeProvider::text_response("never reached"),
        ]));
        let client = Arc::new(FakeClient::new());
        let handler = RecordingHandler::default();

        let result = resolver(provider.clone(), client.clone())
            .resolve(vec![Message::user("divide these")], &[], &handler)
            .await
            .unwrap();

        assert_eq!(result, "");
        assert_eq!(client.recorded_calls().len(), 1);
        assert_eq!(client.recorded_calls()[0].0, "divide");
        assert_eq!(provider.recorded_requests().len(), 1);
        assert_eq!(
            handler.events(),
            vec!["start:divide".to_string(), "done:divide:err".to_string()]
        );
    }

    #[tokio::test]
    async fn test_round_cap_stops_a_looping_model() {
        let responses: Vec<_> = (0..20)
            .map(|_| {
                FakeProvider::tool_response(vec![("call_add", "add", json!({"a": 1, "b": 1}))])
            })
            .collect();
        let provider = Arc::new(FakeProvider::new(responses));
        let client = Arc::new(FakeClient::new().with_tool("add", "2"));

        let config = ResolverConfig {
            max_rounds: 3,
            ..ResolverConfig::default()
        };
        let result = ToolCallResolver::new(provider.clone(), client, config)
            .resolve(vec![Message::user("loop")], &[], &NoOpHandler)
            .await
            .unwrap();

        assert_eq!(result, "");
        assert_eq!(provider.recorded_requests().len(), 3);
    }

    #[tokio::test]
    async fn test_handler_receives_events() {
        let provider = Arc::new(FakeProvider::new(vec![
            FakeProvider::tool_response(vec![("call_add", "add", json!({"a": 4, "b": 5}))]),
            FakeProvider::text_response("9"),
        ]));
        let client = Arc::new(FakeClient::new().with_tool("add", "9"));
        let handler = RecordingHandler::default();

        resolver(provider, client)
            .resolve(vec![Message::user("add")], &[], &handler)
            .await
            .unwrap();

        let events = handler.events();
        assert_eq!(
            events,
            vec![
                "start:add".to_string(),
                "done:add:ok".to_string(),
                "text:9".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_tools_advertised_every_round() {
        let provider = Arc::new(FakeProvider::new(vec![
            FakeProvider::tool_response(vec![("call_add", "add", json!({"a": 1, "b": 2}))]),
            FakeProvider::text_response("3"),
        ]));
        let client = Arc::new(FakeClient::new().with_tool("add", "3"));

        let tools = vec![ToolDefinition::new(
            "add",
            "Add two integers",
            json!({"type": "object"}),
        )];

        resolver(provider.clone(), client)
            .resolve(vec![Message::user("add")], &tools, &NoOpHandler)
            .await
            .unwrap();

        for request in provider.recorded_requests() {
            assert_eq!(request.tools.as_deref(), Some(tools.as_slice()));
        }
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let provider = Arc::new(FakeProvider::new(vec![]));
        let client = Arc::new(FakeClient::new());

        let result = resolver(provider, client)
            .resolve(vec![Message::user("question")], &[], &NoOpHandler)
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_text_before_tool_calls_is_kept() {
        let provider = Arc::new(FakeProvider::new(vec![
            FakeProvider::text_and_tool_response(
                "Let me check.",
                vec![("call_add", "add", json!({"a": 1, "b": 1}))],
            ),
            FakeProvider::text_response("It is 2."),
        ]));
        let client = Arc::new(FakeClient::new().with_tool("add", "2"));

        let result = resolver(provider, client)
            .resolve(vec![Message::user("add")], &[], &NoOpHandler)
            .await
            .unwrap();

        assert_eq!(result, "Let me check.\nIt is 2.");
    }
}
