//! Chat session lifecycle
//!
//! A [`ChatSession`] owns the provider connection for the lifetime of the
//! chat: it connects, pulls the tool list, pre-fetches every advertised
//! resource into a read-only cache, answers queries through the resolution
//! loop, and releases the connection on close.

use anyhow::Context;
use chatbot_llm::{LlmProvider, Message, ToolDefinition};
use chatbot_mcp::{McpClient, uri};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::resolver::{ResolverConfig, ResolverHandler, ToolCallResolver};

/// An active chat session against one tool/resource provider
pub struct ChatSession {
    client: Arc<dyn McpClient>,
    resolver: ToolCallResolver,
    tools: Vec<ToolDefinition>,

    /// Resource text cached at connect time, keyed by URI
    ///
    /// BTreeMap keeps context blocks in URI order across runs.
    resource_context: BTreeMap<String, String>,
}

impl ChatSession {
    /// Connect to the provider and prepare the session
    ///
    /// Lists the available tools and reads every advertised resource into
    /// the context cache. A resource that fails to read is logged and
    /// skipped; the session still comes up.
    pub async fn connect(
        client: Arc<dyn McpClient>,
        provider: Arc<dyn LlmProvider>,
        config: ResolverConfig,
    ) -> anyhow::Result<Self> {
        client
            .connect()
            .await
            .context("failed to connect to the tool provider")?;

        let tools: Vec<ToolDefinition> = client
            .list_tools()
            .await
            .context("failed to list tools")?
            .into_iter()
            .map(|tool| {
                ToolDefinition::new(
                    tool.name,
                    tool.description.unwrap_or_default(),
                    tool.input_schema,
                )
            })
            .collect();

        let resource_context = Self::prefetch_resources(client.as_ref()).await;

        info!(
            tools = tools.len(),
            resources = resource_context.len(),
            "session ready"
        );

        let resolver = ToolCallResolver::new(provider, Arc::clone(&client), config);

        Ok(Self {
            client,
            resolver,
            tools,
            resource_context,
        })
    }

    /// Read every advertised resource once
    async fn prefetch_resources(client: &dyn McpClient) -> BTreeMap<String, String> {
        let mut cache = BTreeMap::new();

        let resources = match client.list_resources().await {
            Ok(resources) => resources,
            Err(e) => {
                warn!("failed to list resources, continuing without context: {e}");
                return cache;
            }
        };

        for resource in resources {
            match client.read_resource(&resource.uri).await {
                Ok(content) => match content.text {
                    Some(text) => {
                        cache.insert(resource.uri, text);
                    }
                    None => warn!(uri = %resource.uri, "resource has no text content, skipped"),
                },
                Err(e) => warn!(uri = %resource.uri, "resource read failed, skipped: {e}"),
            }
        }

        cache
    }

    /// Names of the tools the provider advertises
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    /// Name of the connected server, if initialization reported one
    pub async fn server_name(&self) -> Option<String> {
        self.client.server_info().await.map(|info| info.name)
    }

    /// Render a query with the cached resource context appended
    ///
    /// Each cached resource becomes one labeled block after the query text,
    /// in URI order. With an empty cache the query passes through unchanged.
    pub fn compose_query(&self, query: &str) -> String {
        if self.resource_context.is_empty() {
            return query.to_string();
        }

        let mut composed = String::from(query);
        for (resource_uri, text) in &self.resource_context {
            composed.push_str("\n\n[");
            composed.push_str(&uri::short_name(resource_uri));
            composed.push_str("]\n");
            composed.push_str(text);
        }
        composed
    }

    /// Answer one query through the resolution loop
    pub async fn ask(&self, query: &str, handler: &dyn ResolverHandler) -> anyhow::Result<String> {
        let messages = vec![Message::user(self.compose_query(query))];
        self.resolver.resolve(messages, &self.tools, handler).await
    }

    /// Release the provider connection
    pub async fn close(&self) -> anyhow::Result<()> {
        self.client
            .disconnect()
            .await
            .context("failed to disconnect")?;
        info!("session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::NoOpHandler;
    use crate::testutil::{FakeClient, FakeProvider};
    use serde_json::json;

    async fn session(client: Arc<FakeClient>, provider: Arc<FakeProvider>) -> ChatSession {
        ChatSession::connect(client, provider, ResolverConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_connect_builds_tool_list() {
        let client = Arc::new(FakeClient::new().with_tool("add", "9").with_tool("multiply", "18"));
        let provider = Arc::new(FakeProvider::new(vec![]));

        let session = session(client.clone(), provider).await;

        assert_eq!(session.tool_names(), vec!["add", "multiply"]);
        assert!(client.is_connected());
    }

    #[tokio::test]
    async fn test_compose_query_without_resources() {
        let client = Arc::new(FakeClient::new());
        let provider = Arc::new(FakeProvider::new(vec![]));

        let session = session(client, provider).await;

        assert_eq!(session.compose_query("hello"), "hello");
    }

    #[tokio::test]
    async fn test_compose_query_renders_labeled_blocks_in_uri_order() {
        let client = Arc::new(
            FakeClient::new()
                .with_resource("api://total_profit", r#"{"message": 25000}"#)
                .with_resource("api://balance", r#"{"balance": 10}"#),
        );
        let provider = Arc::new(FakeProvider::new(vec![]));

        let session = session(client, provider).await;
        let composed = session.compose_query("How much profit?");

        assert_eq!(
            composed,
            "How much profit?\n\n[balance]\n{\"balance\": 10}\n\n[total_profit]\n{\"message\": 25000}"
        );
    }

    #[tokio::test]
    async fn test_failed_resource_read_is_skipped() {
        let client = Arc::new(
            FakeClient::new()
                .with_resource("api://total_profit", r#"{"message": 25000}"#)
                .with_failing_resource("api://broken"),
        );
        let provider = Arc::new(FakeProvider::new(vec![]));

        let session = session(client, provider).await;
        let composed = session.compose_query("q");

        assert!(composed.contains("[total_profit]"));
        assert!(!composed.contains("broken"));
    }

    #[tokio::test]
    async fn test_ask_injects_context_into_the_first_turn() {
        let client = Arc::new(
            FakeClient::new().with_resource("api://total_profit", r#"{"message": 25000}"#),
        );
        let provider = Arc::new(FakeProvider::new(vec![FakeProvider::text_response(
            "25000",
        )]));

        let session = session(client, provider.clone()).await;
        let answer = session.ask("total profit?", &NoOpHandler).await.unwrap();

        assert_eq!(answer, "25000");
        let requests = provider.recorded_requests();
        let first_turn = requests[0].messages[0].text().unwrap_or_default().to_string();
        assert!(first_turn.starts_with("total profit?"));
        assert!(first_turn.contains("[total_profit]"));
    }

    #[tokio::test]
    async fn test_tool_definitions_reach_the_model() {
        let client = Arc::new(FakeClient::new().with_tool("add", "9"));
        let provider = Arc::new(FakeProvider::new(vec![FakeProvider::text_response("ok")]));

        let session = session(client, provider.clone()).await;
        session.ask("q", &NoOpHandler).await.unwrap();

        let requests = provider.recorded_requests();
        let tools = requests[0].tools.as_deref().unwrap_or(&[]).to_vec();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "add");
        assert_eq!(tools[0].input_schema, json!({"type": "object"}));
    }

    #[tokio::test]
    async fn test_close_releases_the_connection() {
        let client = Arc::new(FakeClient::new());
        let provider = Arc::new(FakeProvider::new(vec![]));

        let session = session(client.clone(), provider).await;
        session.close().await.unwrap();

        assert!(!client.is_connected());
    }
}
