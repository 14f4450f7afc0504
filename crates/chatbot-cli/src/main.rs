//! Interactive chat client binary
//!
//! Connects to the tool/resource provider, pre-fetches its resources, and
//! drives a hosted model through the tool-call resolution loop from a stdin
//! REPL.

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

use chatbot_llm::providers::GeminiProvider;
use chatbot_mcp::HttpMcpClient;
use chatbot_utils::Settings;

mod repl;
mod resolver;
mod session;

#[cfg(test)]
mod testutil;

use resolver::ResolverConfig;
use session::ChatSession;

#[derive(Parser, Debug)]
#[command(name = "chatbot-cli")]
#[command(about = "Interactive chat client for chatbot-rs", long_about = None)]
struct Args {
    /// URL of the tool/resource provider endpoint
    ///
    /// Defaults to `MCP_SERVER_URL` from the environment when set.
    #[arg(long, default_value_t = Settings::from_env().mcp_server_url)]
    server_url: String,

    /// Model to drive
    #[arg(long, default_value = "gemini-2.0-flash")]
    model: String,

    /// Maximum model calls per query
    #[arg(long, default_value_t = 10)]
    max_rounds: usize,

    /// System prompt override
    #[arg(long)]
    system_prompt: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    chatbot_utils::init_tracing();

    let args = Args::parse();

    let provider = GeminiProvider::from_env()
        .context("set GOOGLE_API_KEY to the API key of the hosted model")?;

    let client = HttpMcpClient::new(&args.server_url, Duration::from_secs(30))?;

    let config = ResolverConfig {
        model: args.model,
        max_rounds: args.max_rounds,
        system_prompt: args.system_prompt,
        ..ResolverConfig::default()
    };

    let session = ChatSession::connect(Arc::new(client), Arc::new(provider), config).await?;

    // The connection is released even when the loop errors out
    let outcome = repl::run(&session).await;
    let closed = session.close().await;

    outcome.and(closed)
}
