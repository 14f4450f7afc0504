//! Tool/resource provider binary
//!
//! Exposes the `add` and `multiply` tools and the `api://total_profit`
//! resource over JSON-RPC 2.0 at `POST /mcp`.

use axum::{Router, routing::post};
use chatbot_utils::Settings;
use clap::Parser;
use tracing::info;

mod resources;
mod server;
mod tools;

use server::ProviderState;

#[derive(Parser, Debug)]
#[command(name = "chatbot-provider")]
#[command(about = "Tool/resource provider for chatbot-rs", long_about = None)]
struct Args {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: String,

    /// Base URL of the numeric service backing the profit resource
    ///
    /// Defaults to `BACKEND_URL` from the environment when set.
    #[arg(long, default_value_t = Settings::from_env().backend_url)]
    backend_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    chatbot_utils::init_tracing();

    let args = Args::parse();

    let state = ProviderState::new(args.backend_url)?;
    let app = Router::new()
        .route("/mcp", post(server::rpc_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    info!("chatbot-provider listening on {}", args.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
