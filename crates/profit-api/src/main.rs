//! Numeric service binary
//!
//! Serves the profit computation endpoints consumed by the tool/resource
//! provider's `api://total_profit` resource.

use clap::Parser;
use tracing::info;

mod routes;

#[derive(Parser, Debug)]
#[command(name = "profit-api")]
#[command(about = "Numeric service for chatbot-rs", long_about = None)]
struct Args {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0:8000")]
    bind: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    chatbot_utils::init_tracing();

    let args = Args::parse();

    let app = routes::router();

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    info!("profit-api listening on {}", args.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
