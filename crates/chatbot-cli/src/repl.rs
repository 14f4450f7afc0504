//! Interactive query loop
//!
//! Reads queries from stdin until the user quits. Answers stream through a
//! printing handler; a failed model call reports the error and returns to
//! the prompt with the session intact.

use async_trait::async_trait;
use serde_json::Value;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;

use crate::resolver::ResolverHandler;
use crate::session::ChatSession;

/// Handler that prints resolution progress to stdout
struct PrintHandler;

#[async_trait]
impl ResolverHandler for PrintHandler {
    async fn on_text(&self, text: &str) {
        println!("{text}");
    }

    async fn on_tool_start(&self, _id: &str, name: &str, input: &Value) {
        println!("[calling {name} with {input}]");
    }

    async fn on_tool_done(
        &self,
        _id: &str,
        name: &str,
        result: std::result::Result<&str, &str>,
        _duration_ms: u64,
    ) {
        if let Err(e) = result {
            println!("[{name} failed: {e}]");
        }
    }
}

/// One line of user input, classified
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Quit,
    Empty,
    Query(String),
}

/// Classify a raw input line
///
/// `quit` and `exit` are case-insensitive; surrounding whitespace is
/// ignored everywhere.
fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Empty;
    }
    if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
        return Input::Quit;
    }
    Input::Query(trimmed.to_string())
}

/// Run the interactive loop until the user quits or stdin closes
pub async fn run(session: &ChatSession) -> anyhow::Result<()> {
    let server = session
        .server_name()
        .await
        .unwrap_or_else(|| "unknown".to_string());

    println!("Connected to {server}");
    println!("Available tools: {}", session.tool_names().join(", "));
    println!("Type a query, or 'quit' to leave.");
    println!("{}", "=".repeat(50));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("\nQuery: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            // stdin closed
            break;
        };

        match parse_input(&line) {
            Input::Empty => {}
            Input::Quit => {
                println!("Goodbye!");
                break;
            }
            Input::Query(query) => {
                if let Err(e) = session.ask(&query, &PrintHandler).await {
                    error!("query failed: {e:#}");
                    println!("Something went wrong: {e:#}");
                }
            }
        }
    }

    Ok(())
}
