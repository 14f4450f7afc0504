//! LLM provider abstraction for chatbot-rs
//!
//! This crate provides provider-agnostic types for driving a hosted
//! chat-completion model with tool calling:
//!
//! - Conversation message types (user, assistant, tool-result turns)
//! - Completion request/response types
//! - Tool definitions for function calling
//! - Canonical tool-call normalization
//! - The Gemini provider implementation (behind the `gemini` feature)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod toolcall;
pub mod tools;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LlmError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role};
pub use provider::LlmProvider;
pub use toolcall::ToolCall;
pub use tools::ToolDefinition;

// Provider implementations (feature-gated)
#[cfg(feature = "gemini")]
pub mod providers;
