//! Shared utilities for chatbot-rs
//!
//! Common functionality used across the workspace: logging setup and
//! environment-backed settings.

pub mod config;
pub mod logging;

pub use config::Settings;
pub use logging::init_tracing;
