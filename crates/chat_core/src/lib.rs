//! chat_core - Core types for the Verdi chat proxy
//!
//! This crate provides the foundational types used across all chat-related crates:
//! - `message` - ChatMessage, Role, content block types
//! - `config` - Environment-driven upstream configuration
//! - `error` - Shared error taxonomy for a chat exchange

pub mod config;
pub mod error;
pub mod message;

// Re-export commonly used types
pub use config::Config;
pub use error::{ChatError, Result};
pub use message::{ChatMessage, ContentPart, Role};
