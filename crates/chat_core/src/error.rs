//! Shared error taxonomy for a chat exchange.
//!
//! Per-frame stream decode problems are not represented here: a malformed
//! frame is skipped and logged inside the relay, never surfaced. Everything
//! that prevents completing the overall exchange maps to one of these.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    /// Missing or empty user input. Rejected before any upstream call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing upstream credentials or misconfiguration. Fatal for the request.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Blocking call exceeded its bound. Surfaced distinctly so callers can
    /// offer a retry affordance.
    #[error("Upstream request timed out")]
    Timeout,

    /// Upstream rejected or failed the request.
    #[error("Upstream error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    /// The stream connection could not be established. Failures after bytes
    /// start flowing stay in-band as stream error events instead.
    #[error("Stream transport error: {0}")]
    StreamTransport(String),
}

impl ChatError {
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
