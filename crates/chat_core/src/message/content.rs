//! ContentPart - Message content blocks
//!
//! Matches the upstream Messages API block shape: a tagged union keyed on
//! `type`, of which this proxy only carries text.

use serde::{Deserialize, Serialize};

/// A block of message content.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Text content
    Text { text: String },
}

impl ContentPart {
    /// Create a text content block
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Get text content if this is a text block
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
        }
    }
}
