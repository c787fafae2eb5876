//! Context-window shaping for the upstream request.
//!
//! Every user turn except the final one is rewrapped with a prefix marking
//! it as background the model should not answer again. Assistant turns pass
//! through unchanged regardless of position, as does the final message.

use chat_core::{ChatMessage, Role};

const BACKGROUND_PREFIX: &str = "(Earlier message, no response needed) ";

pub fn shape_for_upstream(history: &[ChatMessage]) -> Vec<ChatMessage> {
    let last = history.len().saturating_sub(1);
    history
        .iter()
        .enumerate()
        .map(|(idx, message)| {
            if idx < last && message.role == Role::User {
                ChatMessage::user(format!("{BACKGROUND_PREFIX}{}", message.joined_text()))
            } else {
                message.clone()
            }
        })
        .collect()
}
