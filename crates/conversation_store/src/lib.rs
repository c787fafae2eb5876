//! conversation_store - Bounded per-session conversation history
//!
//! In-memory message history keyed by an opaque session id. Each session
//! keeps the most recent [`MAX_HISTORY`] turns; older turns are evicted
//! front-first on append. Sessions are sharded through a [`DashMap`] so
//! requests for different sessions never block each other, while each
//! append's read-modify-truncate sequence is atomic under its shard lock.

mod shaping;

pub use shaping::shape_for_upstream;

use chat_core::{ChatMessage, ContentPart, Role};
use dashmap::DashMap;
use log::debug;

/// Maximum retained turns per session.
pub const MAX_HISTORY: usize = 20;

#[derive(Default)]
pub struct ConversationStore {
    sessions: DashMap<String, Vec<ChatMessage>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one turn, creating the session on first use and truncating to
    /// the last [`MAX_HISTORY`] entries.
    pub fn append(&self, session_id: &str, message: ChatMessage) {
        let mut entry = self.sessions.entry(session_id.to_string()).or_default();
        entry.push(message);
        let overflow = entry.len().saturating_sub(MAX_HISTORY);
        if overflow > 0 {
            entry.drain(..overflow);
            debug!(
                "Session {} truncated to {} most recent turns",
                session_id, MAX_HISTORY
            );
        }
    }

    /// Append a plain-string turn, wrapping it into a single text block.
    pub fn append_text(&self, session_id: &str, role: Role, text: impl Into<String>) {
        self.append(session_id, ChatMessage::text(role, text));
    }

    /// Append a structured turn.
    pub fn append_blocks(&self, session_id: &str, role: Role, content: Vec<ContentPart>) {
        self.append(session_id, ChatMessage { role, content });
    }

    /// Stored history in insertion order; empty for unknown sessions.
    pub fn get(&self, session_id: &str) -> Vec<ChatMessage> {
        self.sessions
            .get(session_id)
            .map(|entry| entry.clone())
            .unwrap_or_default()
    }

    pub fn len(&self, session_id: &str) -> usize {
        self.sessions
            .get(session_id)
            .map(|entry| entry.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, session_id: &str) -> bool {
        self.len(session_id) == 0
    }

    /// Drop a session's history entirely. Clearing an unknown session is a
    /// no-op, not an error.
    pub fn clear(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    /// Ids of all sessions that currently hold history.
    pub fn sessions(&self) -> Vec<String> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }
}
