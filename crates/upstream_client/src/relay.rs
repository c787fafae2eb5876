//! Stream relay: decodes newline-delimited `data: <json>` frames from the
//! upstream byte stream into a clean [`StreamEvent`] sequence.
//!
//! The decoder is tolerant of records split anywhere across network chunks:
//! bytes accumulate in a fragment buffer, complete lines are processed as
//! they appear, and the trailing fragment waits for the next chunk. One
//! malformed frame is skipped and logged, never fatal. Exactly one terminal
//! event (`Done` or `Error`) ends every stream.

use log::{debug, error, warn};
use serde_json::Value;

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// One event on the relay's outbound side. Zero or more `Delta`s followed by
/// exactly one terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Delta(String),
    Done,
    Error(String),
}

impl StreamEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamEvent::Delta(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RelayState {
    Streaming,
    Closed,
    Failed,
}

/// Incremental line-buffered decoder. Holds only the current line fragment
/// and the accumulated full text; no frame history.
pub struct RelayDecoder {
    fragment: Vec<u8>,
    full_text: String,
    state: RelayState,
}

impl Default for RelayDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayDecoder {
    pub fn new() -> Self {
        Self {
            fragment: Vec::new(),
            full_text: String::new(),
            state: RelayState::Streaming,
        }
    }

    /// All delta text seen so far, in arrival order.
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// True once a terminal event has been emitted.
    pub fn is_terminal(&self) -> bool {
        self.state != RelayState::Streaming
    }

    /// Feed one network chunk; returns the events decoded from every line
    /// completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        if self.is_terminal() {
            return Vec::new();
        }
        self.fragment.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(newline) = self.fragment.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.fragment.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line);
            events.extend(self.process_line(line.trim()));
            if self.is_terminal() {
                break;
            }
        }
        events
    }

    /// Upstream end-of-input. A non-empty trailing fragment gets one final
    /// parse attempt first: upstream may omit the terminator on the last
    /// frame. Emits `Done` unless a terminal event was already produced.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        if self.is_terminal() {
            return Vec::new();
        }
        let mut events = Vec::new();
        if !self.fragment.is_empty() {
            let leftover = std::mem::take(&mut self.fragment);
            let line = String::from_utf8_lossy(&leftover);
            events.extend(self.process_line(line.trim()));
        }
        if !self.is_terminal() {
            self.state = RelayState::Closed;
            events.push(StreamEvent::Done);
        }
        events
    }

    /// Upstream transport failure. Emits `Error` and stops the stream; no
    /// further events follow.
    pub fn fail(&mut self, message: impl Into<String>) -> Vec<StreamEvent> {
        if self.is_terminal() {
            return Vec::new();
        }
        self.state = RelayState::Failed;
        let message = message.into();
        error!("Stream transport failed: {}", message);
        vec![StreamEvent::Error(message)]
    }

    fn process_line(&mut self, line: &str) -> Vec<StreamEvent> {
        if line.is_empty() {
            return Vec::new();
        }
        let Some(body) = line.strip_prefix(DATA_PREFIX) else {
            // Event-name and comment lines carry no payload for us.
            return Vec::new();
        };

        if body == DONE_SENTINEL {
            // Incidental verification only; the deltas already delivered are
            // authoritative even when this parse fails.
            match serde_json::from_str::<Value>(&self.full_text) {
                Ok(_) => debug!("Final accumulated payload parsed cleanly"),
                Err(e) => debug!("Final accumulated payload is not JSON ({}), ignoring", e),
            }
            self.state = RelayState::Closed;
            return vec![StreamEvent::Done];
        }

        match serde_json::from_str::<Value>(body) {
            Ok(frame) => match frame["delta"]["text"].as_str() {
                Some(text) if !text.is_empty() => {
                    self.full_text.push_str(text);
                    vec![StreamEvent::Delta(text.to_string())]
                }
                _ => Vec::new(),
            },
            Err(e) => {
                warn!("Skipping malformed stream frame: {}, data: {}", e, body);
                Vec::new()
            }
        }
    }
}
