//! Request and response DTOs for the HTTP surface.

use chat_core::ChatMessage;
use serde::{Deserialize, Serialize};
use upstream_client::RequestOptions;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequestBody {
    pub text: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl SendMessageRequestBody {
    pub fn options(&self) -> RequestOptions {
        RequestOptions {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub session_id: String,
    pub reply: String,
    /// True when an admin bypass skipped the persona filter.
    pub bypassed: bool,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ClearSessionResponse {
    pub session_id: String,
    pub cleared: bool,
}
