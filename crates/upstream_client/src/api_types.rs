//! Wire types for the upstream Messages API.
//!
//! Only the request side is typed; the response payload stays a
//! [`serde_json::Value`] so the persona filter can rewrite every string
//! field without knowing the schema.

use chat_core::ChatMessage;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub stream: bool,
    pub system: String,
    pub messages: Vec<ChatMessage>,
}

/// Per-request overrides supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
}

/// Concatenate the text blocks of a complete response payload.
pub fn extract_text_content(payload: &Value) -> String {
    payload["content"]
        .as_array()
        .map(|blocks| {
            blocks
                .iter()
                .filter(|b| b["type"] == "text")
                .filter_map(|b| b["text"].as_str())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let request = MessagesRequest {
            model: "m".to_string(),
            max_tokens: 256,
            stream: false,
            system: "sys".to_string(),
            messages: vec![ChatMessage::user("hi")],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"][0]["type"], "text");
    }

    #[test]
    fn test_extract_text_content_joins_blocks() {
        let payload = json!({
            "content": [
                {"type": "text", "text": "Hi "},
                {"type": "tool_use", "id": "x"},
                {"type": "text", "text": "there!"}
            ]
        });
        assert_eq!(extract_text_content(&payload), "Hi there!");
    }

    #[test]
    fn test_extract_text_content_missing_content() {
        assert_eq!(extract_text_content(&json!({})), "");
    }
}
