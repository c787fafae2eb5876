//! Client-facing event-stream framing.
//!
//! The forward channel carries exactly three frame shapes:
//! ```text
//! data: {"delta": "<fragment>"}\n\n
//! data: [DONE]\n\n
//! data: {"error": "<message>"}\n\n
//! ```

use bytes::Bytes;
use serde_json::json;

pub fn delta_frame(text: &str) -> Bytes {
    Bytes::from(format!("data: {}\n\n", json!({ "delta": text })))
}

pub fn done_frame() -> Bytes {
    Bytes::from_static(b"data: [DONE]\n\n")
}

pub fn error_frame(message: &str) -> Bytes {
    Bytes::from(format!("data: {}\n\n", json!({ "error": message })))
}
