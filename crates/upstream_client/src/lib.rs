//! upstream_client - Upstream model API client and stream relay
//!
//! Two halves:
//! - `client` - sends chat completion requests (blocking or streaming) to
//!   the upstream Messages API with the fixed persona system prompt
//! - `relay` - decodes the upstream `data:` framed byte stream into a
//!   normalized [`StreamEvent`] sequence

pub mod api_types;
pub mod client;
pub mod relay;

pub use api_types::{extract_text_content, MessagesRequest, RequestOptions};
pub use client::{EventStream, UpstreamClient, SYSTEM_PROMPT};
pub use relay::{RelayDecoder, StreamEvent};
