//! Chat exchange orchestration.
//!
//! One service instance handles one inbound request: validate, append the
//! user turn, shape history, call upstream, filter, persist. In streaming
//! mode the assistant turn is persisted only when the upstream stream
//! completes; a cancelled or failed stream leaves no partial turn behind.

use std::sync::Arc;

use async_stream::stream;
use bytes::Bytes;
use chat_core::{ChatError, Role};
use conversation_store::{shape_for_upstream, ConversationStore};
use futures::Stream;
use futures_util::StreamExt;
use log::{debug, info};
use persona_filter::PersonaFilter;
use serde_json::Value;
use upstream_client::{extract_text_content, StreamEvent, UpstreamClient};

use crate::error::Result;
use crate::models::{SendMessageRequestBody, SendMessageResponse};
use crate::sse;

pub struct ChatService {
    store: Arc<ConversationStore>,
    upstream: Option<Arc<UpstreamClient>>,
    filter: Arc<PersonaFilter>,
    admin_bypass: bool,
}

impl ChatService {
    pub fn new(
        store: Arc<ConversationStore>,
        upstream: Option<Arc<UpstreamClient>>,
        filter: Arc<PersonaFilter>,
        admin_bypass: bool,
    ) -> Self {
        Self {
            store,
            upstream,
            filter,
            admin_bypass,
        }
    }

    fn upstream(&self) -> Result<Arc<UpstreamClient>> {
        self.upstream.clone().ok_or_else(|| {
            ChatError::Configuration("upstream API key is not set".to_string()).into()
        })
    }

    fn validated_text(body: &SendMessageRequestBody) -> Result<&str> {
        let text = body.text.trim();
        if text.is_empty() {
            return Err(ChatError::Validation("message text must not be empty".to_string()).into());
        }
        Ok(text)
    }

    /// Blocking exchange: full upstream payload, deep-rewritten, persisted.
    pub async fn process_message(
        &self,
        session_id: &str,
        body: &SendMessageRequestBody,
    ) -> Result<SendMessageResponse> {
        let text = Self::validated_text(body)?;
        let upstream = self.upstream()?;

        self.store.append_text(session_id, Role::User, text);
        let shaped = shape_for_upstream(&self.store.get(session_id));

        let payload = upstream.complete(&shaped, &body.options()).await?;
        let outcome = self.filter.apply(payload, self.admin_bypass);
        let reply = extract_text_content(&outcome.value);

        self.store.append_text(session_id, Role::Assistant, &reply);
        info!(
            "Session {}: exchange complete, {} turns retained",
            session_id,
            self.store.len(session_id)
        );

        Ok(SendMessageResponse {
            session_id: session_id.to_string(),
            reply,
            bypassed: outcome.bypassed,
        })
    }

    /// Streaming exchange: deltas forwarded one at a time as they decode;
    /// the accumulated text is filtered and persisted only on `Done`.
    pub async fn process_message_stream(
        &self,
        session_id: &str,
        body: &SendMessageRequestBody,
    ) -> Result<impl Stream<Item = std::result::Result<Bytes, actix_web::Error>>> {
        let text = Self::validated_text(body)?;
        let upstream = self.upstream()?;

        self.store.append_text(session_id, Role::User, text);
        let shaped = shape_for_upstream(&self.store.get(session_id));

        let mut events = upstream.stream(&shaped, &body.options()).await?;

        let store = Arc::clone(&self.store);
        let filter = Arc::clone(&self.filter);
        let admin_bypass = self.admin_bypass;
        let session_id = session_id.to_string();

        Ok(stream! {
            let mut accumulated = String::new();
            while let Some(event) = events.next().await {
                match event {
                    StreamEvent::Delta(fragment) => {
                        accumulated.push_str(&fragment);
                        yield Ok(sse::delta_frame(&fragment));
                    }
                    StreamEvent::Done => {
                        let outcome = filter
                            .apply(Value::String(std::mem::take(&mut accumulated)), admin_bypass);
                        let reply = match outcome.value {
                            Value::String(s) => s,
                            _ => String::new(),
                        };
                        if !reply.is_empty() {
                            store.append_text(&session_id, Role::Assistant, reply);
                        }
                        debug!("Session {}: stream complete", session_id);
                        yield Ok(sse::done_frame());
                    }
                    StreamEvent::Error(message) => {
                        // Failed stream: discard the partial turn.
                        yield Ok(sse::error_frame(&message));
                    }
                }
            }
        })
    }
}
