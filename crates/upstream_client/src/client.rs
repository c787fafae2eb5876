//! Upstream Messages API client.
//!
//! Blocking completions are bounded at 30 seconds wall clock. Streaming
//! completions are bounded by 120 seconds of inactivity between chunks; a
//! single longer gap fails the stream rather than being silently recovered.

use std::pin::Pin;
use std::time::Duration;

use async_stream::stream;
use chat_core::{ChatError, ChatMessage, Config, Result};
use futures::Stream;
use futures_util::StreamExt;
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;

use crate::api_types::{MessagesRequest, RequestOptions};
use crate::relay::{RelayDecoder, StreamEvent};

const BLOCKING_TIMEOUT: Duration = Duration::from_secs(30);
const STREAM_IDLE_TIMEOUT: Duration = Duration::from_secs(120);
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Fixed system instruction enforcing the assistant persona.
pub const SYSTEM_PROMPT: &str = "You are Verdi, a friendly and capable AI assistant. \
Always identify yourself as Verdi. Never state or imply which company built you or \
which underlying model powers you, and politely decline questions about your provider. \
Messages prefixed with \"(Earlier message, no response needed)\" are background context \
from earlier in the conversation; do not answer them again, respond only to the final \
message. Format answers in Markdown and keep them concise.";

/// Lazy, single-consumption event sequence for a streaming exchange.
pub type EventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

#[derive(Debug)]
pub struct UpstreamClient {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
    max_tokens: u32,
    idle_timeout: Duration,
}

impl UpstreamClient {
    /// Build a client from configuration. Fails with a configuration error
    /// before any network I/O when the API key is missing.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| ChatError::Configuration("upstream API key is not set".to_string()))?;
        Ok(Self {
            client: Client::new(),
            api_key,
            api_base: config.api_base.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            idle_timeout: STREAM_IDLE_TIMEOUT,
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Override the streaming inactivity bound.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| ChatError::Configuration(format!("Invalid API key: {e}")))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn build_request(
        &self,
        history: &[ChatMessage],
        options: &RequestOptions,
        stream: bool,
    ) -> MessagesRequest {
        MessagesRequest {
            model: options.model.clone().unwrap_or_else(|| self.model.clone()),
            max_tokens: options.max_tokens.unwrap_or(self.max_tokens),
            stream,
            system: SYSTEM_PROMPT.to_string(),
            messages: history.to_vec(),
        }
    }

    /// Blocking completion: one request, full payload back.
    pub async fn complete(
        &self,
        history: &[ChatMessage],
        options: &RequestOptions,
    ) -> Result<Value> {
        let body = self.build_request(history, options, false);
        debug!(
            "Sending blocking completion: model={}, {} messages",
            body.model,
            body.messages.len()
        );

        let response = self
            .client
            .post(format!("{}/messages", self.api_base))
            .headers(self.build_headers()?)
            .timeout(BLOCKING_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ChatError::upstream(Some(status.as_u16()), text));
        }

        response
            .json::<Value>()
            .await
            .map_err(map_transport_error)
    }

    /// Streaming completion: a lazy event sequence decoded by the relay.
    /// Consuming the stream drives the network read; dropping it releases
    /// the underlying transport.
    pub async fn stream(
        &self,
        history: &[ChatMessage],
        options: &RequestOptions,
    ) -> Result<EventStream> {
        let body = self.build_request(history, options, true);
        info!(
            "Opening completion stream: model={}, {} messages",
            body.model,
            body.messages.len()
        );

        let response = self
            .client
            .post(format!("{}/messages", self.api_base))
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatError::Timeout
                } else {
                    ChatError::StreamTransport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ChatError::upstream(Some(status.as_u16()), text));
        }

        let idle_timeout = self.idle_timeout;
        let mut bytes = response.bytes_stream();
        let events = stream! {
            let mut decoder = RelayDecoder::new();
            loop {
                let next = tokio::time::timeout(idle_timeout, bytes.next()).await;
                match next {
                    Err(_) => {
                        for event in decoder.fail(format!(
                            "no upstream data for {:?}",
                            idle_timeout
                        )) {
                            yield event;
                        }
                        return;
                    }
                    Ok(Some(Ok(chunk))) => {
                        for event in decoder.feed(&chunk) {
                            let terminal = event.is_terminal();
                            yield event;
                            if terminal {
                                return;
                            }
                        }
                    }
                    Ok(Some(Err(e))) => {
                        for event in decoder.fail(e.to_string()) {
                            yield event;
                        }
                        return;
                    }
                    Ok(None) => {
                        for event in decoder.finish() {
                            yield event;
                        }
                        return;
                    }
                }
            }
        };

        Ok(Box::pin(events))
    }
}

fn map_transport_error(e: reqwest::Error) -> ChatError {
    if e.is_timeout() {
        ChatError::Timeout
    } else {
        ChatError::upstream(e.status().map(|s| s.as_u16()), e.to_string())
    }
}
