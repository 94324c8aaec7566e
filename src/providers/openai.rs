//! OpenAI-compatible provider implementation for Chatline
//!
//! This module implements the Provider trait against the OpenAI chat
//! completions API. Any server exposing the same `/models` and
//! `/chat/completions` endpoints (including local inference servers) works
//! by pointing `api_base` at it.

use crate::config::ProviderConfig;
use crate::error::{ChatlineError, Result};
use crate::providers::sse::SseDecoder;
use crate::providers::{Message, ModelInfo, Provider, TextStream};

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

/// OpenAI-compatible API provider
///
/// # Examples
///
/// ```no_run
/// use chatline::config::ProviderConfig;
/// use chatline::providers::{Message, OpenAiProvider, Provider};
///
/// # async fn example() -> chatline::error::Result<()> {
/// let provider = OpenAiProvider::new(ProviderConfig::default())?;
/// let reply = provider
///     .complete("gpt-3.5-turbo", &[Message::user("Hello!")])
///     .await?;
/// println!("{}", reply);
/// # Ok(())
/// # }
/// ```
pub struct OpenAiProvider {
    client: Client,
    api_base: String,
    api_key: Option<String>,
    timeout: Duration,
}

/// Request body for `/chat/completions`
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

/// Response from `/models`
#[derive(Debug, Deserialize)]
struct ModelsResponse {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
    #[serde(default)]
    owned_by: Option<String>,
}

/// Non-streaming response from `/chat/completions`
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// One streamed chunk from `/chat/completions` with `stream: true`
#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Interpretation of a single SSE data payload
#[derive(Debug, PartialEq, Eq)]
enum ChunkEvent {
    /// A non-empty text increment
    Text(String),
    /// A chunk with no text (role announcement, finish reason, ...)
    Empty,
    /// The `[DONE]` sentinel
    Done,
}

fn parse_chunk(data: &str) -> Result<ChunkEvent> {
    if data.trim() == "[DONE]" {
        return Ok(ChunkEvent::Done);
    }

    let chunk: ChatCompletionChunk = serde_json::from_str(data).map_err(|e| {
        ChatlineError::GatewayUnavailable(format!("Failed to parse stream chunk: {}", e))
    })?;

    if let Some(error) = chunk.error {
        return Err(ChatlineError::GatewayUnavailable(format!("Stream error: {}", error)).into());
    }

    match chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
    {
        Some(text) if !text.is_empty() => Ok(ChunkEvent::Text(text)),
        _ => Ok(ChunkEvent::Empty),
    }
}

type ByteStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

/// State threaded through the fragment stream
struct FragmentState {
    body: ByteStream,
    idle_timeout: Duration,
    decoder: SseDecoder,
    pending: VecDeque<String>,
    finished: bool,
}

/// Turn a raw SSE response body into a stream of reply fragments
///
/// The stream ends at `[DONE]` or when the body ends; a transport or
/// in-band error is yielded once as the final item. A body that sends
/// nothing for `idle_timeout` counts as a transport error, while a reply
/// that keeps arriving may take as long as it needs.
pub(crate) fn fragment_stream(
    body: impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
    idle_timeout: Duration,
) -> TextStream {
    let state = FragmentState {
        body: Box::pin(body),
        idle_timeout,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    Box::pin(futures::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(data) = st.pending.pop_front() {
                match parse_chunk(&data) {
                    Ok(ChunkEvent::Text(text)) => return Some((Ok(text), st)),
                    Ok(ChunkEvent::Empty) => continue,
                    Ok(ChunkEvent::Done) => return None,
                    Err(e) => {
                        st.pending.clear();
                        st.finished = true;
                        return Some((Err(e), st));
                    }
                }
            }

            if st.finished {
                return None;
            }

            let next = match tokio::time::timeout(st.idle_timeout, st.body.next()).await {
                Ok(next) => next,
                Err(_) => {
                    tracing::warn!(
                        "Completion stream stalled for {}s",
                        st.idle_timeout.as_secs()
                    );
                    st.finished = true;
                    return Some((
                        Err(ChatlineError::GatewayUnavailable(format!(
                            "Stream stalled: no data for {}s",
                            st.idle_timeout.as_secs()
                        ))
                        .into()),
                        st,
                    ));
                }
            };

            match next {
                Some(Ok(chunk)) => {
                    let events = st.decoder.push(&chunk);
                    st.pending.extend(events);
                }
                Some(Err(e)) => {
                    tracing::warn!("Completion stream interrupted: {}", e);
                    st.finished = true;
                    return Some((
                        Err(ChatlineError::GatewayUnavailable(format!(
                            "Stream interrupted: {}",
                            e
                        ))
                        .into()),
                        st,
                    ));
                }
                None => {
                    st.finished = true;
                    if let Some(rest) = st.decoder.finish() {
                        st.pending.push_back(rest);
                    }
                }
            }
        }
    }))
}

impl OpenAiProvider {
    /// Create a new provider instance
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use chatline::config::ProviderConfig;
    /// use chatline::providers::OpenAiProvider;
    ///
    /// let provider = OpenAiProvider::new(ProviderConfig::default());
    /// assert!(provider.is_ok());
    /// ```
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        // No client-wide timeout: it would also cap how long a reply may stream
        let client = Client::builder()
            .connect_timeout(timeout)
            .user_agent(concat!("chatline/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ChatlineError::GatewayUnavailable(format!("Failed to create HTTP client: {}", e))
            })?;

        let api_key = config.api_key();
        if api_key.is_none() {
            tracing::debug!(
                "No API key in {}, sending unauthenticated requests",
                config.api_key_env
            );
        }

        tracing::info!("Initialized OpenAI-compatible provider: base={}", config.api_base);

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            timeout,
        })
    }

    /// Get the configured API base URL
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn post_chat(&self, model: &str, messages: &[Message], stream: bool) -> Result<reqwest::Response> {
        let url = format!("{}/chat/completions", self.api_base);
        let body = ChatCompletionRequest {
            model,
            messages,
            stream,
        };

        tracing::debug!(
            "Sending chat request: model={}, messages={}, stream={}",
            model,
            messages.len(),
            stream
        );

        let mut request = self.authorized(self.client.post(&url)).json(&body);
        if !stream {
            request = request.timeout(self.timeout);
        }

        // Streaming bodies are bounded per read instead, see `fragment_stream`
        let response = match tokio::time::timeout(self.timeout, request.send()).await {
            Ok(sent) => sent.map_err(|e| {
                tracing::error!("Chat request failed: {}", e);
                ChatlineError::GatewayUnavailable(format!("Request failed: {}", e))
            })?,
            Err(_) => {
                tracing::error!("Chat request timed out after {}s", self.timeout.as_secs());
                return Err(ChatlineError::GatewayUnavailable(format!(
                    "Request timed out after {}s",
                    self.timeout.as_secs()
                ))
                .into());
            }
        };

        check_status(response).await
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_default();
    tracing::error!("Gateway returned error {}: {}", status, error_text);
    Err(ChatlineError::GatewayUnavailable(format!("{}: {}", status, error_text)).into())
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}/models", self.api_base);
        tracing::debug!("Fetching models from {}", url);

        let response = self
            .authorized(self.client.get(&url))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Failed to fetch models: {}", e);
                ChatlineError::GatewayUnavailable(format!("Failed to fetch models: {}", e))
            })?;
        let response = check_status(response).await?;

        let models: ModelsResponse = response.json().await.map_err(|e| {
            ChatlineError::GatewayUnavailable(format!("Failed to parse models response: {}", e))
        })?;

        tracing::debug!("Fetched {} models", models.data.len());
        Ok(models
            .data
            .into_iter()
            .map(|entry| ModelInfo {
                name: entry.id,
                owned_by: entry.owned_by,
            })
            .collect())
    }

    async fn complete(&self, model: &str, messages: &[Message]) -> Result<String> {
        let response = self.post_chat(model, messages, false).await?;

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            ChatlineError::GatewayUnavailable(format!("Failed to parse completion: {}", e))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| {
                ChatlineError::GatewayUnavailable("Completion contained no choices".to_string())
                    .into()
            })
    }

    async fn complete_stream(&self, model: &str, messages: &[Message]) -> Result<TextStream> {
        let response = self.post_chat(model, messages, true).await?;
        Ok(fragment_stream(response.bytes_stream(), self.timeout))
    }
}
