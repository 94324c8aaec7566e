//! Test utilities for Chatline
//!
//! This module provides scripted stand-ins for the completion gateway and the
//! clipboard, plus temporary directory helpers, so session and command tests
//! run without network or display access.

use crate::clipboard::Clipboard;
use crate::config::Config;
use crate::error::{ChatlineError, Result};
use crate::providers::{Message, ModelInfo, Provider, TextStream};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test configuration that stores conversations in `dir`
pub fn test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.chat.conversations_dir = dir.to_path_buf();
    config
}

/// Scripted behaviour of one streaming call
#[derive(Debug, Clone)]
pub enum StreamScript {
    /// The call fails before any fragment is produced
    Fail(String),
    /// The call yields these items in order; `Err` items are stream errors
    Items(Vec<std::result::Result<String, String>>),
}

impl StreamScript {
    /// A stream that yields every fragment and then ends cleanly
    pub fn fragments(fragments: &[&str]) -> Self {
        Self::Items(fragments.iter().map(|f| Ok(f.to_string())).collect())
    }
}

/// Which gateway call a request was recorded for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Complete,
    Stream,
}

/// A completion request as seen by the fake gateway
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub kind: RequestKind,
    pub model: String,
    pub messages: Vec<Message>,
}

#[derive(Debug)]
struct FakeState {
    models: std::result::Result<Vec<String>, String>,
    completions: VecDeque<std::result::Result<String, String>>,
    streams: VecDeque<StreamScript>,
    requests: Vec<RecordedRequest>,
}

/// In-memory gateway that replays scripted responses
///
/// Clones share state, so a test can keep one handle for assertions after
/// boxing another into a session.
#[derive(Debug, Clone)]
pub struct FakeProvider {
    state: Arc<Mutex<FakeState>>,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeProvider {
    /// A gateway listing no models and with nothing scripted
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                models: Ok(Vec::new()),
                completions: VecDeque::new(),
                streams: VecDeque::new(),
                requests: Vec::new(),
            })),
        }
    }

    /// Set the model listing
    pub fn with_models(self, models: &[&str]) -> Self {
        self.state.lock().unwrap().models = Ok(models.iter().map(|m| m.to_string()).collect());
        self
    }

    /// Make the model listing fail
    pub fn with_models_failure(self, reason: &str) -> Self {
        self.state.lock().unwrap().models = Err(reason.to_string());
        self
    }

    /// Queue the result of the next non-streaming call
    pub fn push_completion(&self, result: std::result::Result<&str, &str>) {
        self.state
            .lock()
            .unwrap()
            .completions
            .push_back(result.map(str::to_string).map_err(str::to_string));
    }

    /// Queue the behaviour of the next streaming call
    pub fn push_stream(&self, script: StreamScript) {
        self.state.lock().unwrap().streams.push_back(script);
    }

    /// Every completion request received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    fn record(&self, kind: RequestKind, model: &str, messages: &[Message]) {
        self.state.lock().unwrap().requests.push(RecordedRequest {
            kind,
            model: model.to_string(),
            messages: messages.to_vec(),
        });
    }
}

fn unavailable(reason: impl Into<String>) -> anyhow::Error {
    ChatlineError::GatewayUnavailable(reason.into()).into()
}

#[async_trait]
impl Provider for FakeProvider {
    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let models = self.state.lock().unwrap().models.clone();
        models
            .map(|names| names.into_iter().map(ModelInfo::new).collect())
            .map_err(unavailable)
    }

    async fn complete(&self, model: &str, messages: &[Message]) -> Result<String> {
        self.record(RequestKind::Complete, model, messages);
        let next = self.state.lock().unwrap().completions.pop_front();
        match next {
            Some(result) => result.map_err(unavailable),
            None => Err(unavailable("no scripted completion")),
        }
    }

    async fn complete_stream(&self, model: &str, messages: &[Message]) -> Result<TextStream> {
        self.record(RequestKind::Stream, model, messages);
        let next = self.state.lock().unwrap().streams.pop_front();
        match next {
            Some(StreamScript::Items(items)) => Ok(Box::pin(futures::stream::iter(
                items.into_iter().map(|item| item.map_err(unavailable)),
            ))),
            Some(StreamScript::Fail(reason)) => Err(unavailable(reason)),
            None => Err(unavailable("no scripted stream")),
        }
    }
}

/// Clipboard that remembers everything copied to it
#[derive(Debug, Clone, Default)]
pub struct RecordingClipboard {
    copies: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard whose every copy fails
    pub fn failing() -> Self {
        Self {
            copies: Arc::default(),
            fail: true,
        }
    }

    /// Texts copied so far, oldest first
    pub fn copies(&self) -> Vec<String> {
        self.copies.lock().unwrap().clone()
    }
}

impl Clipboard for RecordingClipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        if self.fail {
            return Err(ChatlineError::Clipboard("no display".to_string()).into());
        }
        self.copies.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_fake_provider_replays_stream_script() {
        let provider = FakeProvider::new();
        provider.push_stream(StreamScript::fragments(&["a", "b"]));

        let stream = provider
            .complete_stream("m", &[Message::user("hi")])
            .await
            .unwrap();
        let items: Vec<String> = stream.map(|r| r.unwrap()).collect().await;
        assert_eq!(items, vec!["a".to_string(), "b".to_string()]);

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].kind, RequestKind::Stream);
        assert_eq!(requests[0].messages, vec![Message::user("hi")]);
    }

    #[tokio::test]
    async fn test_fake_provider_without_script_fails() {
        let provider = FakeProvider::new();
        assert!(provider.complete("m", &[]).await.is_err());
        assert!(provider.complete_stream("m", &[]).await.is_err());
    }

    #[test]
    fn test_recording_clipboard() {
        let mut clipboard = RecordingClipboard::new();
        let handle = clipboard.clone();
        clipboard.copy("one").unwrap();
        assert_eq!(handle.copies(), vec!["one".to_string()]);

        let mut failing = RecordingClipboard::failing();
        assert!(failing.copy("x").is_err());
    }
}
