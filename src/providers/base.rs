//! Base provider trait and common types for Chatline
//!
//! This module defines the Provider trait that the completion gateway
//! implements, along with the message and model types shared by the session,
//! the persistence layer and the HTTP client.

use crate::error::Result;
use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// Author of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructional context
    System,
    /// Human input
    User,
    /// Model-generated reply
    Assistant,
}

impl Role {
    /// Lowercase wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message structure for conversation
///
/// Messages are immutable once they are part of a transcript; edits happen
/// only by removing whole messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,
    /// Content of the message
    pub content: String,
}

impl Message {
    /// Creates a new message with an explicit role
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use chatline::providers::{Message, Role};
    ///
    /// let msg = Message::user("Hello, assistant!");
    /// assert_eq!(msg.role, Role::User);
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates a new assistant message
    ///
    /// # Examples
    ///
    /// ```
    /// use chatline::providers::{Message, Role};
    ///
    /// let msg = Message::assistant("Hello, user!");
    /// assert_eq!(msg.role, Role::Assistant);
    /// ```
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Creates a new system message
    ///
    /// # Examples
    ///
    /// ```
    /// use chatline::providers::{Message, Role};
    ///
    /// let msg = Message::system("You are a helpful assistant");
    /// assert_eq!(msg.role, Role::System);
    /// ```
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

/// Model metadata returned by the gateway's listing call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier (e.g., "gpt-4o")
    pub name: String,
    /// Organization that owns the model, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owned_by: Option<String>,
}

impl ModelInfo {
    /// Create a new ModelInfo with no owner
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owned_by: None,
        }
    }
}

/// Lazy, finite, non-restartable sequence of reply fragments
///
/// Each item is a non-empty increment of assistant text in generation order,
/// or the error that ended the stream.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Provider trait for the completion gateway
///
/// # Examples
///
/// ```
/// use chatline::providers::{Message, ModelInfo, Provider, TextStream};
/// use chatline::error::Result;
/// use async_trait::async_trait;
///
/// struct EchoProvider;
///
/// #[async_trait]
/// impl Provider for EchoProvider {
///     async fn list_models(&self) -> Result<Vec<ModelInfo>> {
///         Ok(vec![ModelInfo::new("gpt-echo")])
///     }
///
///     async fn complete(&self, _model: &str, messages: &[Message]) -> Result<String> {
///         Ok(messages.last().map(|m| m.content.clone()).unwrap_or_default())
///     }
///
///     async fn complete_stream(&self, model: &str, messages: &[Message]) -> Result<TextStream> {
///         let text = self.complete(model, messages).await?;
///         Ok(Box::pin(futures::stream::iter(vec![Ok(text)])))
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let reply = EchoProvider.complete("gpt-echo", &[Message::user("ping")]).await.unwrap();
/// assert_eq!(reply, "ping");
/// # });
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// List every model id the gateway exposes, in the gateway's order
    ///
    /// # Errors
    ///
    /// Returns `ChatlineError::GatewayUnavailable` if the listing call fails
    async fn list_models(&self) -> Result<Vec<ModelInfo>>;

    /// Complete the conversation in a single response
    ///
    /// # Arguments
    ///
    /// * `model` - Model identifier
    /// * `messages` - Full conversation history, in order
    ///
    /// # Errors
    ///
    /// Returns `ChatlineError::GatewayUnavailable` if the call fails
    async fn complete(&self, model: &str, messages: &[Message]) -> Result<String>;

    /// Complete the conversation as a stream of text fragments
    ///
    /// An `Err` return means the call failed before any fragment was
    /// produced; failures after that point arrive as an `Err` item.
    async fn complete_stream(&self, model: &str, messages: &[Message]) -> Result<TextStream>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        assert_eq!(Message::user("a").role, Role::User);
        assert_eq!(Message::assistant("b").role, Role::Assistant);
        assert_eq!(Message::system("c").role, Role::System);
        assert_eq!(Message::system("c").content, "c");
    }

    #[test]
    fn test_message_serialization_shape() {
        let msg = Message::user("Test");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"Test"}"#);
    }

    #[test]
    fn test_message_rejects_unknown_role() {
        let result = serde_json::from_str::<Message>(r#"{"role":"tool","content":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_message_rejects_extra_fields() {
        let result = serde_json::from_str::<Message>(
            r#"{"role":"user","content":"x","name":"bob"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_role_display_matches_wire_name() {
        for role in [Role::System, Role::User, Role::Assistant] {
            let wire = serde_json::to_string(&role).unwrap();
            assert_eq!(wire, format!("\"{}\"", role));
        }
    }

    #[test]
    fn test_model_info_serialization_skips_missing_owner() {
        let json = serde_json::to_string(&ModelInfo::new("gpt-4")).unwrap();
        assert_eq!(json, r#"{"name":"gpt-4"}"#);
    }
}
