//! Session controller
//!
//! This module implements the single live chat session that:
//! - Owns the transcript and the current model id
//! - Streams replies from the completion gateway into the transcript
//! - Copies, saves, loads and deletes conversations
//!
//! Every operation is an atomic transition: on rejection the session is left
//! as it was, except for the partial reply policy described on
//! [`ChatSession::stream_response`].

use crate::clipboard::Clipboard;
use crate::config::Config;
use crate::error::{ChatlineError, Result};
use crate::providers::{chat_models, Message, Provider, Role};
use crate::storage::{ConversationFiles, SavedConversation};
use futures::StreamExt;
use tracing::{debug, info, warn};

use super::{Conversation, ReplyBuffer};

/// Minimum similarity for a listed model id to be offered as a suggestion
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Outcome of a streamed reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Text that was appended to the transcript as the assistant message
    pub text: String,
    /// Why the reply stopped early, if it did
    pub interrupted: Option<String>,
}

/// The live chat session
///
/// # Examples
///
/// ```no_run
/// use chatline::clipboard::SystemClipboard;
/// use chatline::config::Config;
/// use chatline::providers::{create_provider, Role};
/// use chatline::session::ChatSession;
///
/// # async fn example() -> chatline::error::Result<()> {
/// let config = Config::default();
/// let provider = create_provider(&config.provider)?;
/// let mut session = ChatSession::new(&config, provider, Box::new(SystemClipboard::new()));
///
/// session.add_message(Role::User, "Hello");
/// let reply = session.stream_response(|fragment| print!("{}", fragment)).await?;
/// println!("\n{} bytes", reply.text.len());
/// # Ok(())
/// # }
/// ```
pub struct ChatSession {
    model: String,
    conversation: Conversation,
    last_response: String,
    provider: Box<dyn Provider>,
    clipboard: Box<dyn Clipboard>,
    files: ConversationFiles,
    model_filter: String,
    naming_prompt: String,
    keep_naming_prompt: bool,
    max_response_bytes: usize,
}

impl ChatSession {
    /// Creates a session with an empty transcript and the configured default model
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `provider` - Completion gateway
    /// * `clipboard` - Destination for the copy operations
    pub fn new(config: &Config, provider: Box<dyn Provider>, clipboard: Box<dyn Clipboard>) -> Self {
        Self {
            model: config.provider.default_model.clone(),
            conversation: Conversation::new(),
            last_response: String::new(),
            provider,
            clipboard,
            files: ConversationFiles::new(
                config.chat.conversations_dir.clone(),
                config.chat.file_extension.clone(),
            ),
            model_filter: config.provider.model_filter.clone(),
            naming_prompt: config.chat.naming_prompt.clone(),
            keep_naming_prompt: config.chat.keep_naming_prompt,
            max_response_bytes: config.chat.max_response_bytes,
        }
    }

    /// Current model id
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The transcript
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Content of the most recent assistant message, empty when there is none
    pub fn last_response(&self) -> &str {
        &self.last_response
    }

    /// The file store used by save, load, delete and list
    pub fn files(&self) -> &ConversationFiles {
        &self.files
    }

    fn refresh_last_response(&mut self) {
        self.last_response = self
            .conversation
            .last_assistant_text()
            .unwrap_or_default()
            .to_string();
    }

    /// Clears the transcript and the cached last response
    pub fn reset(&mut self) {
        self.conversation.clear();
        self.last_response.clear();
        debug!("Session reset");
    }

    /// Switches to `name` if the gateway lists it as a chat-capable model
    ///
    /// A failed listing is treated as an empty one.
    ///
    /// # Errors
    ///
    /// Returns `ChatlineError::ModelNotFound`, with the closest listed id as
    /// a suggestion when one is similar enough
    pub async fn set_model(&mut self, name: &str) -> Result<()> {
        let available = match self.list_models().await {
            Ok(models) => models,
            Err(e) => {
                warn!("Model listing failed, treating as empty: {}", e);
                Vec::new()
            }
        };

        if available.iter().any(|m| m == name) {
            info!("Switching model from {} to {}", self.model, name);
            self.model = name.to_string();
            return Ok(());
        }

        Err(ChatlineError::ModelNotFound {
            model: name.to_string(),
            suggestion: closest_model(name, &available),
        }
        .into())
    }

    /// Appends a message without any validation of its content
    pub fn add_message(&mut self, role: Role, content: impl Into<String>) {
        self.conversation.push(Message::new(role, content));
        if role == Role::Assistant {
            self.refresh_last_response();
        }
    }

    /// Streams a reply to the current transcript and appends it
    ///
    /// Each accepted fragment is passed to `on_fragment` as soon as it
    /// arrives, in arrival order.
    ///
    /// Partial replies are kept: when the stream fails after at least one
    /// fragment, or the reply outgrows `max_response_bytes`, the text received
    /// so far is appended as the assistant message and
    /// [`Reply::interrupted`] carries the reason. A clean stream that
    /// produced no text still appends an empty assistant message.
    ///
    /// # Errors
    ///
    /// Returns the gateway error when the call fails before any fragment
    /// arrives; the transcript is unchanged in that case
    pub async fn stream_response<F>(&mut self, mut on_fragment: F) -> Result<Reply>
    where
        F: FnMut(&str),
    {
        debug!(
            "Streaming reply from {} for {} messages",
            self.model,
            self.conversation.len()
        );
        let mut stream = self
            .provider
            .complete_stream(&self.model, self.conversation.messages())
            .await?;

        let mut buffer = ReplyBuffer::new(self.max_response_bytes);
        let mut received = 0usize;
        let mut interrupted = None;

        while let Some(item) = stream.next().await {
            match item {
                Ok(fragment) => {
                    received += 1;
                    let accepted = buffer.push(&fragment);
                    if !accepted.is_empty() {
                        on_fragment(accepted);
                    }
                    if buffer.overflowed() {
                        warn!("Reply exceeded {} bytes, truncating", buffer.capacity());
                        interrupted = Some(format!(
                            "reply truncated at {} bytes",
                            buffer.capacity()
                        ));
                        break;
                    }
                }
                Err(e) if received == 0 => return Err(e),
                Err(e) => {
                    warn!("Stream failed after {} fragments: {}", received, e);
                    interrupted = Some(e.to_string());
                    break;
                }
            }
        }

        let text = buffer.into_string();
        self.conversation.push(Message::assistant(text.clone()));
        self.last_response = text.clone();
        debug!("Appended reply of {} bytes", text.len());

        Ok(Reply { text, interrupted })
    }

    /// Discards a directly preceding assistant reply and streams a new one
    ///
    /// If the new call fails before producing anything, the discarded reply
    /// is put back.
    ///
    /// # Errors
    ///
    /// Returns `ChatlineError::NothingToRegenerate` on an empty transcript,
    /// otherwise the errors of [`ChatSession::stream_response`]
    pub async fn regenerate_response<F>(&mut self, on_fragment: F) -> Result<Reply>
    where
        F: FnMut(&str),
    {
        if self.conversation.is_empty() {
            return Err(ChatlineError::NothingToRegenerate.into());
        }

        let removed = self.conversation.pop_last_if_assistant();
        match self.stream_response(on_fragment).await {
            Ok(reply) => Ok(reply),
            Err(e) => {
                if let Some(message) = removed {
                    self.conversation.push(message);
                }
                self.refresh_last_response();
                Err(e)
            }
        }
    }

    /// Copies the final `n` messages to the clipboard
    ///
    /// A count larger than the transcript copies everything. Returns the
    /// number of messages copied.
    ///
    /// # Errors
    ///
    /// Returns `ChatlineError::EmptyTranscript` when there is nothing to copy,
    /// or `ChatlineError::Clipboard` when the clipboard rejects the text
    pub fn copy_last_n(&mut self, n: usize) -> Result<usize> {
        if self.conversation.is_empty() {
            return Err(ChatlineError::EmptyTranscript.into());
        }
        let selected = self.conversation.last_n(n);
        let text = Conversation::render(selected);
        let count = selected.len();
        self.clipboard.copy(&text)?;
        Ok(count)
    }

    /// Copies the whole transcript to the clipboard
    pub fn copy_all(&mut self) -> Result<usize> {
        self.copy_last_n(self.conversation.len())
    }

    /// Asks the model for a file name for the current conversation
    ///
    /// The naming instruction is appended to the transcript as a system
    /// message before the call. It is removed again if the call fails, or
    /// after success when `keep_naming_prompt` is off. Surrounding
    /// whitespace is trimmed and path separators are replaced so the name
    /// stays inside the conversations directory.
    pub async fn generate_filename(&mut self) -> Result<String> {
        let instruction = Message::system(self.naming_prompt.clone());
        self.conversation.push(instruction.clone());

        let result = self
            .provider
            .complete(&self.model, self.conversation.messages())
            .await;

        let name = match result {
            Ok(text) => sanitize_file_name(&text),
            Err(e) => {
                self.conversation.pop_last_if_eq(&instruction);
                return Err(e);
            }
        };

        if name.is_empty() {
            self.conversation.pop_last_if_eq(&instruction);
            return Err(ChatlineError::GatewayUnavailable(
                "model returned an empty file name".to_string(),
            )
            .into());
        }

        if !self.keep_naming_prompt {
            self.conversation.pop_last_if_eq(&instruction);
        }

        debug!("Generated file name {}", name);
        Ok(name)
    }

    /// Writes the model and transcript to `<name>.<ext>`, overwriting silently
    ///
    /// Without a name, one is generated first with
    /// [`ChatSession::generate_filename`]. Returns the file name written.
    pub async fn save(&mut self, name: Option<&str>) -> Result<String> {
        let name = match name {
            Some(name) => name.to_string(),
            None => self.generate_filename().await?,
        };

        let record = SavedConversation {
            model: self.model.clone(),
            messages: self.conversation.messages().to_vec(),
        };
        self.files.save(&name, &record)
    }

    /// Replaces the model and transcript with a saved conversation
    ///
    /// The saved model id is taken as-is, without checking the gateway.
    /// Returns the file name read.
    ///
    /// # Errors
    ///
    /// Returns `ChatlineError::FileNotFound` or
    /// `ChatlineError::MalformedSavedFile`; the session is unchanged in both cases
    pub fn load(&mut self, name: &str) -> Result<String> {
        let record = self.files.load(name)?;
        self.model = record.model;
        self.conversation.replace(record.messages);
        self.refresh_last_response();
        Ok(self.files.file_name(name))
    }

    /// Removes a saved conversation. Returns the file name removed.
    pub fn delete(&self, name: &str) -> Result<String> {
        self.files.delete(name)
    }

    /// File names of the saved conversations, sorted
    pub fn list_saved(&self) -> Result<Vec<String>> {
        self.files.list()
    }

    /// Chat-capable model ids, in the order the gateway lists them
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let models = self.provider.list_models().await?;
        Ok(chat_models(models, &self.model_filter)
            .into_iter()
            .map(|m| m.name)
            .collect())
    }
}

fn closest_model(name: &str, available: &[String]) -> Option<String> {
    available
        .iter()
        .map(|candidate| (candidate, strsim::jaro_winkler(name, candidate)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate.clone())
}

fn sanitize_file_name(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c == '/' || c == '\\' { '-' } else { c })
        .collect()
}
