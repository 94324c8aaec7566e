//! Error types for Chatline
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Chatline operations
///
/// Every variant is recoverable at the command-dispatch boundary: the
/// interactive loop reports the error and keeps accepting input.
#[derive(Error, Debug)]
pub enum ChatlineError {
    /// The requested model is not in the gateway's chat-capable listing
    #[error("Model '{model}' not found{}", suggestion_hint(.suggestion))]
    ModelNotFound {
        /// The model id that was requested
        model: String,
        /// Closest listed model id, when one is reasonably similar
        suggestion: Option<String>,
    },

    /// Regenerate was requested on an empty conversation
    #[error("No previous conversation to regenerate")]
    NothingToRegenerate,

    /// An operation needed at least one message
    #[error("No messages in the conversation")]
    EmptyTranscript,

    /// A saved conversation file does not exist
    #[error("File '{0}' not found")]
    FileNotFound(String),

    /// A saved conversation file exists but does not have the expected shape
    #[error("Malformed conversation file '{name}': {reason}")]
    MalformedSavedFile {
        /// File name that failed to parse
        name: String,
        /// Parser message
        reason: String,
    },

    /// The completion gateway failed (network, authentication, rate limit, ...)
    #[error("Gateway unavailable: {0}")]
    GatewayUnavailable(String),

    /// Input started with the command prefix but named no known command
    #[error("Invalid command '{0}'")]
    InvalidCommand(String),

    /// A command that requires an argument was given none
    #[error("Command {command} requires an argument (usage: {usage})")]
    MissingArgument {
        /// Command token as typed by the user
        command: String,
        /// Usage line for the command
        usage: String,
    },

    /// A command argument could not be interpreted
    #[error("Invalid argument '{arg}' for {command} (usage: {usage})")]
    InvalidArgument {
        /// Command token as typed by the user
        command: String,
        /// Offending argument
        arg: String,
        /// Usage line for the command
        usage: String,
    },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Clipboard access failed
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean '{}'?)", name),
        None => String::new(),
    }
}

/// Result type alias for Chatline operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation. Callers that
/// need to classify a failure downcast to [`ChatlineError`].
pub type Result<T> = anyhow::Result<T>;
