//! Chatline - interactive chat session library
//!
//! This library provides the core functionality of the Chatline CLI: a single
//! live conversation with an OpenAI-compatible model, streamed replies, and
//! conversations saved to local files.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: The live conversation, streamed reply buffer and session controller
//! - `providers`: Completion gateway abstraction and the OpenAI-compatible client
//! - `storage`: Saved conversation files
//! - `commands`: Command parser, dispatcher and interactive loop
//! - `clipboard`: Clipboard access for the copy commands
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use chatline::clipboard::SystemClipboard;
//! use chatline::providers::{create_provider, Role};
//! use chatline::{ChatSession, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let provider = create_provider(&config.provider)?;
//!     let mut session = ChatSession::new(&config, provider, Box::new(SystemClipboard::new()));
//!     session.add_message(Role::User, "Hello!");
//!     session.stream_response(|fragment| print!("{}", fragment)).await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod clipboard;
pub mod commands;
pub mod config;
pub mod error;
pub mod providers;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use error::{ChatlineError, Result};
pub use session::ChatSession;

#[cfg(test)]
pub mod test_utils;
