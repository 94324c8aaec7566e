//! Chat session module
//!
//! This module contains the live session state: the transcript, the bounded
//! buffer that collects streamed replies, and the controller that ties them
//! to the completion gateway, the clipboard and the file store.

pub mod conversation;
pub mod core;
pub mod reply;

pub use self::core::{ChatSession, Reply};
pub use conversation::Conversation;
pub use reply::ReplyBuffer;
