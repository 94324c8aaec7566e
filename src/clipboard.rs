//! Clipboard access for the copy commands
//!
//! Copying is fire-and-forget from the session's point of view: a failure is
//! returned as `ChatlineError::Clipboard` so the command loop can report it.

use crate::error::{ChatlineError, Result};

/// Destination for copied conversation text
pub trait Clipboard: Send {
    /// Place `text` on the clipboard
    fn copy(&mut self, text: &str) -> Result<()>;
}

/// System clipboard backed by `arboard`
///
/// The platform handle is opened per copy, so a missing display server only
/// fails the copy command rather than session startup.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    /// Create a system clipboard handle
    pub fn new() -> Self {
        Self
    }
}

impl Clipboard for SystemClipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| ChatlineError::Clipboard(format!("Clipboard not available: {}", e)))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| ChatlineError::Clipboard(e.to_string()))?;
        tracing::debug!("Copied {} bytes to clipboard", text.len());
        Ok(())
    }
}
