use crate::error::{ChatlineError, Result};
use anyhow::Context;
use std::path::PathBuf;

pub mod types;
pub use types::SavedConversation;

/// File-backed store for saved conversations
///
/// Each conversation is one JSON file named `<base>.<extension>` inside a
/// single directory. Names are shared with the rest of the filesystem:
/// saving over an existing file replaces it without confirmation.
#[derive(Debug, Clone)]
pub struct ConversationFiles {
    dir: PathBuf,
    extension: String,
}

impl ConversationFiles {
    /// Create a store rooted at `dir` using `extension` (without the dot)
    ///
    /// # Examples
    ///
    /// ```
    /// use chatline::storage::ConversationFiles;
    ///
    /// let files = ConversationFiles::new(".", "ai");
    /// assert_eq!(files.file_name("notes"), "notes.ai");
    /// assert_eq!(files.file_name("notes.ai"), "notes.ai");
    /// ```
    pub fn new<P: Into<PathBuf>>(dir: P, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    /// File name for `name`, appending the extension when it is absent
    pub fn file_name(&self, name: &str) -> String {
        let suffix = format!(".{}", self.extension);
        if name.ends_with(&suffix) {
            name.to_string()
        } else {
            format!("{}{}", name, suffix)
        }
    }

    /// Full path for `name`
    pub fn resolve(&self, name: &str) -> PathBuf {
        self.dir.join(self.file_name(name))
    }

    /// Write a conversation, replacing any file with the same name
    ///
    /// The record is written to a temporary sibling first and renamed into
    /// place, so an interrupted save never leaves a truncated file.
    ///
    /// Returns the file name that was written.
    pub fn save(&self, name: &str, record: &SavedConversation) -> Result<String> {
        let file_name = self.file_name(name);
        let path = self.dir.join(&file_name);
        let tmp_path = self.dir.join(format!(".{}.tmp", file_name));

        let json = serde_json::to_string(record).map_err(ChatlineError::Serialization)?;
        std::fs::write(&tmp_path, json)
            .map_err(ChatlineError::Io)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        if let Err(e) = std::fs::rename(&tmp_path, &path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(anyhow::Error::new(ChatlineError::Io(e))
                .context(format!("Failed to save {}", path.display())));
        }

        tracing::info!("Saved {} messages to {}", record.messages.len(), path.display());
        Ok(file_name)
    }

    /// Read a saved conversation
    ///
    /// # Errors
    ///
    /// Returns `ChatlineError::FileNotFound` if the file does not exist,
    /// `ChatlineError::MalformedSavedFile` if it does not have the expected shape
    /// and `ChatlineError::Io` if it cannot be read
    pub fn load(&self, name: &str) -> Result<SavedConversation> {
        let file_name = self.file_name(name);
        let path = self.dir.join(&file_name);
        if !path.is_file() {
            return Err(ChatlineError::FileNotFound(file_name).into());
        }

        let contents = std::fs::read_to_string(&path)
            .map_err(ChatlineError::Io)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let record: SavedConversation =
            serde_json::from_str(&contents).map_err(|e| ChatlineError::MalformedSavedFile {
                name: file_name.clone(),
                reason: e.to_string(),
            })?;

        tracing::info!("Loaded {} messages from {}", record.messages.len(), path.display());
        Ok(record)
    }

    /// Remove a saved conversation
    ///
    /// Returns the file name that was removed.
    ///
    /// # Errors
    ///
    /// Returns `ChatlineError::FileNotFound` if the file does not exist
    pub fn delete(&self, name: &str) -> Result<String> {
        let file_name = self.file_name(name);
        let path = self.dir.join(&file_name);
        if !path.is_file() {
            return Err(ChatlineError::FileNotFound(file_name).into());
        }

        std::fs::remove_file(&path)
            .map_err(ChatlineError::Io)
            .with_context(|| format!("Failed to delete {}", path.display()))?;
        tracing::info!("Deleted {}", path.display());
        Ok(file_name)
    }

    /// File names of every saved conversation, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.dir)
            .map_err(ChatlineError::Io)
            .with_context(|| format!("Failed to read directory {}", self.dir.display()))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(ChatlineError::Io)?;
            if !entry.file_type().map_err(ChatlineError::Io)?.is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(self.extension.as_str()) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }

        names.sort();
        Ok(names)
    }
}
