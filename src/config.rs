//! Configuration management for Chatline
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{ChatlineError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Chatline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Completion gateway settings
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Interactive session settings
    #[serde(default)]
    pub chat: ChatConfig,
}

/// OpenAI-compatible provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the API, without the trailing endpoint path
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Name of the environment variable holding the API key
    ///
    /// The key is optional: local OpenAI-compatible servers usually accept
    /// unauthenticated requests.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model used when a session starts
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Gateway timeout (seconds)
    ///
    /// Bounds connecting, each non-streaming request and the wait for a
    /// streamed reply to start. While a reply streams it bounds the gap
    /// between two reads, not the total length of the reply.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Substring that marks a listed model id as chat-capable
    ///
    /// An empty filter accepts every listed id.
    #[serde(default = "default_model_filter")]
    pub model_filter: String,
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_timeout_seconds() -> u64 {
    300
}

fn default_model_filter() -> String {
    "gpt".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key_env: default_api_key_env(),
            default_model: default_model(),
            timeout_seconds: default_timeout_seconds(),
            model_filter: default_model_filter(),
        }
    }
}

impl ProviderConfig {
    /// Read the API key from the configured environment variable
    ///
    /// Returns `None` when the variable is unset or empty.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Interactive session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Token that marks an input line as a session command
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,

    /// Extension (without the dot) of saved conversation files
    #[serde(default = "default_file_extension")]
    pub file_extension: String,

    /// Directory where conversations are saved, loaded, listed and deleted
    #[serde(default = "default_conversations_dir")]
    pub conversations_dir: PathBuf,

    /// System instruction sent when a conversation is saved without a name
    #[serde(default = "default_naming_prompt")]
    pub naming_prompt: String,

    /// Keep the naming instruction in the transcript after it was used
    #[serde(default = "default_keep_naming_prompt")]
    pub keep_naming_prompt: bool,

    /// Upper bound on the size of a single streamed reply (bytes)
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

fn default_command_prefix() -> String {
    "?".to_string()
}

fn default_file_extension() -> String {
    "ai".to_string()
}

fn default_conversations_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_naming_prompt() -> String {
    "Generate a short one-word, maybe two, conversation unique filename for a chat conversation. Do not use quotes. Do not use a timestamp".to_string()
}

fn default_keep_naming_prompt() -> bool {
    true
}

fn default_max_response_bytes() -> usize {
    1024 * 1024
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            command_prefix: default_command_prefix(),
            file_extension: default_file_extension(),
            conversations_dir: default_conversations_dir(),
            naming_prompt: default_naming_prompt(),
            keep_naming_prompt: default_keep_naming_prompt(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(ChatlineError::Io)
            .with_context(|| format!("Failed to read config file {}", path))?;
        let config = serde_yaml::from_str(&contents)
            .map_err(ChatlineError::Yaml)
            .with_context(|| format!("Failed to parse config file {}", path))?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(api_base) = std::env::var("CHATLINE_API_BASE") {
            tracing::debug!(api_base = %api_base, "Env override: CHATLINE_API_BASE");
            self.provider.api_base = api_base;
        }

        if let Ok(model) = std::env::var("CHATLINE_MODEL") {
            tracing::debug!(model = %model, "Env override: CHATLINE_MODEL");
            self.provider.default_model = model;
        }

        if let Ok(filter) = std::env::var("CHATLINE_MODEL_FILTER") {
            tracing::debug!(filter = %filter, "Env override: CHATLINE_MODEL_FILTER");
            self.provider.model_filter = filter;
        }

        if let Ok(timeout) = std::env::var("CHATLINE_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(v) => self.provider.timeout_seconds = v,
                Err(_) => tracing::warn!("Invalid CHATLINE_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        if let Ok(dir) = std::env::var("CHATLINE_CONVERSATIONS_DIR") {
            tracing::debug!(dir = %dir, "Env override: CHATLINE_CONVERSATIONS_DIR");
            self.chat.conversations_dir = PathBuf::from(dir);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(crate::cli::Commands::Chat { model, dir }) = &cli.command {
            if let Some(model) = model {
                self.provider.default_model = model.clone();
            }
            if let Some(dir) = dir {
                self.chat.conversations_dir = dir.clone();
            }
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `ChatlineError::Config` describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        let api_base = url::Url::parse(&self.provider.api_base).map_err(|e| {
            ChatlineError::Config(format!(
                "provider.api_base is not a valid URL ({}): {}",
                self.provider.api_base, e
            ))
        })?;
        if api_base.scheme() != "http" && api_base.scheme() != "https" {
            return Err(ChatlineError::Config(format!(
                "provider.api_base must use http or https, got {}",
                api_base.scheme()
            ))
            .into());
        }

        if self.provider.default_model.trim().is_empty() {
            return Err(
                ChatlineError::Config("provider.default_model cannot be empty".to_string()).into(),
            );
        }

        if self.provider.timeout_seconds == 0 {
            return Err(ChatlineError::Config(
                "provider.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        let prefix = &self.chat.command_prefix;
        if prefix.is_empty() || prefix.chars().any(char::is_whitespace) {
            return Err(ChatlineError::Config(
                "chat.command_prefix must be non-empty and contain no whitespace".to_string(),
            )
            .into());
        }

        let ext = &self.chat.file_extension;
        if ext.is_empty() || ext.contains(['.', '/', '\\']) {
            return Err(ChatlineError::Config(format!(
                "chat.file_extension must be a bare extension without dots or separators, got '{}'",
                ext
            ))
            .into());
        }

        if self.chat.max_response_bytes == 0 {
            return Err(ChatlineError::Config(
                "chat.max_response_bytes must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
