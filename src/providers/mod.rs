//! Provider module for Chatline
//!
//! This module contains the completion gateway abstraction and its
//! OpenAI-compatible HTTP implementation.

pub mod base;
pub mod openai;
pub mod sse;

pub use base::{Message, ModelInfo, Provider, Role, TextStream};
pub use openai::OpenAiProvider;

use crate::config::ProviderConfig;
use crate::error::Result;

/// Create a provider instance based on configuration
///
/// # Errors
///
/// Returns error if provider initialization fails
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn Provider>> {
    Ok(Box::new(OpenAiProvider::new(config.clone())?))
}

/// Keep the models whose id contains `filter`, preserving listing order
///
/// An empty filter keeps every model.
///
/// # Examples
///
/// ```
/// use chatline::providers::{chat_models, ModelInfo};
///
/// let models = vec![ModelInfo::new("gpt-4o"), ModelInfo::new("whisper-1")];
/// let names: Vec<_> = chat_models(models, "gpt").into_iter().map(|m| m.name).collect();
/// assert_eq!(names, vec!["gpt-4o"]);
/// ```
pub fn chat_models(models: Vec<ModelInfo>, filter: &str) -> Vec<ModelInfo> {
    models
        .into_iter()
        .filter(|m| m.name.contains(filter))
        .collect()
}
