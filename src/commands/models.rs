//! Model listing command for Chatline
//!
//! Prints the chat-capable models offered by the configured gateway, either
//! one per line or as JSON.

use crate::config::Config;
use crate::error::{ChatlineError, Result};
use crate::providers::{self, chat_models, ModelInfo};
use colored::Colorize;

/// List the chat-capable models of the configured gateway
///
/// # Arguments
///
/// * `config` - Configuration containing provider settings
/// * `json` - Print a JSON array instead of one name per line
///
/// # Examples
///
/// ```no_run
/// use chatline::config::Config;
/// use chatline::commands::models::list_models;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::default();
/// list_models(&config, false).await?;
/// # Ok(())
/// # }
/// ```
pub async fn list_models(config: &Config, json: bool) -> Result<()> {
    tracing::info!("Listing models from {}", config.provider.api_base);

    let provider = providers::create_provider(&config.provider)?;
    let models = chat_models(provider.list_models().await?, &config.provider.model_filter);

    println!("{}", render_models(&models, &config.provider.default_model, json)?);
    Ok(())
}

fn render_models(models: &[ModelInfo], default_model: &str, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(models).map_err(ChatlineError::Serialization)?);
    }
    if models.is_empty() {
        return Ok("No models available".to_string());
    }

    let lines: Vec<String> = models
        .iter()
        .map(|m| {
            let owner = m
                .owned_by
                .as_deref()
                .map(|o| format!(" ({})", o))
                .unwrap_or_default();
            if m.name == default_model {
                format!("* {}{}", m.name.green(), owner)
            } else {
                format!("  {}{}", m.name, owner)
            }
        })
        .collect();
    Ok(lines.join("\n"))
}
