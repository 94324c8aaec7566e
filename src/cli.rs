//! Command-line interface definition for Chatline
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Chatline - interactive chat with OpenAI-compatible models
///
/// Keeps one conversation in memory, streams replies as they are generated,
/// and saves conversations to local files.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatline")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute (defaults to `chat`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for Chatline
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Model to start the session with
        #[arg(short, long)]
        model: Option<String>,

        /// Directory holding saved conversations
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// List chat-capable models and exit
    Models {
        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            command: None,
        }
    }
}
