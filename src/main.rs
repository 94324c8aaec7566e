//! Chatline - interactive chat CLI
//!
#![doc = "Chatline - interactive chat CLI"]
#![doc = "Main entry point for the Chatline application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chatline::cli::{Cli, Commands};
use chatline::commands;
use chatline::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Some(Commands::Models { json }) => {
            tracing::info!("Starting model listing");
            commands::models::list_models(&config, json).await?;
            Ok(())
        }
        Some(Commands::Chat { .. }) | None => {
            // --model and --dir were already folded into `config`
            commands::chat::run_chat(config).await?;
            Ok(())
        }
    }
}

/// Install the tracing subscriber
///
/// Records go to stderr so they never interleave with replies streamed to
/// stdout. `RUST_LOG` takes precedence over the `--verbose` default.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "chatline=debug"
    } else {
        "chatline=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
