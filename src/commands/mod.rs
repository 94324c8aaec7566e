/*!
Command handlers for the CLI

This module provides the handlers invoked by the CLI entrypoint:

- `chat`: interactive chat session
- `models`: list the chat-capable models and exit

It also holds the dispatcher that turns one parsed input line into a
session operation. The dispatcher keeps no state of its own; the
`ChatSession` it is handed is the only thing that changes.
*/

use crate::commands::special_commands::{help_text, Command, Input};
use crate::error::Result;
use crate::providers::Role;
use crate::session::{ChatSession, Reply};
use colored::Colorize;
use std::io::Write;

// Session command parser
pub mod special_commands;

// Model listing command
pub mod models;

/// What the interactive loop should do after a line was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line
    Continue,
    /// Clear the terminal, then read the next line
    ClearScreen,
    /// End the session
    Quit,
}

/// Execute one parsed input line against the session
///
/// Conversation text is appended as a user message and answered with a
/// streamed reply whose fragments are written to `out` as they arrive.
/// Commands write their confirmation to `out`.
///
/// # Errors
///
/// Returns the error of the session operation; the caller reports it and
/// carries on
pub async fn dispatch<W: Write>(
    session: &mut ChatSession,
    input: Input,
    prefix: &str,
    out: &mut W,
) -> Result<Flow> {
    let command = match input {
        Input::Message(text) => {
            session.add_message(Role::User, text);
            let reply = session
                .stream_response(|fragment| write_fragment(&mut *out, fragment))
                .await?;
            finish_reply(out, &reply)?;
            return Ok(Flow::Continue);
        }
        Input::Command(command) => command,
    };

    tracing::debug!("Dispatching {:?}", command);
    match command {
        Command::Model(name) => {
            session.set_model(&name).await?;
            writeln!(out, "Model set to {}", name.green())?;
        }
        Command::Save(name) => {
            let file_name = session.save(name.as_deref()).await?;
            writeln!(out, "Conversation saved to {}", file_name.green())?;
        }
        Command::Load(name) => {
            let file_name = session.load(&name)?;
            writeln!(
                out,
                "{}",
                format!(
                    "Loaded {} ({} messages, model {})",
                    file_name,
                    session.conversation().len(),
                    session.model()
                )
                .yellow()
            )?;
            for message in session.conversation().messages() {
                writeln!(out, "{}", loaded_line(message.role, &message.content))?;
            }
        }
        Command::Delete(name) => {
            let file_name = session.delete(&name)?;
            writeln!(out, "Deleted {}", file_name)?;
        }
        Command::Copy(n) => {
            let count = session.copy_last_n(n)?;
            writeln!(out, "Copied {} message(s) to the clipboard", count)?;
        }
        Command::CopyAll => {
            let count = session.copy_all()?;
            writeln!(out, "Copied {} message(s) to the clipboard", count)?;
        }
        Command::Reset => {
            session.reset();
            writeln!(out, "Conversation reset")?;
        }
        Command::Regen => {
            let reply = session
                .regenerate_response(|fragment| write_fragment(&mut *out, fragment))
                .await?;
            finish_reply(out, &reply)?;
        }
        Command::List => {
            let names = session.list_saved()?;
            if names.is_empty() {
                writeln!(out, "No saved conversations")?;
            }
            for name in names {
                writeln!(out, "  {}", name)?;
            }
        }
        Command::Models => {
            let models = session.list_models().await?;
            if models.is_empty() {
                writeln!(out, "No models available")?;
            }
            for model in models {
                if model == session.model() {
                    writeln!(out, "* {}", model.green())?;
                } else {
                    writeln!(out, "  {}", model)?;
                }
            }
        }
        Command::Clear => return Ok(Flow::ClearScreen),
        Command::Help => {
            writeln!(out, "{}", help_text(prefix))?;
        }
        Command::Quit => return Ok(Flow::Quit),
    }

    Ok(Flow::Continue)
}

fn loaded_line(role: Role, content: &str) -> colored::ColoredString {
    match role {
        Role::User => format!("> {}", content).cyan(),
        _ => {
            let name = role.as_str();
            let mut chars = name.chars();
            let label = match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            };
            format!("{}: {}", label, content).red()
        }
    }
}

fn write_fragment<W: Write>(out: &mut W, fragment: &str) {
    // Display only; the reply is already captured by the session
    if let Err(e) = write!(out, "{}", fragment).and_then(|_| out.flush()) {
        tracing::debug!("Failed to echo fragment: {}", e);
    }
}

fn finish_reply<W: Write>(out: &mut W, reply: &Reply) -> Result<()> {
    writeln!(out)?;
    if let Some(reason) = &reply.interrupted {
        writeln!(
            out,
            "{}",
            format!("[reply incomplete: {}]", reason).yellow()
        )?;
    }
    writeln!(out)?;
    Ok(())
}

pub mod chat {
    //! Interactive chat mode
    //!
    //! A readline-based loop that hands every non-blank line to the
    //! dispatcher and reports failures without leaving the session.

    use super::{dispatch, Flow};
    use crate::clipboard::SystemClipboard;
    use crate::commands::special_commands::{parse_input, print_help};
    use crate::config::Config;
    use crate::error::Result;
    use crate::providers::create_provider;
    use crate::session::ChatSession;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start the interactive chat session
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration (consumed)
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use chatline::commands::chat;
    /// use chatline::config::Config;
    ///
    /// # async fn example() -> anyhow::Result<()> {
    /// chat::run_chat(Config::default()).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run_chat(config: Config) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let provider = create_provider(&config.provider)?;
        let mut session = ChatSession::new(&config, provider, Box::new(SystemClipboard::new()));
        let prefix = config.chat.command_prefix.clone();

        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(session.model(), &prefix);
        print_help(&prefix);

        loop {
            let prompt = format!("{} ", ">".green().bold());
            match rl.readline(&prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line.as_str())?;

                    let input = match parse_input(&line, &prefix) {
                        Ok(input) => input,
                        Err(e) => {
                            report_error(&e);
                            continue;
                        }
                    };

                    let mut stdout = std::io::stdout();
                    match dispatch(&mut session, input, &prefix, &mut stdout).await {
                        Ok(Flow::Continue) => {}
                        Ok(Flow::ClearScreen) => rl.clear_screen()?,
                        Ok(Flow::Quit) => break,
                        Err(e) => report_error(&e),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    fn report_error(error: &anyhow::Error) {
        tracing::debug!("Command failed: {:?}", error);
        eprintln!("{}\n", format!("Error: {}", error).red());
    }

    /// Display the banner at the start of the session
    fn print_welcome_banner(model: &str, prefix: &str) {
        println!("\n{}", "Chatline".bold());
        println!("Model: {}", model.cyan());
        println!(
            "Type '{}help' for commands, '{}quit' to leave\n",
            prefix, prefix
        );
    }
}
