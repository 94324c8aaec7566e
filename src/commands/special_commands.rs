//! Session command parser for interactive chat
//!
//! An input line whose first token starts with the command prefix (`?` by
//! default) is a session command; any other line is conversation text and is
//! kept exactly as typed. Command names are case-insensitive and most have a
//! short alias. Arguments are taken positionally and extra ones are ignored.

use crate::error::{ChatlineError, Result};

/// The closed set of session commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Model,
    Save,
    Load,
    Delete,
    Copy,
    CopyAll,
    Reset,
    Regen,
    List,
    Models,
    Clear,
    Help,
    Quit,
}

impl CommandKind {
    /// Every command, in help order
    pub const ALL: [CommandKind; 13] = [
        CommandKind::Model,
        CommandKind::Save,
        CommandKind::Load,
        CommandKind::Delete,
        CommandKind::Copy,
        CommandKind::CopyAll,
        CommandKind::Reset,
        CommandKind::Regen,
        CommandKind::List,
        CommandKind::Models,
        CommandKind::Clear,
        CommandKind::Help,
        CommandKind::Quit,
    ];

    /// Recognised names; the first is the canonical one
    pub fn names(&self) -> &'static [&'static str] {
        match self {
            CommandKind::Model => &["model"],
            CommandKind::Save => &["save"],
            CommandKind::Load => &["load"],
            CommandKind::Delete => &["delete"],
            CommandKind::Copy => &["copy", "cp"],
            CommandKind::CopyAll => &["copyall", "cpall"],
            CommandKind::Reset => &["reset", "rst"],
            CommandKind::Regen => &["regen", "rg"],
            CommandKind::List => &["list", "lst"],
            CommandKind::Models => &["models", "mdl"],
            CommandKind::Clear => &["clear", "clr"],
            CommandKind::Help => &["help", "h"],
            CommandKind::Quit => &["quit", "exit", "q"],
        }
    }

    /// Argument placeholder shown in usage lines
    pub fn args(&self) -> &'static str {
        match self {
            CommandKind::Model => "<name>",
            CommandKind::Save => "[filename]",
            CommandKind::Load | CommandKind::Delete => "<filename>",
            CommandKind::Copy => "[n]",
            _ => "",
        }
    }

    /// One-line summary for the help listing
    pub fn description(&self) -> &'static str {
        match self {
            CommandKind::Model => "Switch the active model",
            CommandKind::Save => "Save the conversation (name generated when omitted)",
            CommandKind::Load => "Replace the conversation with a saved one",
            CommandKind::Delete => "Delete a saved conversation",
            CommandKind::Copy => "Copy the last n messages to the clipboard (default 1)",
            CommandKind::CopyAll => "Copy the whole conversation to the clipboard",
            CommandKind::Reset => "Start a new, empty conversation",
            CommandKind::Regen => "Regenerate the last reply",
            CommandKind::List => "List saved conversations",
            CommandKind::Models => "List available models",
            CommandKind::Clear => "Clear the screen",
            CommandKind::Help => "Show this help",
            CommandKind::Quit => "End the session",
        }
    }

    /// Look up a command by name or alias, ignoring case
    ///
    /// # Examples
    ///
    /// ```
    /// use chatline::commands::special_commands::CommandKind;
    ///
    /// assert_eq!(CommandKind::from_name("CP"), Some(CommandKind::Copy));
    /// assert_eq!(CommandKind::from_name("nope"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.names().contains(&lower.as_str()))
    }

    /// Usage line with the given prefix, e.g. `?copy [n]`
    pub fn usage(&self, prefix: &str) -> String {
        let args = self.args();
        if args.is_empty() {
            format!("{}{}", prefix, self.names()[0])
        } else {
            format!("{}{} {}", prefix, self.names()[0], args)
        }
    }
}

/// A parsed session command with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Model(String),
    Save(Option<String>),
    Load(String),
    Delete(String),
    Copy(usize),
    CopyAll,
    Reset,
    Regen,
    List,
    Models,
    Clear,
    Help,
    Quit,
}

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Conversation text, exactly as typed
    Message(String),
    /// A session command
    Command(Command),
}

/// Parse a line of user input
///
/// # Arguments
///
/// * `line` - The line as read from the terminal
/// * `prefix` - Token that marks a session command
///
/// # Errors
///
/// Returns `ChatlineError::InvalidCommand` for a prefixed token that names no
/// command, `ChatlineError::MissingArgument` when a required argument is
/// absent and `ChatlineError::InvalidArgument` for a copy count that is not a
/// positive integer
///
/// # Examples
///
/// ```
/// use chatline::commands::special_commands::{parse_input, Command, Input};
///
/// assert_eq!(parse_input("?cp 3", "?").unwrap(), Input::Command(Command::Copy(3)));
/// assert_eq!(
///     parse_input("what is ?this", "?").unwrap(),
///     Input::Message("what is ?this".to_string())
/// );
/// assert!(parse_input("?nope", "?").is_err());
/// ```
pub fn parse_input(line: &str, prefix: &str) -> Result<Input> {
    let mut tokens = line.split_whitespace();
    let first = match tokens.next() {
        Some(token) => token,
        None => return Ok(Input::Message(line.to_string())),
    };

    let name = match first.strip_prefix(prefix) {
        Some(name) => name,
        None => return Ok(Input::Message(line.to_string())),
    };

    let kind = CommandKind::from_name(name)
        .ok_or_else(|| ChatlineError::InvalidCommand(first.to_string()))?;
    let arg = tokens.next();

    let required = |arg: Option<&str>| -> Result<String> {
        arg.map(str::to_string).ok_or_else(|| {
            ChatlineError::MissingArgument {
                command: first.to_string(),
                usage: kind.usage(prefix),
            }
            .into()
        })
    };

    let command = match kind {
        CommandKind::Model => Command::Model(required(arg)?),
        CommandKind::Save => Command::Save(arg.map(str::to_string)),
        CommandKind::Load => Command::Load(required(arg)?),
        CommandKind::Delete => Command::Delete(required(arg)?),
        CommandKind::Copy => match arg {
            None => Command::Copy(1),
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => Command::Copy(n),
                _ => {
                    return Err(ChatlineError::InvalidArgument {
                        command: first.to_string(),
                        arg: raw.to_string(),
                        usage: kind.usage(prefix),
                    }
                    .into())
                }
            },
        },
        CommandKind::CopyAll => Command::CopyAll,
        CommandKind::Reset => Command::Reset,
        CommandKind::Regen => Command::Regen,
        CommandKind::List => Command::List,
        CommandKind::Models => Command::Models,
        CommandKind::Clear => Command::Clear,
        CommandKind::Help => Command::Help,
        CommandKind::Quit => Command::Quit,
    };

    Ok(Input::Command(command))
}

/// Help text listing every command and its aliases
pub fn help_text(prefix: &str) -> String {
    let rows: Vec<(String, String, &str)> = CommandKind::ALL
        .iter()
        .map(|kind| {
            let aliases = kind.names()[1..]
                .iter()
                .map(|alias| format!("{}{}", prefix, alias))
                .collect::<Vec<_>>()
                .join(", ");
            (kind.usage(prefix), aliases, kind.description())
        })
        .collect();

    let usage_width = rows.iter().map(|r| r.0.len()).max().unwrap_or(0);
    let alias_width = rows.iter().map(|r| r.1.len()).max().unwrap_or(0);

    let mut text = String::from("Commands:\n");
    for (usage, aliases, description) in rows {
        text.push_str(&format!(
            "  {:<uw$}  {:<aw$}  {}\n",
            usage,
            aliases,
            description,
            uw = usage_width,
            aw = alias_width
        ));
    }
    text.push_str("\nAnything else is sent to the model as a message.\n");
    text
}

/// Print the command help
pub fn print_help(prefix: &str) {
    println!("{}", help_text(prefix));
}
