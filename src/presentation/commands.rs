//! Interactive commands typed on stdin while watching the feed.

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Set the table filter, or clear it with `None`
    Table(Option<String>),
    /// Set the text filter, or clear it with `None`
    Text(Option<String>),
    ClearFilters,
    /// The explicit unlock action for notification sound
    Sound,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  table <value>   show only this table (case-insensitive)
  table           clear the table filter
  text <value>    show only messages containing this text
  text            clear the text filter
  clear           clear both filters
  sound           enable notification sound
  help            show this help
  quit            exit";

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> AppResult<Option<UserCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let argument = (!rest.is_empty()).then(|| rest.to_string());

    let command = match verb.to_lowercase().as_str() {
        "table" | "t" => UserCommand::Table(argument),
        "text" | "s" | "search" => UserCommand::Text(argument),
        "clear" => UserCommand::ClearFilters,
        "sound" => UserCommand::Sound,
        "help" | "?" => UserCommand::Help,
        "quit" | "exit" | "q" => UserCommand::Quit,
        other => {
            return Err(AppError::Validation {
                field: "command".to_string(),
                reason: format!("unknown command '{other}', type `help` for a list"),
            });
        }
    };

    Ok(Some(command))
}
