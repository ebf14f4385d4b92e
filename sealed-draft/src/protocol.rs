// Messages between the terminal UI and the session task: commands going in,
// view updates coming out, and the text parser for typed commands.

use std::path::PathBuf;

use thiserror::Error;

use crate::draft::state::DraftState;

/// Commands from the user to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Pick the card at this 0-based index of the active pack.
    Pick(usize),
    Undo,
    ResetRound,
    ResetDraft,
    Status,
    Tally,
    /// Write the canonical tally to a file, or print it when no path is given.
    Export(Option<PathBuf>),
    /// Read exported tally text (current or legacy format) from a file.
    Import(PathBuf),
    Help,
    Quit,
}

/// Updates from the session task to the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    /// The draft as it stands after the latest command.
    Draft(Box<DraftState>),
    /// Result text of the latest command.
    Message(String),
}

/// Typed command reference, shown by `help`.
pub const HELP_TEXT: &str = "\
Commands (press : to type one):
  pick <n> | <n>     pick card number n from the active pack
  undo               take back the last pick (one level)
  reset-round        redraw the current round and discard its picks
  reset-draft        start a brand new draft
  status             show the draft position
  tally              show picked cards as export text
  export [file]      write the tally to file, or show it
  import <file>      read exported tally text (current or legacy format)
  help               this list
  quit               leave (the draft is saved)";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("type a command (or `help`)")]
    Empty,

    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),

    #[error("`{0}` is not a card number; cards are numbered from 1")]
    InvalidCardNumber(String),

    #[error("`{command}` needs {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },
}

/// Parse one line of input.
///
/// Card numbers are shown to the user starting at 1, so `pick 3` (or just
/// `3`) selects index 2. Everything after the command word is its argument,
/// inner spacing included.
pub fn parse_command(line: &str) -> Result<UserCommand, CommandParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(CommandParseError::Empty);
    }
    let (head, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(head, rest)| (head, rest.trim_start()));
    let arg = (!rest.is_empty()).then(|| rest.to_string());

    if head.chars().all(|c| c.is_ascii_digit()) {
        return card_number(head).map(UserCommand::Pick);
    }

    match head.to_ascii_lowercase().as_str() {
        "pick" | "p" => {
            let number = arg.ok_or(CommandParseError::MissingArgument {
                command: "pick",
                what: "a card number",
            })?;
            card_number(&number).map(UserCommand::Pick)
        }
        "undo" | "u" => Ok(UserCommand::Undo),
        "reset-round" | "resetround" => Ok(UserCommand::ResetRound),
        "reset-draft" | "resetdraft" | "new" => Ok(UserCommand::ResetDraft),
        "status" | "s" | "show" => Ok(UserCommand::Status),
        "tally" | "t" => Ok(UserCommand::Tally),
        "export" => Ok(UserCommand::Export(arg.map(PathBuf::from))),
        "import" => {
            let path = arg.ok_or(CommandParseError::MissingArgument {
                command: "import",
                what: "a file path",
            })?;
            Ok(UserCommand::Import(PathBuf::from(path)))
        }
        "help" | "h" | "?" => Ok(UserCommand::Help),
        "quit" | "q" | "exit" => Ok(UserCommand::Quit),
        other => Err(CommandParseError::Unknown(other.to_string())),
    }
}

fn card_number(text: &str) -> Result<usize, CommandParseError> {
    match text.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(CommandParseError::InvalidCardNumber(text.trim().to_string())),
    }
}
