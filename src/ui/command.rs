//! # Command Line
//!
//! Parser for the text typed after `:`.
//!
//! | Command | Meaning |
//! |---------|---------|
//! | `Translate [lang]` | Brief translation of the selection or word under cursor |
//! | `Translate! [lang]` | Same, verbose output |
//! | `Tabs [query]` | Open the tab picker |
//! | `tabnew [file]` | Open a file (or an empty buffer) in a new tab |
//! | `split` / `sp` | Add a window on the current buffer |
//! | `w` / `write` | Save the current buffer |
//! | `q` / `quit` | Quit |

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    Translate {
        /// Target language selector, passed to the translator verbatim.
        target: Option<String>,
        verbose: bool,
    },
    Tabs {
        query: Option<String>,
    },
    TabNew(Option<PathBuf>),
    Split,
    Write,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("not an editor command: {0}")]
    Unknown(String),
    #[error("{0} does not take an argument")]
    UnexpectedArgument(String),
    #[error("{0} does not accept !")]
    UnexpectedBang(String),
}

/// Parse one command line (without the leading `:`).
pub fn parse_command(input: &str) -> Result<EditorCommand, CommandError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CommandError::Empty);
    }

    let name_end = input
        .find(|c: char| c.is_whitespace() || c == '!')
        .unwrap_or(input.len());
    let (name, rest) = input.split_at(name_end);
    let (bang, rest) = match rest.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, rest),
    };
    let argument = Some(rest.trim()).filter(|a| !a.is_empty());

    if bang && name != "Translate" {
        return Err(CommandError::UnexpectedBang(name.to_string()));
    }

    let no_argument = |command: EditorCommand| match argument {
        Some(_) => Err(CommandError::UnexpectedArgument(name.to_string())),
        None => Ok(command),
    };

    match name {
        "Translate" => Ok(EditorCommand::Translate {
            target: argument.map(str::to_string),
            verbose: bang,
        }),
        "Tabs" => Ok(EditorCommand::Tabs {
            query: argument.map(str::to_string),
        }),
        "tabnew" => Ok(EditorCommand::TabNew(argument.map(PathBuf::from))),
        "split" | "sp" => no_argument(EditorCommand::Split),
        "w" | "write" => no_argument(EditorCommand::Write),
        "q" | "quit" => no_argument(EditorCommand::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}
