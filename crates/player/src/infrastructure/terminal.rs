//! Line commands for the headless player.
//!
//! ```text
//! new [white|black]
//! move <source> <target> <piece> <old_position> <new_position>
//! status
//! quit
//! ```

use gambit_shared::{Orientation, Position};
use thiserror::Error;

use crate::application::session::MoveAttempt;
use crate::runner::PlayerIntent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCommand {
    Intent(PlayerIntent),
    Status,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("invalid orientation: {0}")]
    Orientation(String),
}

const NEW_USAGE: &str = "new [white|black]";
const MOVE_USAGE: &str = "move <source> <target> <piece> <old_position> <new_position>";

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<TerminalCommand>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match verb.to_ascii_lowercase().as_str() {
        "new" => {
            let orientation = match args.as_slice() {
                [] => None,
                [side] => Some(
                    side.parse::<Orientation>()
                        .map_err(|e| CommandError::Orientation(e.to_string()))?,
                ),
                _ => return Err(CommandError::Usage(NEW_USAGE)),
            };
            TerminalCommand::Intent(PlayerIntent::NewGame { orientation })
        }
        "move" => match args.as_slice() {
            [source, target, piece, old_position, new_position] => {
                TerminalCommand::Intent(PlayerIntent::AttemptMove(MoveAttempt {
                    source: source.to_string(),
                    target: target.to_string(),
                    piece: piece.to_string(),
                    old_position: Position::from(*old_position),
                    new_position: Position::from(*new_position),
                }))
            }
            _ => return Err(CommandError::Usage(MOVE_USAGE)),
        },
        "status" => TerminalCommand::Status,
        "quit" | "exit" => TerminalCommand::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}
