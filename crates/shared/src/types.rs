//! Board vocabulary shared by both sides of the wire.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// FEN placement of the standard initial board.
pub const INITIAL_POSITION: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// Side of the board a player sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    White,
    Black,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::White => "white",
            Orientation::Black => "black",
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Orientation::White => Orientation::Black,
            Orientation::Black => Orientation::White,
        }
    }

    /// White always makes the first move of a game.
    pub fn moves_first(self) -> bool {
        self == Orientation::White
    }

    /// Coin flip used when the player leaves the choice open.
    pub fn random() -> Self {
        if rand::random::<bool>() {
            Orientation::Black
        } else {
            Orientation::White
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" => Ok(Orientation::White),
            "black" => Ok(Orientation::Black),
            other => Err(ProtocolError::invalid_field(
                "orientation",
                format!("unknown orientation `{other}`"),
            )),
        }
    }
}

/// Opaque serialized board snapshot.
///
/// Compared by exact equality only; the client never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Position(String);

impl Position {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn initial() -> Self {
        Self(INITIAL_POSITION.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Position {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// Wire snapshots must carry something; an empty position means the field was absent.
impl TryFrom<String> for Position {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Err(ProtocolError::invalid_field("position", "must not be empty"));
        }
        Ok(Self(value))
    }
}

impl From<Position> for String {
    fn from(value: Position) -> Self {
        value.0
    }
}
