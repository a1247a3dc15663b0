//! WebSocket message types for Engine-Player communication
//!
//! Every frame is an envelope `{ "type": string, "data": object }`. These types
//! are used by both Engine (sending ServerMessage, receiving ClientMessage) and
//! Player (sending ClientMessage, receiving ServerMessage).
//!
//! ## Decoding Policy
//!
//! - Envelopes are parsed first, payloads second, so a recognized type with
//!   missing fields surfaces as a `ProtocolError` rather than a JSON error
//! - Unknown message types decode to `Unknown { kind }` for forward compatibility
//! - Empty strings in optional id fields are read as absent

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ProtocolError;
use crate::ids::{GameId, PlayerId};
use crate::types::{Orientation, Position};

/// Raw `{type, data}` envelope as it travels over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

fn payload<T: DeserializeOwned>(
    kind: &str,
    data: Option<serde_json::Value>,
) -> Result<T, ProtocolError> {
    let data = data.ok_or_else(|| ProtocolError::MissingData {
        kind: kind.to_string(),
    })?;
    serde_json::from_value(data).map_err(|e| ProtocolError::InvalidPayload {
        kind: kind.to_string(),
        reason: e.to_string(),
    })
}

// =============================================================================
// Client Messages (Player → Engine)
// =============================================================================

/// Ask the engine to seat the player in a game with the given pieces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindGameData {
    pub orientation: Orientation,
    pub player_id: PlayerId,
}

/// Ask for the current state of a known game (resume)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetGameData {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub orientation: Orientation,
}

/// A move the player made locally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MakeMoveData {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub source: String,
    pub target: String,
    pub piece: String,
    pub old_position: Position,
    pub new_position: Position,
}

/// The player is leaving the game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveGameData {
    pub player_id: PlayerId,
    pub game_id: GameId,
}

/// Messages from client (Player) to server (Engine)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    FindGame(FindGameData),
    GetGame(GetGameData),
    MakeMove(MakeMoveData),
    LeaveGame(LeaveGameData),

    /// Unknown message type for forward compatibility
    #[serde(skip_serializing)]
    Unknown { kind: String },
}

impl ClientMessage {
    /// Wire name of the message type.
    pub fn kind(&self) -> &str {
        match self {
            ClientMessage::FindGame(_) => "find_game",
            ClientMessage::GetGame(_) => "get_game",
            ClientMessage::MakeMove(_) => "make_move",
            ClientMessage::LeaveGame(_) => "leave_game",
            ClientMessage::Unknown { kind } => kind,
        }
    }
}

impl TryFrom<Envelope> for ClientMessage {
    type Error = ProtocolError;

    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        let Envelope { kind, data } = envelope;
        match kind.as_str() {
            "find_game" => payload(&kind, data).map(Self::FindGame),
            "get_game" => payload(&kind, data).map(Self::GetGame),
            "make_move" => payload(&kind, data).map(Self::MakeMove),
            "leave_game" => payload(&kind, data).map(Self::LeaveGame),
            _ => Ok(Self::Unknown { kind }),
        }
    }
}

impl<'de> Deserialize<'de> for ClientMessage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let envelope = Envelope::deserialize(deserializer)?;
        Self::try_from(envelope).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Server Messages (Engine → Player)
// =============================================================================

/// Both seats are filled and the game begins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStartedData {
    pub game_id: GameId,
    pub position: Position,
    /// Player whose join completed the pairing
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub player_id: Option<PlayerId>,
}

/// Authoritative snapshot sent in answer to `get_game`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdateData {
    pub game_id: GameId,
    pub position: Position,
    /// Player who is on the move
    pub player_id: PlayerId,
}

/// A move was recorded by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveMadeData {
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub game_id: Option<GameId>,
    pub position: Position,
    /// Player who made the move
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub player_id: Option<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piece: Option<String>,
}

/// The opponent left the game
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerLeftData {
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub game_id: Option<GameId>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub player_id: Option<PlayerId>,
}

/// Error classification codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The named game does not exist (any more)
    NotFound,
    /// The requested seat belongs to someone else
    Conflict,
    /// The player has no seat in the named game
    Forbidden,
    /// Unknown code for forward compatibility
    #[serde(other)]
    Unknown,
}

/// A request could not be applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorData {
    /// Game the failed request named
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub game_id: Option<GameId>,
    pub code: ErrorCode,
    #[serde(default)]
    pub message: String,
}

/// Messages from server (Engine) to client (Player)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    GameStarted(GameStartedData),
    StateUpdate(StateUpdateData),
    MoveMade(MoveMadeData),
    PlayerLeft(PlayerLeftData),
    Error(ErrorData),

    /// Unknown message type for forward compatibility
    #[serde(skip_serializing)]
    Unknown { kind: String },
}

impl ServerMessage {
    /// Wire name of the message type.
    pub fn kind(&self) -> &str {
        match self {
            ServerMessage::GameStarted(_) => "game_started",
            ServerMessage::StateUpdate(_) => "state_update",
            ServerMessage::MoveMade(_) => "move_made",
            ServerMessage::PlayerLeft(_) => "player_left",
            ServerMessage::Error(_) => "error",
            ServerMessage::Unknown { kind } => kind,
        }
    }

    /// Game the message refers to, when it names one.
    pub fn game_id(&self) -> Option<&GameId> {
        match self {
            ServerMessage::GameStarted(data) => Some(&data.game_id),
            ServerMessage::StateUpdate(data) => Some(&data.game_id),
            ServerMessage::MoveMade(data) => data.game_id.as_ref(),
            ServerMessage::PlayerLeft(data) => data.game_id.as_ref(),
            ServerMessage::Error(data) => data.game_id.as_ref(),
            ServerMessage::Unknown { .. } => None,
        }
    }
}

impl TryFrom<Envelope> for ServerMessage {
    type Error = ProtocolError;

    fn try_from(envelope: Envelope) -> Result<Self, ProtocolError> {
        let Envelope { kind, data } = envelope;
        match kind.as_str() {
            "game_started" => payload(&kind, data).map(Self::GameStarted),
            "state_update" => payload(&kind, data).map(Self::StateUpdate),
            "move_made" => payload(&kind, data).map(Self::MoveMade),
            // Nothing in the payload is required to act on a departure
            "player_left" => match data {
                Some(data) => payload(&kind, Some(data)).map(Self::PlayerLeft),
                None => Ok(Self::PlayerLeft(PlayerLeftData::default())),
            },
            "error" => payload(&kind, data).map(Self::Error),
            _ => Ok(Self::Unknown { kind }),
        }
    }
}

impl<'de> Deserialize<'de> for ServerMessage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let envelope = Envelope::deserialize(deserializer)?;
        Self::try_from(envelope).map_err(serde::de::Error::custom)
    }
}
