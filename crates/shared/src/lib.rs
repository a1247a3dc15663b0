//! Gambit Shared - wire vocabulary for Engine and Player communication
//!
//! This crate contains the types both sides of the WebSocket agree on:
//! - Identifiers (`PlayerId`, `GameId`)
//! - Board vocabulary (`Orientation`, `Position`)
//! - Envelope types (`ClientMessage`, `ServerMessage`)
//! - The newline-delimited frame codec
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - serde, serde_json, uuid, thiserror, tracing
//! 2. **No session logic** - pure data types and serialization
//! 3. **Tolerant decoding** - a bad frame never poisons the rest of a batch

pub mod codec;
pub mod error;
pub mod ids;
pub mod messages;
pub mod types;

pub use codec::{decode_batch, decode_frame, encode, encode_batch};
pub use error::ProtocolError;
pub use ids::{GameId, PlayerId};
pub use messages::{
    ClientMessage, Envelope, ErrorCode, ErrorData, FindGameData, GameStartedData, GetGameData,
    LeaveGameData, MakeMoveData, MoveMadeData, PlayerLeftData, ServerMessage, StateUpdateData,
};
pub use types::{Orientation, Position, INITIAL_POSITION};
