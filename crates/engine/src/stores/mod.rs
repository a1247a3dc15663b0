//! In-memory state storage modules.
//!
//! - `GameRegistry` - games, seats and move history

pub mod games;

pub use games::{ConnectionId, Delivery, Game, GameRegistry, RecordedMove, Seat};
