//! Engine error types.

use gambit_shared::{ErrorCode, GameId, Orientation, PlayerId};
use thiserror::Error;
use uuid::Uuid;

/// Reasons a client request could not be applied.
///
/// None of these are fatal; the WebSocket layer logs them and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("game not found: {0}")]
    GameNotFound(GameId),

    #[error("seat {orientation} in game {game_id} is taken")]
    GameFull {
        game_id: GameId,
        orientation: Orientation,
    },

    #[error("player {player_id} is not seated in game {game_id}")]
    NotSeated { game_id: GameId, player_id: PlayerId },

    #[error("unknown connection: {0}")]
    UnknownConnection(Uuid),

    #[error("connection {0} is not accepting messages")]
    ConnectionBackpressure(Uuid),
}

impl EngineError {
    /// Code reported to the client that made the request.
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::GameNotFound(_) => ErrorCode::NotFound,
            EngineError::GameFull { .. } => ErrorCode::Conflict,
            EngineError::NotSeated { .. } => ErrorCode::Forbidden,
            EngineError::UnknownConnection(_) | EngineError::ConnectionBackpressure(_) => {
                ErrorCode::Unknown
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_errors_map_to_wire_codes() {
        let game_id = GameId::new("g1").unwrap();
        assert_eq!(
            EngineError::GameNotFound(game_id.clone()).code(),
            ErrorCode::NotFound
        );
        assert_eq!(
            EngineError::GameFull {
                game_id: game_id.clone(),
                orientation: Orientation::White,
            }
            .code(),
            ErrorCode::Conflict
        );
        assert_eq!(
            EngineError::NotSeated {
                game_id,
                player_id: PlayerId::new(),
            }
            .code(),
            ErrorCode::Forbidden
        );
    }
}
