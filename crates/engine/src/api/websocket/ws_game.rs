use gambit_shared::{ErrorData, FindGameData, GameId, GetGameData, LeaveGameData, MakeMoveData};

use super::*;
use crate::error::EngineError;

/// Reply addressed to the connection whose request failed.
pub(super) fn error_response(
    connection_id: ConnectionId,
    game_id: GameId,
    error: &EngineError,
) -> Vec<Delivery> {
    vec![(
        connection_id,
        ServerMessage::Error(ErrorData {
            game_id: Some(game_id),
            code: error.code(),
            message: error.to_string(),
        }),
    )]
}

pub(super) async fn handle_find_game(
    state: &WsState,
    connection_id: ConnectionId,
    data: FindGameData,
) -> Vec<Delivery> {
    state.games.find_game(connection_id, data).await
}

pub(super) async fn handle_get_game(
    state: &WsState,
    connection_id: ConnectionId,
    data: GetGameData,
) -> Vec<Delivery> {
    let game_id = data.game_id.clone();
    match state.games.get_game(connection_id, data).await {
        Ok(deliveries) => deliveries,
        Err(e) => {
            tracing::warn!(
                connection_id = %connection_id,
                %game_id,
                error = %e,
                "get_game failed"
            );
            error_response(connection_id, game_id, &e)
        }
    }
}

pub(super) async fn handle_make_move(
    state: &WsState,
    connection_id: ConnectionId,
    data: MakeMoveData,
) -> Vec<Delivery> {
    let game_id = data.game_id.clone();
    match state.games.make_move(connection_id, data).await {
        Ok(deliveries) => deliveries,
        Err(e) => {
            tracing::warn!(
                connection_id = %connection_id,
                %game_id,
                error = %e,
                "make_move failed"
            );
            error_response(connection_id, game_id, &e)
        }
    }
}

pub(super) async fn handle_leave_game(
    state: &WsState,
    connection_id: ConnectionId,
    data: LeaveGameData,
) -> Vec<Delivery> {
    let game_id = data.game_id.clone();
    // Nobody waits on the outcome of a leave.
    state.games.leave_game(data).await.unwrap_or_else(|e| {
        tracing::warn!(
            connection_id = %connection_id,
            %game_id,
            error = %e,
            "leave_game failed"
        );
        Vec::new()
    })
}
