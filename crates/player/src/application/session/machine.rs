//! Session transition function.

use gambit_shared::{
    ClientMessage, ErrorCode, ErrorData, FindGameData, GameId, GameStartedData, GetGameData,
    LeaveGameData, MakeMoveData, MoveMadeData, Orientation, PlayerId, ServerMessage,
    StateUpdateData,
};
use thiserror::Error;

use super::events::{is_clean_close, Effect, MoveAttempt, SessionEvent, ViewUpdate};
use super::reconcile::{reconcile, TurnRule};
use super::state::{Phase, SessionState};
use crate::ports::outbound::ViewNotice;

/// Why a local move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveRejection {
    #[error("no game in progress")]
    NoActiveGame,
    #[error("not this player's turn")]
    NotYourTurn,
    #[error("the position did not change")]
    NothingMoved,
}

/// Owns the [`SessionState`] and applies events to it.
#[derive(Debug, Clone)]
pub struct SessionMachine {
    player_id: PlayerId,
    state: SessionState,
    /// Between `ConnectionOpened` and `ConnectionClosed`.
    connected: bool,
}

impl SessionMachine {
    pub fn new(player_id: PlayerId, state: SessionState) -> Self {
        Self {
            player_id,
            state,
            connected: false,
        }
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Apply one event and return the effects to perform, in order.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<Effect> {
        match event {
            SessionEvent::NewGame { orientation } => self.new_game(orientation),
            SessionEvent::AttemptMove(attempt) => self.attempt_move(attempt),
            SessionEvent::ConnectionOpened => self.connection_opened(),
            SessionEvent::ConnectionClosed { code } => self.connection_closed(code),
            SessionEvent::Inbound(message) => self.inbound(message),
        }
    }

    /// Check a local move against the current state without applying it.
    pub fn validate_move(&self, attempt: &MoveAttempt) -> Result<GameId, MoveRejection> {
        let game_id = match (self.state.phase, self.state.game_id()) {
            (Phase::Active, Some(game_id)) => game_id.clone(),
            _ => return Err(MoveRejection::NoActiveGame),
        };
        if !self.state.my_turn {
            return Err(MoveRejection::NotYourTurn);
        }
        if attempt.old_position == attempt.new_position {
            return Err(MoveRejection::NothingMoved);
        }
        Ok(game_id)
    }

    // -------------------------------------------------------------------------
    // Player intents
    // -------------------------------------------------------------------------

    fn new_game(&mut self, orientation: Orientation) -> Vec<Effect> {
        let mut effects = Vec::new();

        if self.state.phase != Phase::Idle || self.state.game_id().is_some() {
            tracing::info!(
                phase = ?self.state.phase,
                game_id = ?self.state.game_id(),
                "Abandoning current session for a new game"
            );
            effects.push(Effect::ClearHandle);
        }

        self.state = SessionState::new(orientation);
        self.state.phase = Phase::Seeking;

        effects.push(Effect::View(ViewUpdate::ResetBoard { orientation }));
        // Offline, the request goes out once the connection opens.
        if self.connected {
            effects.push(Effect::Send(self.find_game()));
        } else {
            tracing::debug!("Not connected yet, find_game waits for the connection");
        }
        effects
    }

    fn attempt_move(&mut self, attempt: MoveAttempt) -> Vec<Effect> {
        let game_id = match self.validate_move(&attempt) {
            Ok(game_id) => game_id,
            Err(reason) => {
                tracing::debug!(
                    %reason,
                    source = %attempt.source,
                    target = %attempt.target,
                    "Rejecting local move"
                );
                return vec![Effect::notice(ViewNotice::MoveRejected)];
            }
        };

        // Optimistic: the engine's echo of this move will then compare equal.
        self.state.my_turn = false;
        self.state.position = Some(attempt.new_position.clone());

        vec![Effect::Send(ClientMessage::MakeMove(MakeMoveData {
            game_id,
            player_id: self.player_id,
            source: attempt.source,
            target: attempt.target,
            piece: attempt.piece,
            old_position: attempt.old_position,
            new_position: attempt.new_position,
        }))]
    }

    // -------------------------------------------------------------------------
    // Connection lifecycle
    // -------------------------------------------------------------------------

    fn connection_opened(&mut self) -> Vec<Effect> {
        self.connected = true;
        match (self.state.phase, self.state.game_id().cloned()) {
            // A fresh connection carries no registration, so ask again.
            (Phase::Seeking, _) => {
                tracing::info!("Connection opened while seeking, re-sending find_game");
                vec![Effect::Send(self.find_game())]
            }
            (Phase::Idle | Phase::Resuming | Phase::Ended, Some(game_id)) => {
                tracing::info!(%game_id, "Connection opened, resuming game");
                self.state.phase = Phase::Resuming;
                vec![Effect::Send(ClientMessage::GetGame(GetGameData {
                    game_id,
                    player_id: self.player_id,
                    orientation: self.state.orientation(),
                }))]
            }
            (phase, _) => {
                tracing::debug!(?phase, "Connection opened, nothing to resume");
                Vec::new()
            }
        }
    }

    fn connection_closed(&mut self, code: u16) -> Vec<Effect> {
        self.connected = false;
        if is_clean_close(code) {
            tracing::info!(phase = ?self.state.phase, "Connection closed normally");
            return Vec::new();
        }

        tracing::warn!(code, phase = ?self.state.phase, "Connection closed abnormally");

        match (self.state.phase, self.state.game_id().cloned()) {
            (Phase::Active, Some(game_id)) => {
                self.state.phase = Phase::Ended;
                vec![
                    Effect::Send(ClientMessage::LeaveGame(LeaveGameData {
                        player_id: self.player_id,
                        game_id,
                    })),
                    Effect::notice(ViewNotice::ConnectionLost),
                ]
            }
            _ => vec![Effect::notice(ViewNotice::ConnectionLost)],
        }
    }

    // -------------------------------------------------------------------------
    // Inbound messages
    // -------------------------------------------------------------------------

    fn inbound(&mut self, message: ServerMessage) -> Vec<Effect> {
        if let (Some(held), Some(named)) = (self.state.game_id(), message.game_id()) {
            if held != named {
                tracing::warn!(
                    held = %held,
                    named = %named,
                    kind = message.kind(),
                    "Ignoring message for another game"
                );
                return Vec::new();
            }
        }

        match message {
            ServerMessage::GameStarted(data) => self.game_started(data),
            ServerMessage::StateUpdate(data) => self.state_update(data),
            ServerMessage::MoveMade(data) => self.move_made(data),
            ServerMessage::PlayerLeft(_) => self.player_left(),
            ServerMessage::Error(data) => self.request_failed(data),
            ServerMessage::Unknown { kind } => {
                tracing::warn!(kind = %kind, "Ignoring unknown message type");
                Vec::new()
            }
        }
    }

    fn game_started(&mut self, data: GameStartedData) -> Vec<Effect> {
        match self.state.phase {
            Phase::Seeking | Phase::Resuming => {}
            Phase::Active => {
                tracing::debug!(game_id = %data.game_id, "Ignoring duplicate game_started");
                return Vec::new();
            }
            phase => {
                tracing::warn!(?phase, game_id = %data.game_id, "Unexpected game_started");
                return Vec::new();
            }
        }

        tracing::info!(
            game_id = %data.game_id,
            orientation = %self.state.orientation(),
            "Game started"
        );

        let outcome = reconcile(
            self.state.position(),
            &data.position,
            TurnRule::Owner(self.state.orientation().moves_first()),
        );

        self.state.handle.game_id = Some(data.game_id);
        self.state.phase = Phase::Active;
        self.state.my_turn = outcome.turn.apply_to(self.state.my_turn);

        let mut effects = vec![Effect::PersistHandle(self.state.handle.clone())];
        if outcome.apply {
            self.state.position = Some(data.position.clone());
            effects.push(Effect::render(data.position));
        }
        effects.push(Effect::notice(ViewNotice::GameStarted));
        effects
    }

    fn state_update(&mut self, data: StateUpdateData) -> Vec<Effect> {
        let resuming = match self.state.phase {
            Phase::Resuming => true,
            Phase::Active => false,
            phase => {
                tracing::debug!(?phase, game_id = %data.game_id, "Ignoring state_update");
                return Vec::new();
            }
        };

        let owner_is_me = data.player_id == self.player_id;
        let outcome = reconcile(
            self.state.position(),
            &data.position,
            TurnRule::Owner(owner_is_me),
        );

        self.state.handle.game_id = Some(data.game_id);
        self.state.phase = Phase::Active;
        self.state.my_turn = outcome.turn.apply_to(self.state.my_turn);

        let mut effects = Vec::new();
        if resuming {
            tracing::info!(my_turn = self.state.my_turn, "Game resumed");
            effects.push(Effect::PersistHandle(self.state.handle.clone()));
        }
        if outcome.apply {
            self.state.position = Some(data.position.clone());
            effects.push(Effect::render(data.position));
        }
        if resuming {
            effects.push(Effect::notice(ViewNotice::GameStarted));
        }
        effects
    }

    fn move_made(&mut self, data: MoveMadeData) -> Vec<Effect> {
        if self.state.phase != Phase::Active {
            tracing::debug!(phase = ?self.state.phase, "Ignoring move_made outside a game");
            return Vec::new();
        }

        let outcome = reconcile(self.state.position(), &data.position, TurnRule::Alternate);
        if !outcome.apply {
            tracing::debug!(position = %data.position, "Suppressing duplicate move_made");
            return Vec::new();
        }

        self.state.my_turn = outcome.turn.apply_to(self.state.my_turn);
        self.state.position = Some(data.position.clone());
        tracing::debug!(my_turn = self.state.my_turn, "Applied move_made");

        vec![Effect::render(data.position)]
    }

    fn player_left(&mut self) -> Vec<Effect> {
        if self.state.phase != Phase::Active {
            tracing::debug!(phase = ?self.state.phase, "Ignoring player_left outside a game");
            return Vec::new();
        }
        tracing::info!(game_id = ?self.state.game_id(), "Opponent left");
        vec![Effect::notice(ViewNotice::OpponentLeft)]
    }

    fn request_failed(&mut self, data: ErrorData) -> Vec<Effect> {
        let game_gone = match (self.state.phase, data.code) {
            (Phase::Resuming, _) | (Phase::Active, ErrorCode::NotFound) => true,
            (Phase::Active, _) => false,
            (phase, code) => {
                tracing::warn!(?phase, ?code, message = %data.message, "Engine refused request");
                return Vec::new();
            }
        };

        if !game_gone {
            tracing::warn!(code = ?data.code, message = %data.message, "Engine refused move");
            return vec![Effect::notice(ViewNotice::MoveRejected)];
        }

        tracing::warn!(
            game_id = ?self.state.game_id(),
            code = ?data.code,
            message = %data.message,
            "Game is no longer available, forgetting it"
        );
        self.state = SessionState::new(self.state.orientation());
        vec![
            Effect::ClearHandle,
            Effect::notice(ViewNotice::GameUnavailable),
        ]
    }

    fn find_game(&self) -> ClientMessage {
        ClientMessage::FindGame(FindGameData {
            orientation: self.state.orientation(),
            player_id: self.player_id,
        })
    }
}
