//! In-memory game registry.
//!
//! Owns every game the engine knows about: which player sits in which seat,
//! which connection is currently attached to each seat, the position and the
//! move history. Operations return the messages they produce as
//! [`Delivery`] values; sending them is the caller's business.

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use gambit_shared::{
    FindGameData, GameId, GameStartedData, GetGameData, LeaveGameData, MakeMoveData,
    MoveMadeData, Orientation, PlayerId, PlayerLeftData, Position, ServerMessage,
    StateUpdateData,
};

use crate::error::EngineError;

pub type ConnectionId = Uuid;

/// One outbound message addressed to one connection.
pub type Delivery = (ConnectionId, ServerMessage);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedMove {
    pub player_id: PlayerId,
    pub source: String,
    pub target: String,
    pub piece: String,
}

/// A seat remembers its player across reconnects; the connection comes and goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Seat {
    pub player_id: Option<PlayerId>,
    pub connection: Option<ConnectionId>,
}

impl Seat {
    pub fn is_claimed(&self) -> bool {
        self.player_id.is_some()
    }

    fn attach(&mut self, player_id: PlayerId, connection: ConnectionId) {
        self.player_id = Some(player_id);
        self.connection = Some(connection);
    }
}

#[derive(Debug, Clone)]
pub struct Game {
    pub id: GameId,
    pub position: Position,
    pub moves: Vec<RecordedMove>,
    pub white: Seat,
    pub black: Seat,
    seq: u64,
}

impl Game {
    fn new(id: GameId, seq: u64) -> Self {
        Self {
            id,
            position: Position::initial(),
            moves: Vec::new(),
            white: Seat::default(),
            black: Seat::default(),
            seq,
        }
    }

    pub fn seat(&self, orientation: Orientation) -> &Seat {
        match orientation {
            Orientation::White => &self.white,
            Orientation::Black => &self.black,
        }
    }

    fn seat_mut(&mut self, orientation: Orientation) -> &mut Seat {
        match orientation {
            Orientation::White => &mut self.white,
            Orientation::Black => &mut self.black,
        }
    }

    pub fn is_full(&self) -> bool {
        self.white.is_claimed() && self.black.is_claimed()
    }

    /// Side to move: white after an even number of moves.
    pub fn on_move(&self) -> Orientation {
        if self.moves.len() % 2 == 0 {
            Orientation::White
        } else {
            Orientation::Black
        }
    }

    pub fn orientation_of(&self, player_id: PlayerId) -> Option<Orientation> {
        [Orientation::White, Orientation::Black]
            .into_iter()
            .find(|&o| self.seat(o).player_id == Some(player_id))
    }

    fn has_connections(&self) -> bool {
        self.white.connection.is_some() || self.black.connection.is_some()
    }

    fn broadcast(&self, message: ServerMessage) -> Vec<Delivery> {
        [&self.white, &self.black]
            .into_iter()
            .filter_map(|seat| seat.connection)
            .map(|connection| (connection, message.clone()))
            .collect()
    }

    fn notify_opponent(&self, leaver: Orientation, player_id: Option<PlayerId>) -> Vec<Delivery> {
        let Some(connection) = self.seat(leaver.opponent()).connection else {
            return Vec::new();
        };
        vec![(
            connection,
            ServerMessage::PlayerLeft(PlayerLeftData {
                game_id: Some(self.id.clone()),
                player_id,
            }),
        )]
    }
}

#[derive(Default)]
struct Registry {
    games: HashMap<GameId, Game>,
    next_seq: u64,
}

impl Registry {
    fn create(&mut self) -> GameId {
        let id = GameId::generate();
        let seq = self.next_seq;
        self.next_seq += 1;
        tracing::info!(game_id = %id, "New game created");
        self.games.insert(id.clone(), Game::new(id.clone(), seq));
        id
    }

    fn game_mut(&mut self, game_id: &GameId) -> Result<&mut Game, EngineError> {
        self.games
            .get_mut(game_id)
            .ok_or_else(|| EngineError::GameNotFound(game_id.clone()))
    }

    /// Free every seat the player holds and tell the opponents.
    ///
    /// Returns the notices and the games that were touched.
    fn release_player(&mut self, player_id: PlayerId) -> (Vec<Delivery>, Vec<GameId>) {
        let mut deliveries = Vec::new();
        let mut released = Vec::new();

        for game in self.games.values_mut() {
            let Some(seat) = game.orientation_of(player_id) else {
                continue;
            };
            *game.seat_mut(seat) = Seat::default();
            tracing::info!(game_id = %game.id, %player_id, "Player abandoned game");
            deliveries.extend(game.notify_opponent(seat, Some(player_id)));
            released.push(game.id.clone());
        }

        for game_id in &released {
            self.drop_if_abandoned(game_id);
        }
        (deliveries, released)
    }

    fn drop_if_abandoned(&mut self, game_id: &GameId) {
        if let Some(game) = self.games.get(game_id) {
            if !game.has_connections() {
                tracing::info!(%game_id, "Deleting game");
                self.games.remove(game_id);
            }
        }
    }
}

/// All games on this engine, behind one async lock.
#[derive(Default)]
pub struct GameRegistry {
    inner: RwLock<Registry>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seat the player in the oldest waiting game with the requested seat
    /// free, or in a new game. Starts the game once both seats are taken.
    ///
    /// A player asking again for the seat it already waits in keeps it. Any
    /// other seat the player holds is given up first, so asking for a game
    /// while seated in a started one means starting over.
    pub async fn find_game(&self, connection: ConnectionId, data: FindGameData) -> Vec<Delivery> {
        let FindGameData {
            orientation,
            player_id,
        } = data;
        tracing::info!(%player_id, %orientation, "Finding a game");

        let mut registry = self.inner.write().await;

        if let Some(game) = registry.games.values_mut().find(|g| {
            !g.is_full() && g.seat(orientation).player_id == Some(player_id)
        }) {
            game.seat_mut(orientation).connection = Some(connection);
            tracing::debug!(game_id = %game.id, %player_id, "Seeker re-attached");
            return Vec::new();
        }

        let (mut deliveries, released) = registry.release_player(player_id);

        let waiting = registry
            .games
            .values()
            .filter(|g| {
                !g.seat(orientation).is_claimed()
                    && g.seat(orientation.opponent()).player_id != Some(player_id)
                    && !released.contains(&g.id)
            })
            .min_by_key(|g| g.seq)
            .map(|g| g.id.clone());

        let game_id = match waiting {
            Some(game_id) => game_id,
            None => {
                tracing::info!("Suitable game not found, creating a new game");
                registry.create()
            }
        };
        let game = match registry.game_mut(&game_id) {
            Ok(game) => game,
            Err(e) => {
                tracing::warn!(error = %e, "Matched game vanished");
                return deliveries;
            }
        };

        game.seat_mut(orientation).attach(player_id, connection);
        tracing::info!(game_id = %game.id, %player_id, %orientation, "Player joined game");

        if game.is_full() {
            deliveries.extend(game.broadcast(ServerMessage::GameStarted(GameStartedData {
                game_id: game.id.clone(),
                position: game.position.clone(),
                player_id: Some(player_id),
            })));
        }
        deliveries
    }

    /// Attach the connection to the player's seat (or the requested seat if
    /// nobody is connected to it) and tell everyone where the game stands.
    pub async fn get_game(
        &self,
        connection: ConnectionId,
        data: GetGameData,
    ) -> Result<Vec<Delivery>, EngineError> {
        let GetGameData {
            game_id,
            player_id,
            orientation,
        } = data;

        let mut registry = self.inner.write().await;
        let game = registry.game_mut(&game_id)?;

        // A seat whose occupant has no live connection can be taken over, so
        // a restarted client holding only the game id gets its seat back.
        let seat = match game.orientation_of(player_id) {
            Some(seated) => seated,
            None if game.seat(orientation).connection.is_none() => orientation,
            None => {
                return Err(EngineError::GameFull {
                    game_id,
                    orientation,
                })
            }
        };
        game.seat_mut(seat).attach(player_id, connection);
        tracing::info!(%game_id, %player_id, orientation = %seat, "Player attached to game");

        let Some(owner) = game.seat(game.on_move()).player_id else {
            tracing::debug!(%game_id, "Side to move has no player yet, no state_update");
            return Ok(Vec::new());
        };
        Ok(game.broadcast(ServerMessage::StateUpdate(StateUpdateData {
            game_id: game.id.clone(),
            position: game.position.clone(),
            player_id: owner,
        })))
    }

    /// Record the move and relay the new position to both seats.
    pub async fn make_move(
        &self,
        connection: ConnectionId,
        data: MakeMoveData,
    ) -> Result<Vec<Delivery>, EngineError> {
        let mut registry = self.inner.write().await;
        let game = registry.game_mut(&data.game_id)?;
        let seat = game
            .orientation_of(data.player_id)
            .ok_or_else(|| EngineError::NotSeated {
                game_id: data.game_id.clone(),
                player_id: data.player_id,
            })?;
        game.seat_mut(seat).connection = Some(connection);

        // Moves are not validated; the mover's view of the board is taken as is.
        game.position = data.new_position;
        game.moves.push(RecordedMove {
            player_id: data.player_id,
            source: data.source.clone(),
            target: data.target.clone(),
            piece: data.piece.clone(),
        });
        tracing::debug!(
            game_id = %game.id,
            player_id = %data.player_id,
            moves = game.moves.len(),
            "Move recorded"
        );

        Ok(game.broadcast(ServerMessage::MoveMade(MoveMadeData {
            game_id: Some(game.id.clone()),
            position: game.position.clone(),
            player_id: Some(data.player_id),
            source: Some(data.source),
            target: Some(data.target),
            piece: Some(data.piece),
        })))
    }

    /// Give up the seat for good and tell the opponent.
    pub async fn leave_game(&self, data: LeaveGameData) -> Result<Vec<Delivery>, EngineError> {
        let mut registry = self.inner.write().await;
        let game = registry.game_mut(&data.game_id)?;
        let seat = game
            .orientation_of(data.player_id)
            .ok_or_else(|| EngineError::NotSeated {
                game_id: data.game_id.clone(),
                player_id: data.player_id,
            })?;

        *game.seat_mut(seat) = Seat::default();
        tracing::info!(game_id = %game.id, player_id = %data.player_id, "Player left game");
        let deliveries = game.notify_opponent(seat, Some(data.player_id));

        registry.drop_if_abandoned(&data.game_id);
        Ok(deliveries)
    }

    /// Detach a closed connection from every seat it held.
    ///
    /// Seats keep their player so the game can be resumed with `get_game`.
    /// Games left with no attached connection are deleted.
    pub async fn disconnect(&self, connection: ConnectionId) -> Vec<Delivery> {
        let mut registry = self.inner.write().await;
        let mut deliveries = Vec::new();
        let mut touched = Vec::new();

        for game in registry.games.values_mut() {
            for orientation in [Orientation::White, Orientation::Black] {
                let seat = game.seat_mut(orientation);
                if seat.connection != Some(connection) {
                    continue;
                }
                seat.connection = None;
                let player_id = seat.player_id;
                deliveries.extend(game.notify_opponent(orientation, player_id));
                touched.push(game.id.clone());
            }
        }

        for game_id in &touched {
            registry.drop_if_abandoned(game_id);
        }
        deliveries
    }

    pub async fn game(&self, game_id: &GameId) -> Option<Game> {
        self.inner.read().await.games.get(game_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.games.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
