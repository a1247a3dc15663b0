use gambit_shared::{GameId, Orientation, Position};

/// Lifecycle phase of the session.
///
/// `Idle -> Seeking -> Active -> Ended`, with `Resuming` standing in for
/// `Seeking` when a stored handle is being re-attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No game requested
    Idle,
    /// `find_game` sent, waiting for an opponent
    Seeking,
    /// `get_game` sent for a known game, waiting for its snapshot
    Resuming,
    /// Game in progress
    Active,
    /// Transport dropped mid-game; a reopen resumes it
    Ended,
}

/// Everything needed to find a game again after a restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    pub game_id: Option<GameId>,
    pub orientation: Orientation,
}

impl SessionHandle {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            game_id: None,
            orientation,
        }
    }
}

/// Session state owned by the machine.
///
/// Only the machine mutates it; everyone else reads through the getters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub(super) phase: Phase,
    pub(super) my_turn: bool,
    pub(super) position: Option<Position>,
    pub(super) handle: SessionHandle,
}

impl SessionState {
    /// Fresh idle session.
    pub fn new(orientation: Orientation) -> Self {
        Self {
            phase: Phase::Idle,
            my_turn: false,
            position: None,
            handle: SessionHandle::new(orientation),
        }
    }

    /// Session restored from a stored handle.
    ///
    /// A handle that names a game starts out `Resuming` so the first open
    /// connection asks for that game's state.
    pub fn restore(handle: SessionHandle) -> Self {
        let phase = if handle.game_id.is_some() {
            Phase::Resuming
        } else {
            Phase::Idle
        };
        Self {
            phase,
            my_turn: false,
            position: None,
            handle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the local player may move. Meaningful only while `Active`.
    pub fn my_turn(&self) -> bool {
        self.my_turn
    }

    /// Last authoritative (or optimistically accepted) snapshot.
    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    pub fn game_id(&self) -> Option<&GameId> {
        self.handle.game_id.as_ref()
    }

    pub fn orientation(&self) -> Orientation {
        self.handle.orientation
    }
}
