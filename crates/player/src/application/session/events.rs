use gambit_shared::{ClientMessage, Orientation, Position, ServerMessage};

use super::state::SessionHandle;
use crate::ports::outbound::ViewNotice;

/// WebSocket status code for an orderly close. Every other code is abnormal.
pub const NORMAL_CLOSURE: u16 = 1000;

pub fn is_clean_close(code: u16) -> bool {
    code == NORMAL_CLOSURE
}

/// A piece the player dropped on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveAttempt {
    pub source: String,
    pub target: String,
    pub piece: String,
    pub old_position: Position,
    pub new_position: Position,
}

/// Everything the session reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Player asked for a fresh game seated as `orientation`
    NewGame { orientation: Orientation },
    /// Player dropped a piece
    AttemptMove(MoveAttempt),
    ConnectionOpened,
    ConnectionClosed { code: u16 },
    Inbound(ServerMessage),
}

/// Board changes requested by the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewUpdate {
    ResetBoard { orientation: Orientation },
    RenderPosition(Position),
    Notice(ViewNotice),
}

/// Side effects the driver performs on the machine's behalf, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Send(ClientMessage),
    View(ViewUpdate),
    PersistHandle(SessionHandle),
    ClearHandle,
}

impl Effect {
    pub(super) fn notice(notice: ViewNotice) -> Self {
        Effect::View(ViewUpdate::Notice(notice))
    }

    pub(super) fn render(position: Position) -> Self {
        Effect::View(ViewUpdate::RenderPosition(position))
    }
}
