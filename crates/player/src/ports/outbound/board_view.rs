//! BoardView - the rendering surface driven by the session.

use gambit_shared::{Orientation, Position};

/// One-off notices the view surfaces to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewNotice {
    /// Both seats are filled (or a resumed game was confirmed)
    GameStarted,
    /// The opponent left or dropped
    OpponentLeft,
    /// A local move was rejected; the piece goes back where it came from
    MoveRejected,
    /// The transport dropped abnormally
    ConnectionLost,
    /// The engine no longer knows the game; start a new one
    GameUnavailable,
}

/// Board UI as seen from the session.
///
/// The view owns whatever it draws. The session only tells it what the
/// authoritative position is and asks what it currently shows.
#[cfg_attr(test, mockall::automock)]
pub trait BoardView: Send {
    /// Draw the given snapshot.
    fn render_position(&mut self, position: &Position);

    /// Snapshot currently on screen, if any.
    fn current_rendered_position(&self) -> Option<Position>;

    /// Clear to the initial board seen from `orientation`.
    fn reset_to_start(&mut self, orientation: Orientation);

    fn notify(&mut self, notice: ViewNotice);
}
