use gambit_shared::{Orientation, Position};

use crate::ports::outbound::{BoardView, ViewNotice};

/// BoardView for headless runs: remembers what it "shows" and logs changes.
#[derive(Debug, Default)]
pub struct LogBoardView {
    rendered: Option<Position>,
    orientation: Option<Orientation>,
}

impl LogBoardView {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BoardView for LogBoardView {
    fn render_position(&mut self, position: &Position) {
        tracing::info!(position = %position, "Board");
        self.rendered = Some(position.clone());
    }

    fn current_rendered_position(&self) -> Option<Position> {
        self.rendered.clone()
    }

    fn reset_to_start(&mut self, orientation: Orientation) {
        tracing::info!(%orientation, "Board reset");
        self.orientation = Some(orientation);
        self.rendered = Some(Position::initial());
    }

    fn notify(&mut self, notice: ViewNotice) {
        match notice {
            ViewNotice::GameStarted => tracing::info!(
                orientation = ?self.orientation,
                "Game started"
            ),
            ViewNotice::OpponentLeft => tracing::info!("Opponent left the game"),
            ViewNotice::MoveRejected => tracing::info!("Move rejected, piece returned"),
            ViewNotice::ConnectionLost => tracing::warn!("Connection to the engine lost"),
            ViewNotice::GameUnavailable => {
                tracing::warn!("Game is no longer available, start a new one")
            }
        }
    }
}
