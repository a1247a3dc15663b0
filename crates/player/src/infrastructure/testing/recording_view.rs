use std::sync::{Arc, Mutex};

use gambit_shared::{Orientation, Position};

use crate::ports::outbound::{BoardView, ViewNotice};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCall {
    Render(Position),
    Reset(Orientation),
    Notice(ViewNotice),
}

/// BoardView that records every call; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingBoardView {
    calls: Arc<Mutex<Vec<ViewCall>>>,
    rendered: Arc<Mutex<Option<Position>>>,
}

impl RecordingBoardView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ViewCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn rendered(&self) -> Option<Position> {
        self.rendered.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<ViewNotice> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ViewCall::Notice(notice) => Some(notice),
                _ => None,
            })
            .collect()
    }
}

impl BoardView for RecordingBoardView {
    fn render_position(&mut self, position: &Position) {
        *self.rendered.lock().unwrap() = Some(position.clone());
        self.calls.lock().unwrap().push(ViewCall::Render(position.clone()));
    }

    fn current_rendered_position(&self) -> Option<Position> {
        self.rendered()
    }

    fn reset_to_start(&mut self, orientation: Orientation) {
        *self.rendered.lock().unwrap() = Some(Position::initial());
        self.calls.lock().unwrap().push(ViewCall::Reset(orientation));
    }

    fn notify(&mut self, notice: ViewNotice) {
        self.calls.lock().unwrap().push(ViewCall::Notice(notice));
    }
}
