//! Session driver: owns the state machine and performs its effects.
//!
//! One task runs the driver. It is the only writer of the session state; the
//! connection task and the UI talk to it through channels.

use std::sync::Arc;

use gambit_shared::{decode_batch, encode, Orientation, PlayerId, ServerMessage};
use tokio::sync::{mpsc, watch};

use crate::application::identity::IdentityStore;
use crate::application::session::{
    Effect, MoveAttempt, SessionEvent, SessionMachine, SessionState, ViewUpdate,
};
use crate::infrastructure::messaging::ConnectionEvent;
use crate::ports::outbound::{BoardView, FrameSink, OrientationChooser};

/// What the player can ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerIntent {
    /// Start over. `None` defers to the orientation chooser, then a coin flip.
    NewGame { orientation: Option<Orientation> },
    AttemptMove(MoveAttempt),
}

pub struct SessionDeps {
    pub identity: Arc<IdentityStore>,
    pub view: Box<dyn BoardView>,
    pub chooser: Arc<dyn OrientationChooser>,
    pub outbound: Arc<dyn FrameSink>,
}

pub struct SessionDriver {
    machine: SessionMachine,
    identity: Arc<IdentityStore>,
    view: Box<dyn BoardView>,
    chooser: Arc<dyn OrientationChooser>,
    outbound: Arc<dyn FrameSink>,
    state_tx: watch::Sender<SessionState>,
}

impl SessionDriver {
    pub fn new(deps: SessionDeps) -> Self {
        let SessionDeps {
            identity,
            view,
            chooser,
            outbound,
        } = deps;

        let player_id = identity.player_identity();
        let state = match identity.resumable_handle() {
            Some(handle) => {
                tracing::info!(
                    game_id = ?handle.game_id,
                    orientation = %handle.orientation,
                    "Found resumable session"
                );
                SessionState::restore(handle)
            }
            None => SessionState::new(chooser.selected().unwrap_or(Orientation::White)),
        };
        let (state_tx, _) = watch::channel(state.clone());

        Self {
            machine: SessionMachine::new(player_id, state),
            identity,
            view,
            chooser,
            outbound,
            state_tx,
        }
    }

    pub fn player_id(&self) -> PlayerId {
        self.machine.player_id()
    }

    pub fn state(&self) -> &SessionState {
        self.machine.state()
    }

    /// Observe the session state after every event.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    pub fn handle_intent(&mut self, intent: PlayerIntent) {
        let event = match intent {
            PlayerIntent::NewGame { orientation } => {
                let orientation = orientation
                    .or_else(|| self.chooser.selected())
                    .unwrap_or_else(Orientation::random);
                SessionEvent::NewGame { orientation }
            }
            PlayerIntent::AttemptMove(attempt) => SessionEvent::AttemptMove(attempt),
        };
        self.dispatch(event);
    }

    pub fn handle_connection_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Opened => self.dispatch(SessionEvent::ConnectionOpened),
            ConnectionEvent::Closed { code } => {
                self.dispatch(SessionEvent::ConnectionClosed { code })
            }
            ConnectionEvent::Frame(text) => {
                for message in decode_batch::<ServerMessage>(&text) {
                    self.dispatch(SessionEvent::Inbound(message));
                }
            }
        }
    }

    /// Drive the session until the connection task stops or the intent
    /// stream closes. Returns the final state.
    pub async fn run(
        mut self,
        mut intents: mpsc::Receiver<PlayerIntent>,
        mut events: mpsc::Receiver<ConnectionEvent>,
    ) -> SessionState {
        tracing::info!(player_id = %self.player_id(), "Session driver started");

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_connection_event(event),
                    None => {
                        tracing::info!("Connection event stream ended");
                        break;
                    }
                },
                intent = intents.recv() => match intent {
                    Some(intent) => self.handle_intent(intent),
                    None => {
                        tracing::info!("Intent stream closed");
                        break;
                    }
                },
            }
        }

        self.machine.state().clone()
    }

    fn dispatch(&mut self, event: SessionEvent) {
        let effects = self.machine.handle(event);
        for effect in effects {
            self.execute(effect);
        }
        self.state_tx.send_replace(self.machine.state().clone());
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::Send(message) => {
                let frame = match encode(&message) {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::error!(
                            kind = message.kind(),
                            error = %e,
                            "Failed to encode message"
                        );
                        return;
                    }
                };
                if let Err(e) = self.outbound.send_frame(frame) {
                    tracing::warn!(kind = message.kind(), error = %e, "Failed to send message");
                }
            }
            Effect::View(update) => self.apply_view(update),
            Effect::PersistHandle(handle) => self.identity.persist_handle(&handle),
            Effect::ClearHandle => self.identity.clear_handle(),
        }
    }

    fn apply_view(&mut self, update: ViewUpdate) {
        match update {
            ViewUpdate::ResetBoard { orientation } => self.view.reset_to_start(orientation),
            ViewUpdate::RenderPosition(position) => {
                if self.view.current_rendered_position().as_ref() == Some(&position) {
                    tracing::debug!(%position, "Board already shows position");
                } else {
                    self.view.render_position(&position);
                }
            }
            ViewUpdate::Notice(notice) => self.view.notify(notice),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use gambit_shared::{ClientMessage, GameId, Position};
    use mockall::predicate::eq;

    use crate::application::session::Phase;
    use crate::infrastructure::storage::MemoryHandleStore;
    use crate::infrastructure::testing::{RecordingBoardView, ViewCall};
    use crate::ports::outbound::{
        handle_keys, HandleStore, MockBoardView, MockFrameSink, MockOrientationChooser,
        ViewNotice,
    };

    /// Sink that keeps every frame it is handed.
    fn capturing_sink() -> (MockFrameSink, Arc<Mutex<Vec<ClientMessage>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&sent);
        let mut sink = MockFrameSink::new();
        sink.expect_send_frame().returning(move |frame| {
            log.lock()
                .unwrap()
                .push(serde_json::from_str(&frame).unwrap());
            Ok(())
        });
        (sink, sent)
    }

    fn chooser(selected: Option<Orientation>) -> MockOrientationChooser {
        let mut chooser = MockOrientationChooser::new();
        chooser.expect_selected().return_const(selected);
        chooser
    }

    fn driver(
        store: Arc<MemoryHandleStore>,
        view: Box<dyn BoardView>,
        chooser: MockOrientationChooser,
        sink: MockFrameSink,
    ) -> SessionDriver {
        SessionDriver::new(SessionDeps {
            identity: Arc::new(IdentityStore::new(store)),
            view,
            chooser: Arc::new(chooser),
            outbound: Arc::new(sink),
        })
    }

    fn frame(json: &str) -> ConnectionEvent {
        ConnectionEvent::Frame(json.to_string())
    }

    #[test]
    fn new_game_defers_to_chooser_orientation() {
        let (sink, sent) = capturing_sink();
        let mut view = MockBoardView::new();
        view.expect_reset_to_start()
            .with(eq(Orientation::Black))
            .times(1)
            .return_const(());

        let mut driver = driver(
            Arc::new(MemoryHandleStore::new()),
            Box::new(view),
            chooser(Some(Orientation::Black)),
            sink,
        );
        driver.handle_connection_event(ConnectionEvent::Opened);
        driver.handle_intent(PlayerIntent::NewGame { orientation: None });

        let sent = sent.lock().unwrap();
        match sent.as_slice() {
            [ClientMessage::FindGame(data)] => {
                assert_eq!(data.orientation, Orientation::Black);
                assert_eq!(data.player_id, driver.player_id());
            }
            other => panic!("expected find_game, got {other:?}"),
        }
        assert_eq!(driver.state().phase(), Phase::Seeking);
    }

    #[test]
    fn stored_handle_is_resumed_on_open() {
        let store = Arc::new(MemoryHandleStore::new());
        store.write(HashMap::from([
            (handle_keys::GAME_ID.to_string(), "g1".to_string()),
            (handle_keys::ORIENTATION.to_string(), "black".to_string()),
        ]));
        let (sink, sent) = capturing_sink();

        let mut driver = driver(store, Box::new(RecordingBoardView::new()), chooser(None), sink);
        assert_eq!(driver.state().phase(), Phase::Resuming);

        driver.handle_connection_event(ConnectionEvent::Opened);
        let sent = sent.lock().unwrap();
        match sent.as_slice() {
            [ClientMessage::GetGame(data)] => {
                assert_eq!(data.game_id, GameId::new("g1").unwrap());
                assert_eq!(data.orientation, Orientation::Black);
            }
            other => panic!("expected get_game, got {other:?}"),
        }
    }

    #[test]
    fn stale_handle_is_cleared_when_engine_has_no_such_game() {
        let store = Arc::new(MemoryHandleStore::new());
        store.write(HashMap::from([
            (handle_keys::GAME_ID.to_string(), "gone".to_string()),
            (handle_keys::ORIENTATION.to_string(), "white".to_string()),
        ]));
        let view = RecordingBoardView::new();
        let (sink, _) = capturing_sink();
        let mut driver = driver(
            Arc::clone(&store),
            Box::new(view.clone()),
            chooser(None),
            sink,
        );

        driver.handle_connection_event(ConnectionEvent::Opened);
        driver.handle_connection_event(frame(
            r#"{"type":"error","data":{"game_id":"gone","code":"not_found"}}"#,
        ));

        assert_eq!(driver.state().phase(), Phase::Idle);
        assert_eq!(store.read(handle_keys::GAME_ID), None);
        assert_eq!(view.notices(), vec![ViewNotice::GameUnavailable]);
    }

    #[test]
    fn batched_frames_apply_in_order_and_persist_handle() {
        let store = Arc::new(MemoryHandleStore::new());
        let view = RecordingBoardView::new();
        let (sink, _) = capturing_sink();
        let mut driver = driver(
            Arc::clone(&store),
            Box::new(view.clone()),
            chooser(Some(Orientation::Black)),
            sink,
        );
        driver.handle_intent(PlayerIntent::NewGame { orientation: None });

        let batch = concat!(
            r#"{"type":"game_started","data":{"game_id":"g1","position":"start"}}"#,
            "\n",
            "{broken",
            "\n",
            r#"{"type":"move_made","data":{"game_id":"g1","position":"p1"}}"#,
        );
        driver.handle_connection_event(frame(batch));

        assert_eq!(driver.state().phase(), Phase::Active);
        assert!(driver.state().my_turn());
        assert_eq!(view.rendered(), Some(Position::from("p1")));
        assert_eq!(
            view.calls(),
            vec![
                ViewCall::Reset(Orientation::Black),
                ViewCall::Render(Position::from("start")),
                ViewCall::Notice(ViewNotice::GameStarted),
                ViewCall::Render(Position::from("p1")),
            ]
        );
        assert_eq!(store.read(handle_keys::GAME_ID).as_deref(), Some("g1"));
        assert_eq!(store.read(handle_keys::ORIENTATION).as_deref(), Some("black"));
    }

    #[test]
    fn abnormal_close_survives_failed_leave_game() {
        let mut sink = MockFrameSink::new();
        sink.expect_send_frame().returning(|frame| {
            if frame.contains("leave_game") {
                Err(anyhow::anyhow!("not connected"))
            } else {
                Ok(())
            }
        });
        let view = RecordingBoardView::new();
        let mut driver = driver(
            Arc::new(MemoryHandleStore::new()),
            Box::new(view.clone()),
            chooser(Some(Orientation::White)),
            sink,
        );

        driver.handle_intent(PlayerIntent::NewGame { orientation: None });
        driver.handle_connection_event(frame(
            r#"{"type":"game_started","data":{"game_id":"g1","position":"start"}}"#,
        ));
        driver.handle_connection_event(ConnectionEvent::Closed { code: 1006 });

        assert_eq!(driver.state().phase(), Phase::Ended);
        assert_eq!(view.notices().last(), Some(&ViewNotice::ConnectionLost));
    }

    #[test]
    fn render_is_skipped_when_board_already_matches() {
        let (sink, _) = capturing_sink();
        let mut view = MockBoardView::new();
        view.expect_reset_to_start().return_const(());
        view.expect_current_rendered_position()
            .return_const(Some(Position::from("start")));
        view.expect_render_position().never();
        view.expect_notify()
            .with(eq(ViewNotice::GameStarted))
            .times(1)
            .return_const(());

        let mut driver = driver(
            Arc::new(MemoryHandleStore::new()),
            Box::new(view),
            chooser(Some(Orientation::White)),
            sink,
        );
        driver.handle_intent(PlayerIntent::NewGame { orientation: None });
        driver.handle_connection_event(frame(
            r#"{"type":"game_started","data":{"game_id":"g1","position":"start"}}"#,
        ));
        assert_eq!(driver.state().position(), Some(&Position::from("start")));
    }

    #[test]
    fn rejected_move_asks_view_to_revert() {
        let mut sink = MockFrameSink::new();
        sink.expect_send_frame().never();
        let view = RecordingBoardView::new();
        let mut driver = driver(
            Arc::new(MemoryHandleStore::new()),
            Box::new(view.clone()),
            chooser(None),
            sink,
        );

        driver.handle_intent(PlayerIntent::AttemptMove(MoveAttempt {
            source: "e2".into(),
            target: "e4".into(),
            piece: "wP".into(),
            old_position: Position::from("start"),
            new_position: Position::from("p1"),
        }));
        assert_eq!(view.notices(), vec![ViewNotice::MoveRejected]);
    }

    #[tokio::test]
    async fn run_returns_final_state_when_events_end() {
        let (sink, sent) = capturing_sink();
        let driver = driver(
            Arc::new(MemoryHandleStore::new()),
            Box::new(RecordingBoardView::new()),
            chooser(Some(Orientation::White)),
            sink,
        );
        let mut watcher = driver.subscribe();

        let (intent_tx, intent_rx) = mpsc::channel(8);
        let (event_tx, event_rx) = mpsc::channel(8);
        let task = tokio::spawn(driver.run(intent_rx, event_rx));

        intent_tx
            .send(PlayerIntent::NewGame { orientation: None })
            .await
            .unwrap();
        watcher
            .wait_for(|state| state.phase() == Phase::Seeking)
            .await
            .unwrap();

        event_tx.send(ConnectionEvent::Opened).await.unwrap();
        drop(event_tx);

        let final_state = task.await.unwrap();
        assert_eq!(final_state.phase(), Phase::Seeking);
        // The intent came first, so find_game went out on the open.
        assert_eq!(sent.lock().unwrap().len(), 1);
    }
}
