use super::test_support::*;
use super::*;

use gambit_shared::{
    ErrorCode, FindGameData, GameId, GetGameData, LeaveGameData, MakeMoveData, Orientation,
    PlayerId, Position,
};

const TIMEOUT: Duration = Duration::from_secs(5);

fn find_game(player_id: PlayerId, orientation: Orientation) -> ClientMessage {
    ClientMessage::FindGame(FindGameData {
        orientation,
        player_id,
    })
}

fn make_move(game_id: &GameId, player_id: PlayerId, new_position: &str) -> ClientMessage {
    ClientMessage::MakeMove(MakeMoveData {
        game_id: game_id.clone(),
        player_id,
        source: "e2".into(),
        target: "e4".into(),
        piece: "wP".into(),
        old_position: Position::initial(),
        new_position: Position::from(new_position),
    })
}

struct Match {
    state: Arc<WsState>,
    addr: std::net::SocketAddr,
    game_id: GameId,
    white: (WsTestClient, PlayerId),
    black: (WsTestClient, PlayerId),
}

async fn start_match() -> Match {
    let state = Arc::new(WsState::new());
    let (addr, _server) = spawn_ws_server(state.clone()).await;

    let mut white = (WsTestClient::connect(addr).await, PlayerId::new());
    let mut black = (WsTestClient::connect(addr).await, PlayerId::new());

    white.0.send(&find_game(white.1, Orientation::White)).await;
    // Seat white before black shows up.
    white.0.expect_nothing(Duration::from_millis(100)).await;
    black.0.send(&find_game(black.1, Orientation::Black)).await;

    let mut game_id = None;
    for client in [&mut white.0, &mut black.0] {
        match client.expect(TIMEOUT, |m| m.kind() == "game_started").await {
            ServerMessage::GameStarted(data) => {
                assert_eq!(data.position, Position::initial());
                assert_eq!(data.player_id, Some(black.1));
                game_id = Some(data.game_id);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    Match {
        state,
        addr,
        game_id: game_id.unwrap(),
        white,
        black,
    }
}

#[tokio::test]
async fn matched_clients_both_receive_game_started() {
    let m = start_match().await;
    assert_eq!(m.state.games.len().await, 1);
    assert_eq!(m.state.connections.len(), 2);
}

#[tokio::test]
async fn move_is_relayed_to_both_players() {
    let mut m = start_match().await;

    m.white.0.send(&make_move(&m.game_id, m.white.1, "after-e4")).await;

    for client in [&mut m.white.0, &mut m.black.0] {
        match client.expect(TIMEOUT, |msg| msg.kind() == "move_made").await {
            ServerMessage::MoveMade(data) => {
                assert_eq!(data.game_id.as_ref(), Some(&m.game_id));
                assert_eq!(data.position, Position::from("after-e4"));
                assert_eq!(data.player_id, Some(m.white.1));
                assert_eq!(data.piece.as_deref(), Some("wP"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}

#[tokio::test]
async fn get_game_after_reconnect_names_the_side_to_move() {
    let mut m = start_match().await;
    m.white.0.send(&make_move(&m.game_id, m.white.1, "p1")).await;
    m.black.0.expect(TIMEOUT, |msg| msg.kind() == "move_made").await;

    // Black drops and comes back on a fresh socket.
    m.black.0.close().await;
    m.white.0.expect(TIMEOUT, |msg| msg.kind() == "player_left").await;

    let mut again = WsTestClient::connect(m.addr).await;
    again
        .send(&ClientMessage::GetGame(GetGameData {
            game_id: m.game_id.clone(),
            player_id: m.black.1,
            orientation: Orientation::Black,
        }))
        .await;

    match again.expect(TIMEOUT, |msg| msg.kind() == "state_update").await {
        ServerMessage::StateUpdate(data) => {
            assert_eq!(data.game_id, m.game_id);
            assert_eq!(data.position, Position::from("p1"));
            assert_eq!(data.player_id, m.black.1);
        }
        other => panic!("unexpected {other:?}"),
    }
    m.white.0.expect(TIMEOUT, |msg| msg.kind() == "state_update").await;
}

#[tokio::test]
async fn get_game_for_missing_game_is_answered_with_not_found() {
    let state = Arc::new(WsState::new());
    let (addr, _server) = spawn_ws_server(state).await;
    let mut client = WsTestClient::connect(addr).await;
    let game_id = GameId::new("no-such-game").unwrap();

    client
        .send(&ClientMessage::GetGame(GetGameData {
            game_id: game_id.clone(),
            player_id: PlayerId::new(),
            orientation: Orientation::White,
        }))
        .await;

    match client.expect(TIMEOUT, |msg| msg.kind() == "error").await {
        ServerMessage::Error(data) => {
            assert_eq!(data.game_id, Some(game_id));
            assert_eq!(data.code, ErrorCode::NotFound);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn move_from_unseated_player_is_refused_to_the_sender_only() {
    let mut m = start_match().await;
    let mut stranger = WsTestClient::connect(m.addr).await;

    stranger
        .send(&make_move(&m.game_id, PlayerId::new(), "p1"))
        .await;

    match stranger.expect(TIMEOUT, |msg| msg.kind() == "error").await {
        ServerMessage::Error(data) => assert_eq!(data.code, ErrorCode::Forbidden),
        other => panic!("unexpected {other:?}"),
    }
    m.white.0.expect_nothing(Duration::from_millis(100)).await;
    m.black.0.expect_nothing(Duration::from_millis(100)).await;
}

#[tokio::test]
async fn disconnect_notifies_the_opponent() {
    let mut m = start_match().await;

    m.white.0.close().await;

    match m.black.0.expect(TIMEOUT, |msg| msg.kind() == "player_left").await {
        ServerMessage::PlayerLeft(data) => {
            assert_eq!(data.game_id.as_ref(), Some(&m.game_id));
            assert_eq!(data.player_id, Some(m.white.1));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn leave_game_notifies_only_the_opponent() {
    let mut m = start_match().await;

    m.black
        .0
        .send(&ClientMessage::LeaveGame(LeaveGameData {
            player_id: m.black.1,
            game_id: m.game_id.clone(),
        }))
        .await;

    m.white.0.expect(TIMEOUT, |msg| msg.kind() == "player_left").await;
    m.black.0.expect_nothing(Duration::from_millis(200)).await;
}

#[tokio::test]
async fn bad_frames_in_a_batch_do_not_stop_the_rest() {
    let state = Arc::new(WsState::new());
    let (addr, _server) = spawn_ws_server(state.clone()).await;
    let mut white = WsTestClient::connect(addr).await;
    let mut black = WsTestClient::connect(addr).await;

    let white_id = PlayerId::new();
    let batch = format!(
        "{}\nnot json\n{{\"type\":\"resign\",\"data\":{{}}}}\nnull",
        gambit_shared::encode(&find_game(white_id, Orientation::White)).unwrap()
    );
    white.send_raw(&batch).await;
    white.expect_nothing(Duration::from_millis(100)).await;

    black.send(&find_game(PlayerId::new(), Orientation::Black)).await;
    white.expect(TIMEOUT, |msg| msg.kind() == "game_started").await;
    assert_eq!(state.games.len().await, 1);
}
