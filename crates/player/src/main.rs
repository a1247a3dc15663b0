//! Gambit Player - headless session client.
//!
//! Reads line commands from stdin (see `infrastructure::terminal`) and logs
//! the board as the session advances.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gambit_player::config::{load_dotenv_from_repo_root, PlayerConfig};
use gambit_player::infrastructure::storage::FileHandleStore;
use gambit_player::infrastructure::terminal::{parse_command, TerminalCommand};
use gambit_player::infrastructure::view::{FixedOrientation, LogBoardView};
use gambit_player::{GameClient, IdentityStore, PlayerIntent, SessionDeps, SessionDriver};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gambit_player=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Gambit Player");

    let config = PlayerConfig::from_env()?;
    tracing::info!(
        ws_url = %config.ws_url,
        orientation = ?config.orientation,
        "Configuration loaded"
    );

    // Session handle persistence
    let store = match &config.storage_path {
        Some(path) => FileHandleStore::at(path),
        None => FileHandleStore::new(),
    };
    tracing::info!(path = %store.path().display(), "Session handle store");
    let identity = Arc::new(IdentityStore::new(Arc::new(store)));

    // Transport
    let client = Arc::new(GameClient::new(config.ws_url.as_str()));
    let (connection, events) = client.connect();
    let link = client.observer();

    let driver = SessionDriver::new(SessionDeps {
        identity,
        view: Box::new(LogBoardView::new()),
        chooser: Arc::new(FixedOrientation(config.orientation)),
        outbound: client.clone(),
    });
    let state = driver.subscribe();

    // Stdin commands
    let (intent_tx, intent_rx) = mpsc::channel::<PlayerIntent>(16);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read stdin");
                    break;
                }
            };
            match parse_command(&line) {
                Ok(Some(TerminalCommand::Intent(intent))) => {
                    if intent_tx.send(intent).await.is_err() {
                        break;
                    }
                }
                Ok(Some(TerminalCommand::Status)) => {
                    let state = state.borrow().clone();
                    tracing::info!(
                        connection = %link.state(),
                        phase = ?state.phase(),
                        game_id = ?state.game_id(),
                        orientation = %state.orientation(),
                        my_turn = state.my_turn(),
                        position = ?state.position(),
                        "Status"
                    );
                }
                Ok(Some(TerminalCommand::Quit)) => break,
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "Invalid command"),
            }
        }
    });

    let final_state = driver.run(intent_rx, events).await;
    tracing::info!(phase = ?final_state.phase(), "Session ended");

    connection.disconnect();
    Ok(())
}
