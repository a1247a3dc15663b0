//! Player identity and the resumable session handle.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use gambit_shared::{GameId, Orientation, PlayerId};

use crate::application::session::SessionHandle;
use crate::ports::outbound::{handle_keys, HandleStore};

/// Hands out the per-process player identity and keeps the session handle
/// in a [`HandleStore`].
pub struct IdentityStore {
    store: Arc<dyn HandleStore>,
    player_id: OnceLock<PlayerId>,
}

impl IdentityStore {
    pub fn new(store: Arc<dyn HandleStore>) -> Self {
        Self {
            store,
            player_id: OnceLock::new(),
        }
    }

    /// Identity for this process. Generated on first call, then cached.
    pub fn player_identity(&self) -> PlayerId {
        *self.player_id.get_or_init(|| {
            let id = PlayerId::new();
            tracing::info!(player_id = %id, "Generated player identity");
            id
        })
    }

    /// Handle left behind by an earlier run, if it names a game.
    pub fn resumable_handle(&self) -> Option<SessionHandle> {
        let Some(raw_game_id) = self.store.read(handle_keys::GAME_ID) else {
            tracing::debug!("No stored game id, nothing to resume");
            return None;
        };
        let game_id = match GameId::new(raw_game_id) {
            Ok(game_id) => game_id,
            Err(e) => {
                tracing::debug!(error = %e, "Stored game id unusable, not resuming");
                return None;
            }
        };

        let Some(raw_orientation) = self.store.read(handle_keys::ORIENTATION) else {
            tracing::debug!(%game_id, "Stored handle has no orientation, not resuming");
            return None;
        };
        let orientation = match raw_orientation.parse::<Orientation>() {
            Ok(orientation) => orientation,
            Err(e) => {
                tracing::debug!(%game_id, error = %e, "Stored orientation unusable, not resuming");
                return None;
            }
        };

        Some(SessionHandle {
            game_id: Some(game_id),
            orientation,
        })
    }

    pub fn persist_handle(&self, handle: &SessionHandle) {
        let mut entries = HashMap::new();
        entries.insert(
            handle_keys::ORIENTATION.to_string(),
            handle.orientation.as_str().to_string(),
        );
        match &handle.game_id {
            Some(game_id) => {
                entries.insert(handle_keys::GAME_ID.to_string(), game_id.to_string());
            }
            None => self.store.remove(handle_keys::GAME_ID),
        }
        self.store.write(entries);
        tracing::debug!(game_id = ?handle.game_id, "Persisted session handle");
    }

    pub fn clear_handle(&self) {
        self.store.remove(handle_keys::GAME_ID);
        self.store.remove(handle_keys::ORIENTATION);
        tracing::debug!("Cleared session handle");
    }
}
