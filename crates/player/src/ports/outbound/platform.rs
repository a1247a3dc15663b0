//! Platform ports - persistence for the resumable handle and the player's
//! orientation preference.

use std::collections::HashMap;

use gambit_shared::Orientation;

/// Keys the session handle is stored under.
pub mod handle_keys {
    pub const GAME_ID: &str = "game_id";
    pub const ORIENTATION: &str = "orientation";
}

/// Small string key/value store that survives a restart.
///
/// Desktop builds back this with a JSON file, embedded builds with the
/// query string of the page URL.
#[cfg_attr(test, mockall::automock)]
pub trait HandleStore: Send + Sync {
    /// Load a value by key, returns None if not found
    fn read(&self, key: &str) -> Option<String>;

    /// Save several values at once
    fn write(&self, entries: HashMap<String, String>);

    /// Remove a value by key
    fn remove(&self, key: &str);
}

/// Orientation the player picked in the UI, if any.
#[cfg_attr(test, mockall::automock)]
pub trait OrientationChooser: Send + Sync {
    fn selected(&self) -> Option<Orientation>;
}
