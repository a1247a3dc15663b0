//! File-backed handle store.
//!
//! Stores key-value pairs in a JSON file at:
//! - Linux: ~/.config/gambit/session.json
//! - macOS: ~/Library/Application Support/io.gambit.player/session.json
//! - Windows: C:\Users\<User>\AppData\Roaming\gambit\player\config\session.json

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use directories::ProjectDirs;

use crate::ports::outbound::HandleStore;

const FILE_NAME: &str = "session.json";

pub struct FileHandleStore {
    path: PathBuf,
    cache: RwLock<HashMap<String, String>>,
}

impl FileHandleStore {
    /// Store in the platform config directory.
    pub fn new() -> Self {
        let path = match ProjectDirs::from("io", "gambit", "player") {
            Some(dirs) => dirs.config_dir().join(FILE_NAME),
            // Fallback to current directory if project dirs unavailable
            None => PathBuf::from(format!("gambit_{FILE_NAME}")),
        };
        Self::at(path)
    }

    /// Store at an explicit path. Loads whatever is already there.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cache = load(&path);
        tracing::debug!(
            path = %path.display(),
            entries = cache.len(),
            "File handle store initialized"
        );
        Self {
            path,
            cache: RwLock::new(cache),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::error!(error = %e, "Failed to create handle store directory");
                return;
            }
        }

        let cache = match self.cache.read() {
            Ok(guard) => guard,
            Err(e) => {
                tracing::error!(error = %e, "Failed to acquire read lock for handle store");
                return;
            }
        };

        match serde_json::to_string_pretty(&*cache) {
            Ok(data) => {
                if let Err(e) = fs::write(&self.path, data) {
                    tracing::error!(
                        error = %e,
                        path = %self.path.display(),
                        "Failed to write handle store"
                    );
                }
            }
            Err(e) => tracing::error!(error = %e, "Failed to serialize handle store"),
        }
    }
}

impl Default for FileHandleStore {
    fn default() -> Self {
        Self::new()
    }
}

fn load(path: &Path) -> HashMap<String, String> {
    if !path.exists() {
        return HashMap::new();
    }
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str::<HashMap<String, String>>(&data) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %path.display(),
                    "Failed to parse handle store, starting empty"
                );
                HashMap::new()
            }
        },
        Err(e) => {
            tracing::warn!(
                error = %e,
                path = %path.display(),
                "Failed to read handle store, starting empty"
            );
            HashMap::new()
        }
    }
}

impl HandleStore for FileHandleStore {
    fn read(&self, key: &str) -> Option<String> {
        match self.cache.read() {
            Ok(guard) => guard.get(key).cloned(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to acquire read lock for handle store");
                None
            }
        }
    }

    fn write(&self, entries: HashMap<String, String>) {
        match self.cache.write() {
            Ok(mut guard) => {
                guard.extend(entries);
                drop(guard); // Release lock before I/O
                self.persist();
            }
            Err(e) => tracing::error!(error = %e, "Failed to acquire write lock for handle store"),
        }
    }

    fn remove(&self, key: &str) {
        match self.cache.write() {
            Ok(mut guard) => {
                let removed = guard.remove(key).is_some();
                drop(guard);
                if removed {
                    self.persist();
                }
            }
            Err(e) => tracing::error!(error = %e, "Failed to acquire write lock for handle store"),
        }
    }
}
