use std::collections::HashMap;
use std::sync::RwLock;

use crate::ports::outbound::HandleStore;

/// Process-local store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryHandleStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryHandleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HandleStore for MemoryHandleStore {
    fn read(&self, key: &str) -> Option<String> {
        match self.entries.read() {
            Ok(guard) => guard.get(key).cloned(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to acquire read lock for handle store");
                None
            }
        }
    }

    fn write(&self, entries: HashMap<String, String>) {
        match self.entries.write() {
            Ok(mut guard) => guard.extend(entries),
            Err(e) => tracing::error!(error = %e, "Failed to acquire write lock for handle store"),
        }
    }

    fn remove(&self, key: &str) {
        match self.entries.write() {
            Ok(mut guard) => {
                guard.remove(key);
            }
            Err(e) => tracing::error!(error = %e, "Failed to acquire write lock for handle store"),
        }
    }
}
