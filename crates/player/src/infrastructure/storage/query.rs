//! Handle store kept in a URL query string.
//!
//! Embedded boards resume from the page address (`?game_id=..&orientation=..`);
//! this adapter keeps the same shape so the address can be shown or shared.

use std::collections::HashMap;
use std::sync::RwLock;

use url::Url;

use crate::ports::outbound::HandleStore;

pub struct QueryStringHandleStore {
    url: RwLock<Url>,
}

impl QueryStringHandleStore {
    pub fn new(url: Url) -> Self {
        Self {
            url: RwLock::new(url),
        }
    }

    pub fn parse(url: &str) -> Result<Self, url::ParseError> {
        Url::parse(url).map(Self::new)
    }

    /// Address carrying the current handle.
    pub fn current_url(&self) -> Option<Url> {
        match self.url.read() {
            Ok(guard) => Some(guard.clone()),
            Err(e) => {
                tracing::error!(error = %e, "Failed to acquire read lock for query store");
                None
            }
        }
    }

    fn rewrite(&self, update: impl FnOnce(&mut Vec<(String, String)>)) {
        let mut url = match self.url.write() {
            Ok(guard) => guard,
            Err(e) => {
                tracing::error!(error = %e, "Failed to acquire write lock for query store");
                return;
            }
        };

        let mut pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        update(&mut pairs);

        if pairs.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(pairs);
        }
    }
}

impl HandleStore for QueryStringHandleStore {
    fn read(&self, key: &str) -> Option<String> {
        let url = self.current_url()?;
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    fn write(&self, entries: HashMap<String, String>) {
        self.rewrite(|pairs| {
            for (key, value) in entries {
                match pairs.iter_mut().find(|(k, _)| *k == key) {
                    Some(slot) => slot.1 = value,
                    None => pairs.push((key, value)),
                }
            }
        });
    }

    fn remove(&self, key: &str) {
        self.rewrite(|pairs| pairs.retain(|(k, _)| k != key));
    }
}
