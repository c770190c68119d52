//! In-memory key-value store.
//!
//! Provides [`InMemoryStore`], a thread-safe [`KeyValueStore`] for tests
//! and for sessions that should not outlive the process.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::KeyValueStore;
use crate::error::{Result, YooPayError};

/// Thread-safe in-memory [`KeyValueStore`].
///
/// # Example
///
/// ```rust
/// use yoopay_rs::session::{InMemoryStore, SessionRepository};
///
/// let sessions = SessionRepository::new(InMemoryStore::new());
/// assert!(sessions.load().unwrap().is_none());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    /// Stored entries.
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the entries.
    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|err| YooPayError::Storage(err.to_string().into()))
    }
}

impl KeyValueStore for InMemoryStore {
    #[inline]
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    #[inline]
    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _previous = self.entries()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    #[inline]
    fn remove(&self, key: &str) -> Result<()> {
        let _removed = self.entries()?.remove(key);
        Ok(())
    }
}
