//! In-memory session store.

use std::sync::RwLock;

use crate::{PersistedState, SessionStore, StorageError};

/// Session store backed by a `RwLock`.
///
/// Suitable for tests and short-lived processes. State is lost on exit.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    state: RwLock<PersistedState>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `state`.
    pub fn with_state(state: PersistedState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self) -> Result<PersistedState, StorageError> {
        let guard = self.state.read().map_err(|_| StorageError::Poisoned)?;
        Ok(guard.clone())
    }

    fn save(&self, state: &PersistedState) -> Result<(), StorageError> {
        let mut guard = self.state.write().map_err(|_| StorageError::Poisoned)?;
        *guard = state.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut guard = self.state.write().map_err(|_| StorageError::Poisoned)?;
        guard.reset();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let store = InMemorySessionStore::new();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_clear() {
        let store = InMemorySessionStore::new();
        let mut state = PersistedState::default();
        state.zklogin.max_epoch = Some(7);
        state.app.logged_in = true;
        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), state);

        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
    }
}
