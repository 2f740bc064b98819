//! Persisted session state for zkLogin.
//!
//! Everything a session needs to survive a restart lives in one
//! [`PersistedState`] object with two namespaces:
//!
//! - `zklogin` ([`ZkLoginSettings`]) -- ephemeral key, randomness, max epoch,
//!   identity token, cached proof, enabled flag
//! - `app` ([`AppSession`]) -- the application's logged-in flag and the
//!   tokens obtained by exchanging the identity token
//!
//! The object is always read and written whole through a [`SessionStore`],
//! so invalidation can never leave half a session behind.
//!
//! # Design Principles
//!
//! - **One object, one write.** There is no per-field setter on the store.
//! - **Stores never decide.** Clearing is an instruction from the session
//!   controller; a store only executes it.
//! - **Secrets stay out of logs.** `Debug` on the settings types reports
//!   presence, not values.

mod error;
mod file;
mod memory;
mod state;

pub use error::StorageError;
pub use file::FileSessionStore;
pub use memory::InMemorySessionStore;
pub use state::{AppSession, PersistedState, ZkLoginSettings};

use std::sync::Arc;

/// Loads and saves the persisted session object.
///
/// Implementations must be `Send + Sync` so a controller can be shared
/// across tasks.
pub trait SessionStore: Send + Sync {
    /// Loads the persisted state, or the empty state if nothing is stored.
    fn load(&self) -> Result<PersistedState, StorageError>;

    /// Replaces the persisted state.
    fn save(&self, state: &PersistedState) -> Result<(), StorageError>;

    /// Removes all persisted state in one step.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Lets several controllers share one store, as a restarted process would.
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn load(&self) -> Result<PersistedState, StorageError> {
        (**self).load()
    }

    fn save(&self, state: &PersistedState) -> Result<(), StorageError> {
        (**self).save(state)
    }

    fn clear(&self) -> Result<(), StorageError> {
        (**self).clear()
    }
}
