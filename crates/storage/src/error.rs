//! Storage error types.

/// Errors that can occur when loading or saving session state.
///
/// These cover backend failures only. Whether a loaded state is usable is
/// decided by the session controller, not here.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or decoding the state failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A lock guarding in-memory state was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    Poisoned,
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
