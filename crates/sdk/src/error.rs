//! SDK error types.
//!
//! [`ZkLoginError`] is the unified error for session and signing operations.
//! [`ZkLoginError::kind`] is what the controller inspects before deciding
//! whether a failure clears the session.

use config::ConfigError;
use signer::SignerError;
use storage::StorageError;
use transport::{TransportError, TransportErrorKind};
use zk_crypto::CryptoError;

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// Recovery class of a [`ZkLoginError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Cancelled locally mid-flight. Session state is left untouched.
    Aborted,
    /// A token, salt, proof or key failed validation.
    Invalid,
    /// A remote service failed or could not be reached.
    Transport,
    /// A local precondition was not met.
    Precondition,
    /// Not enough funds. Never a session failure.
    Funds,
    /// Invalid configuration.
    Config,
    /// The persisted state could not be read or written.
    Storage,
}

// ---------------------------------------------------------------------------
// ZkLoginError
// ---------------------------------------------------------------------------

/// Errors from zkLogin session operations.
#[derive(Debug, thiserror::Error)]
pub enum ZkLoginError {
    #[error("operation aborted")]
    Aborted,

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    // -- Identity token --
    #[error("redirect carries no id_token")]
    MissingIdToken,

    #[error("malformed identity token: {0}")]
    MalformedToken(&'static str),

    #[error("identity token has expired")]
    TokenExpired,

    #[error("identity token nonce does not match the ephemeral key")]
    NonceMismatch,

    #[error("ephemeral key expired: max epoch {max_epoch}, current epoch {current}")]
    EpochExpired { max_epoch: u64, current: u64 },

    #[error("salt is not valid base64")]
    MalformedSalt,

    // -- Proof --
    #[error("proof service returned {status_code} {status_text}")]
    ProofServiceError {
        status_code: u16,
        status_text: String,
    },

    #[error("proof service returned an unusable proof")]
    ProofMalformed,

    // -- Session preconditions --
    #[error("session is not ready to sign")]
    SessionNotReady,

    #[error("no ephemeral key available")]
    KeyUnavailable,

    #[error("salt has not been resolved")]
    SaltMissing,

    #[error("address seed has not been derived")]
    AddressSeedMissing,

    // -- Payments --
    #[error("no payment recipient configured")]
    RecipientMissing,

    #[error("payment amount must be positive")]
    InvalidAmount,

    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u64, available: u64 },

    #[error("transaction {digest} failed: {reason}")]
    TransactionFailed { digest: String, reason: String },

    // -- Wrapped --
    #[error(transparent)]
    Transport(TransportError),

    #[error("derivation failed: {0}")]
    Crypto(#[from] CryptoError),

    #[error("signing failed: {0}")]
    Signer(#[from] SignerError),

    #[error("session storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("signature encoding failed")]
    Encoding,
}

impl ZkLoginError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Aborted => ErrorKind::Aborted,
            Self::Config(_) => ErrorKind::Config,
            Self::MissingIdToken
            | Self::MalformedToken(_)
            | Self::TokenExpired
            | Self::NonceMismatch
            | Self::EpochExpired { .. }
            | Self::MalformedSalt
            | Self::ProofMalformed
            | Self::Crypto(_)
            | Self::Signer(_)
            | Self::Encoding => ErrorKind::Invalid,
            Self::ProofServiceError { .. } | Self::TransactionFailed { .. } => {
                ErrorKind::Transport
            }
            Self::SessionNotReady
            | Self::KeyUnavailable
            | Self::SaltMissing
            | Self::AddressSeedMissing
            | Self::RecipientMissing
            | Self::InvalidAmount => ErrorKind::Precondition,
            Self::InsufficientBalance { .. } => ErrorKind::Funds,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Transport(e) => match e.kind() {
                TransportErrorKind::Aborted => ErrorKind::Aborted,
                TransportErrorKind::Malformed => ErrorKind::Invalid,
                TransportErrorKind::Config => ErrorKind::Config,
                TransportErrorKind::Status | TransportErrorKind::Network => ErrorKind::Transport,
            },
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.kind() == ErrorKind::Aborted
    }
}

impl From<TransportError> for ZkLoginError {
    fn from(e: TransportError) -> Self {
        if e.is_aborted() {
            Self::Aborted
        } else {
            Self::Transport(e)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
