//! Signing abstractions for zkLogin sessions.
//!
//! This crate provides:
//!
//! - [`Signer`] trait -- signs 32-byte intent digests with an Ed25519 key
//! - [`EphemeralKeypair`] -- the session's short-lived Ed25519 key
//! - [`intent`] module -- intent prefixes and Blake2b-256 digests
//! - [`UserSignature`] -- `flag || signature || public key`, the inner
//!   signature embedded in a zkLogin composite signature
//!
//! # Design
//!
//! Ephemeral keys never sign raw bytes. Every payload is first prefixed with
//! a three-byte intent and hashed, so a signature made for a personal message
//! can never be replayed as a transaction. [`Signer::sign_intent`] does both
//! steps; implementors only provide the raw digest signature.

mod error;
pub mod ed25519;
pub mod intent;
pub mod user_signature;

pub use ed25519::EphemeralKeypair;
pub use error::SignerError;
pub use intent::{IntentScope, intent_digest};
pub use user_signature::{USER_SIGNATURE_LENGTH, UserSignature};

/// Raw Ed25519 public key.
pub type PubKey = [u8; 32];

/// Signing capability for an ephemeral session key.
///
/// Implementations must be `Send + Sync` so a session can be shared across
/// tasks.
pub trait Signer: Send + Sync {
    /// Returns the Ed25519 public key.
    fn public_key(&self) -> PubKey;

    /// Signs a 32-byte intent digest, returning the raw 64-byte signature.
    fn sign_digest(&self, digest: &[u8; 32]) -> [u8; 64];

    /// Signs `payload` under `scope` and returns the serialized user signature.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::PayloadTooLarge`] if a personal message does
    /// not fit a BCS vector.
    fn sign_intent(&self, scope: IntentScope, payload: &[u8]) -> Result<UserSignature, SignerError> {
        let digest = intent_digest(scope, payload)?;
        Ok(UserSignature::new(self.sign_digest(&digest), self.public_key()))
    }
}
