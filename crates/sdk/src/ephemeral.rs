//! Ephemeral key manager.
//!
//! Restores the session key from its persisted encoding or generates a new
//! one, and binds it to an epoch window. Persisting is the caller's job:
//! [`KeyOrigin::Generated`] tells it the secret has not been stored yet.

use rand_core::{CryptoRng, RngCore};
use signer::EphemeralKeypair;

use crate::ZkLoginError;

/// Whether [`get_or_create`] restored or generated the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrigin {
    Restored,
    /// Fresh key. Must be persisted before it is used in a nonce.
    Generated,
}

/// Restores the keypair from `persisted`, or generates a fresh one.
///
/// # Errors
///
/// Returns [`ZkLoginError::Signer`] if `persisted` is not a valid key
/// encoding. A corrupt key is never silently replaced.
pub fn get_or_create(
    persisted: Option<&str>,
    rng: &mut (impl CryptoRng + RngCore),
) -> Result<(EphemeralKeypair, KeyOrigin), ZkLoginError> {
    match persisted {
        Some(encoded) => Ok((EphemeralKeypair::from_encoded(encoded)?, KeyOrigin::Restored)),
        None => Ok((EphemeralKeypair::generate(rng), KeyOrigin::Generated)),
    }
}

/// The last epoch the key is valid for: `current_epoch + margin`.
pub fn bind_epoch(current_epoch: u64, margin: u64) -> u64 {
    current_epoch.saturating_add(margin)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
