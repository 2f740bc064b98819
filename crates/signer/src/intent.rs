//! Intent-prefixed signing digests.
//!
//! | Scope | Intent | Payload hashed |
//! |-------|--------|----------------|
//! | [`IntentScope::TransactionData`] | `[0, 0, 0]` | BCS transaction bytes as given |
//! | [`IntentScope::PersonalMessage`] | `[3, 0, 0]` | message wrapped as BCS `vector<u8>` |
//!
//! The digest is `Blake2b-256(intent || payload)`.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

use crate::SignerError;

type Blake2b256 = Blake2b<U32>;

/// Intent version and app id are fixed at zero.
const INTENT_VERSION: u8 = 0;
const INTENT_APP_ID: u8 = 0;

/// What a signature authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum IntentScope {
    /// A transaction to be executed on chain.
    TransactionData = 0,
    /// An arbitrary off-chain message.
    PersonalMessage = 3,
}

impl IntentScope {
    /// The three-byte intent prefix.
    pub const fn prefix(self) -> [u8; 3] {
        [self as u8, INTENT_VERSION, INTENT_APP_ID]
    }
}

/// Computes the digest an ephemeral key signs for `payload` under `scope`.
pub fn intent_digest(scope: IntentScope, payload: &[u8]) -> Result<[u8; 32], SignerError> {
    let mut hasher = Blake2b256::new();
    hasher.update(scope.prefix());
    match scope {
        IntentScope::TransactionData => hasher.update(payload),
        IntentScope::PersonalMessage => {
            let wrapped = bcs::to_bytes(payload).map_err(|_| SignerError::PayloadTooLarge)?;
            hasher.update(&wrapped);
        }
    }
    Ok(hasher.finalize().into())
}
