//! Ephemeral Ed25519 keypair.
//!
//! A session key lives only until its `maxEpoch`. It is generated locally,
//! persisted in `suiprivkey` form, and discarded on disconnect. The secret is
//! zeroized when the keypair is dropped.

use std::fmt;

use ed25519_dalek::{Signer as _, SigningKey};
use rand_core::{CryptoRng, RngCore};
use sdk_core::{decode_private_key, encode_private_key};
use zeroize::Zeroize;

use crate::{PubKey, Signer, SignerError};

/// Ephemeral Ed25519 signing key.
pub struct EphemeralKeypair {
    signing_key: SigningKey,
    public_key: PubKey,
}

impl EphemeralKeypair {
    /// Generates a fresh keypair.
    pub fn generate(rng: &mut (impl CryptoRng + RngCore)) -> Self {
        Self::from_signing_key(SigningKey::generate(rng))
    }

    /// Restores a keypair from its raw 32-byte secret.
    pub fn from_secret_bytes(secret: &[u8; 32]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(secret))
    }

    /// Restores a keypair from its `suiprivkey1...` encoding.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::InvalidKeyEncoding`] if the string is not a
    /// valid Ed25519 private key encoding.
    pub fn from_encoded(encoded: &str) -> Result<Self, SignerError> {
        let mut secret = decode_private_key(encoded).map_err(|_| SignerError::InvalidKeyEncoding)?;
        let keypair = Self::from_secret_bytes(&secret);
        secret.zeroize();
        Ok(keypair)
    }

    /// Encodes the secret as `suiprivkey1...` for persistence.
    pub fn to_encoded(&self) -> String {
        let mut secret = self.signing_key.to_bytes();
        let encoded = encode_private_key(&secret);
        secret.zeroize();
        encoded
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let public_key = signing_key.verifying_key().to_bytes();
        Self {
            signing_key,
            public_key,
        }
    }
}

impl Signer for EphemeralKeypair {
    fn public_key(&self) -> PubKey {
        self.public_key
    }

    fn sign_digest(&self, digest: &[u8; 32]) -> [u8; 64] {
        self.signing_key.sign(digest).to_bytes()
    }
}

impl fmt::Debug for EphemeralKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EphemeralKeypair")
            .field("public_key", &hex::encode(self.public_key))
            .finish_non_exhaustive()
    }
}
