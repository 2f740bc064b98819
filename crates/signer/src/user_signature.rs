//! Serialized Ed25519 user signatures.
//!
//! | Field | Size |
//! |-------|------|
//! | scheme flag (`0x00`) | 1 |
//! | signature | 64 |
//! | public key | 32 |

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use sdk_core::SignatureScheme;

use crate::{PubKey, SignerError};

/// Total length of a serialized user signature.
pub const USER_SIGNATURE_LENGTH: usize = 1 + 64 + 32;

/// An ephemeral-key signature together with the key that made it.
#[derive(Clone, PartialEq, Eq)]
pub struct UserSignature([u8; USER_SIGNATURE_LENGTH]);

impl UserSignature {
    /// Serializes a raw signature and public key.
    pub fn new(signature: [u8; 64], public_key: PubKey) -> Self {
        let mut bytes = [0u8; USER_SIGNATURE_LENGTH];
        bytes[0] = SignatureScheme::Ed25519.flag();
        bytes[1..65].copy_from_slice(&signature);
        bytes[65..].copy_from_slice(&public_key);
        Self(bytes)
    }

    /// Parses a serialized user signature.
    ///
    /// # Errors
    ///
    /// [`SignerError::MalformedSignature`] for a wrong length,
    /// [`SignerError::UnsupportedScheme`] for a non-Ed25519 flag.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignerError> {
        let bytes: [u8; USER_SIGNATURE_LENGTH] = bytes
            .try_into()
            .map_err(|_| SignerError::MalformedSignature)?;
        if bytes[0] != SignatureScheme::Ed25519.flag() {
            return Err(SignerError::UnsupportedScheme);
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; USER_SIGNATURE_LENGTH] {
        &self.0
    }

    /// The raw 64-byte signature.
    pub fn signature(&self) -> [u8; 64] {
        let mut sig = [0u8; 64];
        sig.copy_from_slice(&self.0[1..65]);
        sig
    }

    /// The public key that produced the signature.
    pub fn public_key(&self) -> PubKey {
        let mut pk = [0u8; 32];
        pk.copy_from_slice(&self.0[65..]);
        pk
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Verifies the signature over an intent digest.
    pub fn verify(&self, digest: &[u8; 32]) -> Result<(), SignerError> {
        let key =
            VerifyingKey::from_bytes(&self.public_key()).map_err(|_| SignerError::InvalidPublicKey)?;
        let sig = Signature::from_bytes(&self.signature());
        key.verify(digest, &sig)
            .map_err(|_| SignerError::VerificationFailed)
    }
}

impl fmt::Debug for UserSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserSignature({})", self.to_base64())
    }
}
