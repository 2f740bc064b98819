//! Signer error type.

use std::fmt;

/// Errors from ephemeral key handling and signing.
///
/// No string payloads -- key material must never be echoed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerError {
    /// The persisted key string could not be decoded.
    InvalidKeyEncoding,
    /// A serialized user signature has the wrong length.
    MalformedSignature,
    /// A serialized user signature carries a non-Ed25519 flag.
    UnsupportedScheme,
    /// The embedded public key is not a valid Ed25519 point.
    InvalidPublicKey,
    /// Signature verification failed.
    VerificationFailed,
    /// A personal message is too large to BCS-encode.
    PayloadTooLarge,
}

impl fmt::Display for SignerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKeyEncoding => write!(f, "invalid encoded ephemeral key"),
            Self::MalformedSignature => write!(f, "malformed user signature"),
            Self::UnsupportedScheme => write!(f, "user signature scheme is not Ed25519"),
            Self::InvalidPublicKey => write!(f, "invalid Ed25519 public key"),
            Self::VerificationFailed => write!(f, "signature verification failed"),
            Self::PayloadTooLarge => write!(f, "message too large to sign"),
        }
    }
}

impl std::error::Error for SignerError {}
