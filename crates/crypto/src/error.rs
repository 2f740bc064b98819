//! Crypto error type.

use std::fmt;

/// Errors from zkLogin cryptographic derivations.
///
/// No string payloads -- every variant is a zero-size discriminant. Inputs
/// include identity claims, which must not leak through error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    /// Poseidon was asked to hash zero inputs or more than the supported maximum.
    PoseidonArity,
    /// The Poseidon permutation rejected its inputs.
    PoseidonFailed,
    /// An integer does not fit in the BN254 scalar field.
    FieldOverflow,
    /// A claim string exceeds its circuit length limit.
    ClaimTooLong,
    /// A claim string contains non-ASCII bytes.
    NonAsciiClaim,
    /// The nonce randomness is not a decimal integer.
    InvalidRandomness,
    /// The issuer does not fit in a one-byte length prefix.
    IssuerTooLong,
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PoseidonArity => write!(f, "unsupported number of Poseidon inputs"),
            Self::PoseidonFailed => write!(f, "Poseidon hash failed"),
            Self::FieldOverflow => write!(f, "value exceeds the BN254 scalar field"),
            Self::ClaimTooLong => write!(f, "claim exceeds its maximum length"),
            Self::NonAsciiClaim => write!(f, "claim contains non-ASCII characters"),
            Self::InvalidRandomness => write!(f, "randomness is not a decimal integer"),
            Self::IssuerTooLong => write!(f, "issuer longer than 255 bytes"),
        }
    }
}

impl std::error::Error for CryptoError {}
