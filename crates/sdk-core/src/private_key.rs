//! Bech32 encoding for persisted private keys.
//!
//! Ephemeral secret keys are persisted in the wallet-standard string form:
//! a Bech32 (not Bech32m) string with human-readable part `suiprivkey` whose
//! payload is the one-byte [`SignatureScheme`](crate::SignatureScheme) flag
//! followed by the 32-byte secret.
//!
//! # Format
//!
//! | Field | Size | Value |
//! |-------|------|-------|
//! | flag | 1 | `0x00` (Ed25519) |
//! | secret | 32 | raw Ed25519 seed |
//!
//! Only Ed25519 keys are produced or accepted; ephemeral keys are never
//! anything else.

use std::borrow::Cow;
use std::fmt;

use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32, Hrp};

use crate::SignatureScheme;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Human-readable part for encoded private keys.
pub const PRIVATE_KEY_HRP: &str = "suiprivkey";

/// Length of a raw Ed25519 secret.
const SECRET_LEN: usize = 32;

/// Payload length: flag + secret.
const PAYLOAD_LEN: usize = 1 + SECRET_LEN;

// ---------------------------------------------------------------------------
// Encode / decode
// ---------------------------------------------------------------------------

/// Encodes a 32-byte Ed25519 secret as a `suiprivkey1...` string.
pub fn encode_private_key(secret: &[u8; SECRET_LEN]) -> String {
    let hrp = Hrp::parse(PRIVATE_KEY_HRP).expect("HRP constant is valid");
    let mut payload = [0u8; PAYLOAD_LEN];
    payload[0] = SignatureScheme::Ed25519.flag();
    payload[1..].copy_from_slice(secret);
    bech32::encode::<Bech32>(hrp, &payload).expect("33-byte payload is within bech32 limits")
}

/// Decodes a `suiprivkey1...` string into the raw 32-byte Ed25519 secret.
///
/// Bech32 is case-insensitive; mixed-case input is normalized first.
///
/// # Errors
///
/// - [`KeyEncodingError::Bech32`] if the checksum or charset is invalid
/// - [`KeyEncodingError::WrongPrefix`] if the HRP is not `suiprivkey`
/// - [`KeyEncodingError::BadLength`] if the payload is not 33 bytes
/// - [`KeyEncodingError::UnsupportedScheme`] if the flag is not Ed25519
pub fn decode_private_key(s: &str) -> Result<[u8; SECRET_LEN], KeyEncodingError> {
    let normalized: Cow<'_, str> = if s.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(s.to_lowercase())
    } else {
        Cow::Borrowed(s)
    };

    let checked =
        CheckedHrpstring::new::<Bech32>(&normalized).map_err(|_| KeyEncodingError::Bech32)?;

    if checked.hrp().as_str() != PRIVATE_KEY_HRP {
        return Err(KeyEncodingError::WrongPrefix);
    }

    let mut buf = [0u8; PAYLOAD_LEN];
    let mut len = 0;
    for byte in checked.byte_iter() {
        if len >= PAYLOAD_LEN {
            return Err(KeyEncodingError::BadLength);
        }
        buf[len] = byte;
        len += 1;
    }
    if len != PAYLOAD_LEN {
        return Err(KeyEncodingError::BadLength);
    }
    if buf[0] != SignatureScheme::Ed25519.flag() {
        return Err(KeyEncodingError::UnsupportedScheme);
    }

    let mut secret = [0u8; SECRET_LEN];
    secret.copy_from_slice(&buf[1..]);
    Ok(secret)
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors from decoding a persisted private key.
///
/// No string payloads -- the input is secret material and must not be echoed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEncodingError {
    /// Bech32 decoding failed (bad checksum or charset).
    Bech32,

    /// The human-readable part is not `suiprivkey`.
    WrongPrefix,

    /// The payload is not flag + 32 bytes.
    BadLength,

    /// The scheme flag is not Ed25519.
    UnsupportedScheme,
}

impl fmt::Display for KeyEncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bech32 => write!(f, "invalid bech32 private key"),
            Self::WrongPrefix => write!(f, "private key prefix is not {PRIVATE_KEY_HRP}"),
            Self::BadLength => write!(f, "private key payload has wrong length"),
            Self::UnsupportedScheme => write!(f, "private key scheme is not Ed25519"),
        }
    }
}

impl std::error::Error for KeyEncodingError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
