//! OAuth nonce derivation.
//!
//! The nonce binds an OAuth login to one ephemeral key. It is embedded in
//! the authorization request, echoed back inside the identity token, and
//! recomputed by the proving circuit from the same three ingredients:
//!
//! 1. the extended ephemeral public key (`flag || pk` as a big-endian integer),
//!    split into its high and low 128 bits
//! 2. `maxEpoch`
//! 3. `randomness` (a decimal integer string)
//!
//! `nonce = base64url(last_20_bytes(Poseidon([pk_hi, pk_lo, maxEpoch, randomness])))`
//!
//! Any drift between the values used here and the values later sent to the
//! prover surfaces only as a proof rejection, so callers must persist the
//! exact `randomness` string and `maxEpoch` they pass in.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use config::constants::RANDOMNESS_BYTES;
use num_bigint::BigUint;
use rand_core::{CryptoRng, RngCore};
use sdk_core::SignatureScheme;

use crate::CryptoError;
use crate::poseidon::poseidon_hash_uints;

/// Bytes of the Poseidon output kept in the nonce.
const NONCE_BYTES: usize = 20;

/// Generates fresh nonce randomness: 16 random bytes as a decimal string.
pub fn generate_randomness(rng: &mut (impl CryptoRng + RngCore)) -> String {
    let mut bytes = [0u8; RANDOMNESS_BYTES];
    rng.fill_bytes(&mut bytes);
    BigUint::from_bytes_be(&bytes).to_string()
}

/// The extended ephemeral public key as an integer: `0x00 || pk`, big-endian.
pub fn extended_public_key(public_key: &[u8; 32]) -> BigUint {
    let mut bytes = [0u8; 33];
    bytes[0] = SignatureScheme::Ed25519.flag();
    bytes[1..].copy_from_slice(public_key);
    BigUint::from_bytes_be(&bytes)
}

/// The extended ephemeral public key in the decimal form the prover expects.
pub fn extended_ephemeral_public_key(public_key: &[u8; 32]) -> String {
    extended_public_key(public_key).to_string()
}

/// Derives the 27-character OAuth nonce.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidRandomness`] if `randomness` is not a
/// decimal integer, or [`CryptoError::FieldOverflow`] if it does not fit the
/// field.
pub fn generate_nonce(
    public_key: &[u8; 32],
    max_epoch: u64,
    randomness: &str,
) -> Result<String, CryptoError> {
    let randomness = parse_decimal(randomness)?;
    let ext = extended_public_key(public_key);
    let low_mask = (BigUint::from(1u8) << 128u32) - 1u8;
    let hi = &ext >> 128u32;
    let lo = &ext & &low_mask;

    let hash = poseidon_hash_uints(&[hi, lo, BigUint::from(max_epoch), randomness])?;

    let bytes = hash.to_bytes_be();
    let mut padded = [0u8; 32];
    padded[32 - bytes.len()..].copy_from_slice(&bytes);

    Ok(URL_SAFE_NO_PAD.encode(&padded[32 - NONCE_BYTES..]))
}

fn parse_decimal(s: &str) -> Result<BigUint, CryptoError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CryptoError::InvalidRandomness);
    }
    BigUint::parse_bytes(s.as_bytes(), 10).ok_or(CryptoError::InvalidRandomness)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
