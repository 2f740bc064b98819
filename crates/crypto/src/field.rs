//! Packing claim strings into field elements.
//!
//! A claim is right-padded with NUL bytes to its circuit limit, split into
//! 31-byte chunks (so each chunk fits below the field modulus), each chunk
//! read big-endian, and the chunks Poseidon-hashed together. Padding to the
//! limit rather than to the claim's own length keeps the input count fixed
//! per claim kind, as the circuit requires.
//!
//! Chunks are cut from the end of the padded bytes, so when the length is
//! not a multiple of 31 the short chunk is the first one. The circuit reads
//! the string as one big-endian integer in base 2^248.

use ark_bn254::Fr;
use ark_ff::PrimeField;

use crate::CryptoError;
use crate::poseidon::poseidon_hash;

/// Bytes packed into each field element.
pub const PACK_WIDTH_BYTES: usize = 31;

/// Hashes an ASCII string, padded to `max_len`, into a single field element.
///
/// # Errors
///
/// - [`CryptoError::NonAsciiClaim`] if `s` contains non-ASCII bytes
/// - [`CryptoError::ClaimTooLong`] if `s` is longer than `max_len`
pub fn hash_ascii_str_to_field(s: &str, max_len: usize) -> Result<Fr, CryptoError> {
    if !s.is_ascii() {
        return Err(CryptoError::NonAsciiClaim);
    }
    if s.len() > max_len {
        return Err(CryptoError::ClaimTooLong);
    }

    let mut padded = s.as_bytes().to_vec();
    padded.resize(max_len, 0);

    let mut packed: Vec<Fr> = padded
        .rchunks(PACK_WIDTH_BYTES)
        .map(Fr::from_be_bytes_mod_order)
        .collect();
    packed.reverse();
    poseidon_hash(&packed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
