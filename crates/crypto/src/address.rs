//! Address seed and zkLogin address derivation.
//!
//! The address seed commits to the user's identity (`sub`), the OAuth client
//! (`aud`) and the user salt without revealing any of them:
//!
//! ```text
//! seed = Poseidon([ H("sub", 32), H(sub, 115), H(aud, 145), Poseidon([salt]) ])
//! ```
//!
//! where `H(s, n)` is [`hash_ascii_str_to_field`]. The address then hashes
//! the seed together with the issuer:
//!
//! ```text
//! address = Blake2b-256( 0x05 || len(iss) || iss || seed as 32 big-endian bytes )
//! ```

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use config::constants::{MAX_AUD_VALUE_LENGTH, MAX_KEY_CLAIM_NAME_LENGTH, MAX_KEY_CLAIM_VALUE_LENGTH};
use num_bigint::BigUint;
use sdk_core::{SUI_ADDRESS_LENGTH, SignatureScheme, SuiAddress};

use crate::CryptoError;
use crate::field::hash_ascii_str_to_field;
use crate::poseidon::{from_field, poseidon_hash, to_field};

type Blake2b256 = Blake2b<U32>;

/// Google issues tokens with a scheme-less `iss`; the address uses the URL form.
const GOOGLE_ISS_BARE: &str = "accounts.google.com";
const GOOGLE_ISS: &str = "https://accounts.google.com";

/// Computes the address seed for a salt and identity claims.
///
/// # Errors
///
/// Fails if a claim is non-ASCII or over its length limit, or if the salt
/// does not fit the field.
pub fn gen_address_seed(
    salt: &BigUint,
    name: &str,
    value: &str,
    aud: &str,
) -> Result<BigUint, CryptoError> {
    let salt_hash = poseidon_hash(&[to_field(salt)?])?;
    let seed = poseidon_hash(&[
        hash_ascii_str_to_field(name, MAX_KEY_CLAIM_NAME_LENGTH)?,
        hash_ascii_str_to_field(value, MAX_KEY_CLAIM_VALUE_LENGTH)?,
        hash_ascii_str_to_field(aud, MAX_AUD_VALUE_LENGTH)?,
        salt_hash,
    ])?;
    Ok(from_field(seed))
}

/// Normalizes the issuer as it is hashed into the address.
pub fn normalize_iss(iss: &str) -> &str {
    if iss == GOOGLE_ISS_BARE { GOOGLE_ISS } else { iss }
}

/// Derives the zkLogin address for an address seed and issuer.
///
/// # Errors
///
/// - [`CryptoError::IssuerTooLong`] if the normalized issuer exceeds 255 bytes
/// - [`CryptoError::FieldOverflow`] if the seed is wider than 32 bytes
pub fn zklogin_address(address_seed: &BigUint, iss: &str) -> Result<SuiAddress, CryptoError> {
    let iss = normalize_iss(iss);
    let iss_len = u8::try_from(iss.len()).map_err(|_| CryptoError::IssuerTooLong)?;

    let seed = address_seed.to_bytes_be();
    if seed.len() > 32 {
        return Err(CryptoError::FieldOverflow);
    }
    let mut seed_bytes = [0u8; 32];
    seed_bytes[32 - seed.len()..].copy_from_slice(&seed);

    let mut hasher = Blake2b256::new();
    hasher.update([SignatureScheme::ZkLogin.flag(), iss_len]);
    hasher.update(iss.as_bytes());
    hasher.update(seed_bytes);

    let mut out = [0u8; SUI_ADDRESS_LENGTH];
    out.copy_from_slice(&hasher.finalize());
    Ok(SuiAddress::new(out))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
