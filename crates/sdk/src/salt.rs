//! Salt decoding and address derivation.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use config::constants::KEY_CLAIM_NAME;
use num_bigint::BigUint;
use sdk_core::SuiAddress;

use crate::ZkLoginError;
use crate::jwt::IdentityClaims;

/// Decodes a base64 salt into its big-endian integer value.
///
/// `"AAE="` decodes to `1`.
pub fn decode_salt(encoded: &str) -> Result<BigUint, ZkLoginError> {
    let encoded = encoded.trim();
    let bytes = STANDARD
        .decode(encoded)
        .or_else(|_| URL_SAFE.decode(encoded))
        .map_err(|_| ZkLoginError::MalformedSalt)?;
    if bytes.is_empty() {
        return Err(ZkLoginError::MalformedSalt);
    }
    Ok(BigUint::from_bytes_be(&bytes))
}

/// An address together with the seed it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedAddress {
    pub address: SuiAddress,
    pub address_seed: BigUint,
}

/// Derives the on-chain address for identity claims and a salt.
///
/// Pure and deterministic: the same `(iss, sub, aud, salt)` always yields
/// the same address.
pub fn derive_address(
    claims: &IdentityClaims,
    salt: &BigUint,
) -> Result<DerivedAddress, ZkLoginError> {
    let address_seed = derive_address_seed(salt, &claims.sub, &claims.aud)?;
    let address = zk_crypto::zklogin_address(&address_seed, &claims.iss)?;
    Ok(DerivedAddress {
        address,
        address_seed,
    })
}

/// Derives the address seed from the salt and the `sub`/`aud` claims.
pub fn derive_address_seed(salt: &BigUint, sub: &str, aud: &str) -> Result<BigUint, ZkLoginError> {
    Ok(zk_crypto::gen_address_seed(salt, KEY_CLAIM_NAME, sub, aud)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
