//! Poseidon hashing over the BN254 scalar field.
//!
//! Uses the circom parameter set (the one the zkLogin circuit is compiled
//! with), via `light-poseidon`. Inputs and outputs are [`Fr`] elements;
//! [`to_field`] and [`from_field`] convert to and from arbitrary-precision
//! integers, which is how values travel in JSON (decimal strings).

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use light_poseidon::{Poseidon, PoseidonHasher};
use num_bigint::BigUint;

use crate::CryptoError;

/// Largest input count supported by the circom parameter set.
pub const MAX_POSEIDON_INPUTS: usize = 12;

/// Poseidon hash of 1..=[`MAX_POSEIDON_INPUTS`] field elements.
///
/// # Errors
///
/// Returns [`CryptoError::PoseidonArity`] for an empty or oversized input.
pub fn poseidon_hash(inputs: &[Fr]) -> Result<Fr, CryptoError> {
    if inputs.is_empty() || inputs.len() > MAX_POSEIDON_INPUTS {
        return Err(CryptoError::PoseidonArity);
    }
    let mut hasher =
        Poseidon::<Fr>::new_circom(inputs.len()).map_err(|_| CryptoError::PoseidonArity)?;
    hasher.hash(inputs).map_err(|_| CryptoError::PoseidonFailed)
}

/// Converts an integer into a field element.
///
/// # Errors
///
/// Returns [`CryptoError::FieldOverflow`] if `value` is not below the field
/// modulus. Values are never silently reduced: the circuit would reject them.
pub fn to_field(value: &BigUint) -> Result<Fr, CryptoError> {
    let modulus = BigUint::from_bytes_le(&Fr::MODULUS.to_bytes_le());
    if value >= &modulus {
        return Err(CryptoError::FieldOverflow);
    }
    Ok(Fr::from_be_bytes_mod_order(&value.to_bytes_be()))
}

/// Converts a field element into its canonical integer.
pub fn from_field(element: Fr) -> BigUint {
    BigUint::from_bytes_be(&element.into_bigint().to_bytes_be())
}

/// Hashes integers, converting each to a field element first.
pub fn poseidon_hash_uints(inputs: &[BigUint]) -> Result<BigUint, CryptoError> {
    let elements = inputs.iter().map(to_field).collect::<Result<Vec<_>, _>>()?;
    poseidon_hash(&elements).map(from_field)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
