//! Cryptographic primitives for the zkLogin protocol.
//!
//! Everything here is pure and deterministic: no I/O, no key storage. The
//! values produced must match, byte for byte, what the proving service and
//! the chain recompute, so every function mirrors the circuit's definition.
//!
//! | Module | Provides |
//! |--------|----------|
//! | [`poseidon`] | Poseidon over BN254 (circom parameters) and field conversions |
//! | [`field`] | Packing claim strings into field elements |
//! | [`nonce`] | Randomness, extended ephemeral public key, OAuth nonce |
//! | [`address`] | Address seed and zkLogin address derivation |

pub mod address;
mod error;
pub mod field;
pub mod nonce;
pub mod poseidon;

pub use address::{gen_address_seed, normalize_iss, zklogin_address};
pub use error::CryptoError;
pub use nonce::{extended_ephemeral_public_key, generate_nonce, generate_randomness};
