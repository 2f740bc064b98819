//! Core types and utilities for the zkLogin SDK.
//!
//! This crate provides foundational types shared by every other crate in
//! the workspace:
//!
//! - [`Network`] -- chain network identifier (Mainnet, Testnet, Devnet)
//! - [`SuiAddress`] -- 32-byte account address, `0x`-prefixed hex
//! - [`SignatureScheme`] -- one-byte scheme flags used in serialized signatures
//! - [`private_key`] -- bech32 `suiprivkey` encoding for persisted key material
//! - [`ZkProof`] -- the partial zkLogin signature returned by the proving service
//!
//! `sdk-core` has no runtime dependencies (no async, no I/O) so it can be
//! used freely as a leaf dependency.

pub mod private_key;
pub mod proof;
pub mod sui_address;

pub use private_key::{KeyEncodingError, decode_private_key, encode_private_key};
pub use proof::{IssBase64Details, ProofPoints, ZkProof};
pub use sui_address::{AddressError, SUI_ADDRESS_LENGTH, SuiAddress};

use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// Chain network identifier.
///
/// Determines the default fullnode RPC endpoint the SDK talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    /// Production network.
    Mainnet,

    /// Public test network.
    Testnet,

    /// Developer network (wiped periodically).
    Devnet,
}

impl Network {
    /// Returns the lowercase network name (`mainnet`, `testnet`, `devnet`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Devnet => "devnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "devnet" => Ok(Self::Devnet),
            _ => Err(UnknownNetwork),
        }
    }
}

/// Returned by [`Network::from_str`] for an unrecognized network name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownNetwork;

impl fmt::Display for UnknownNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown network (expected mainnet, testnet or devnet)")
    }
}

impl std::error::Error for UnknownNetwork {}

// ---------------------------------------------------------------------------
// SignatureScheme
// ---------------------------------------------------------------------------

/// Signature scheme flag, the first byte of every serialized signature and
/// of the preimage hashed into an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SignatureScheme {
    /// Pure Ed25519 (used by ephemeral keys).
    Ed25519 = 0x00,

    /// zkLogin composite signature.
    ZkLogin = 0x05,
}

impl SignatureScheme {
    /// Returns the one-byte flag.
    #[inline]
    pub const fn flag(self) -> u8 {
        self as u8
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_parses_case_insensitively() {
        assert_eq!("Mainnet".parse::<Network>(), Ok(Network::Mainnet));
        assert_eq!("TESTNET".parse::<Network>(), Ok(Network::Testnet));
        assert_eq!("devnet".parse::<Network>(), Ok(Network::Devnet));
        assert_eq!("regtest".parse::<Network>(), Err(UnknownNetwork));
    }

    #[test]
    fn network_display_matches_as_str() {
        for n in [Network::Mainnet, Network::Testnet, Network::Devnet] {
            assert_eq!(n.to_string(), n.as_str());
        }
    }

    #[test]
    fn scheme_flags() {
        assert_eq!(SignatureScheme::Ed25519.flag(), 0x00);
        assert_eq!(SignatureScheme::ZkLogin.flag(), 0x05);
    }
}
