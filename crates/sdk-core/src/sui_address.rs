//! Account addresses.
//!
//! An address is 32 bytes, rendered as `0x` followed by 64 lowercase hex
//! characters. Parsing accepts short forms (`0x2`) and left-pads them with
//! zeros, matching how fullnodes normalize addresses.
//!
//! # Example
//!
//! ```rust
//! use sdk_core::SuiAddress;
//!
//! let addr: SuiAddress = "0x2".parse().unwrap();
//! assert_eq!(
//!     addr.to_string(),
//!     "0x0000000000000000000000000000000000000000000000000000000000000002"
//! );
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Length of an address in bytes.
pub const SUI_ADDRESS_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// SuiAddress
// ---------------------------------------------------------------------------

/// A 32-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SuiAddress([u8; SUI_ADDRESS_LENGTH]);

impl SuiAddress {
    /// The all-zero address.
    pub const ZERO: Self = Self([0u8; SUI_ADDRESS_LENGTH]);

    /// Wraps raw address bytes.
    pub const fn new(bytes: [u8; SUI_ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Returns the raw address bytes.
    pub const fn as_bytes(&self) -> &[u8; SUI_ADDRESS_LENGTH] {
        &self.0
    }

    /// Parses an address from hex, with or without the `0x` prefix.
    ///
    /// # Errors
    ///
    /// - [`AddressError::Empty`] for an empty string or a bare `0x`
    /// - [`AddressError::TooLong`] for more than 64 hex digits
    /// - [`AddressError::InvalidHex`] for non-hex characters
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        if digits.is_empty() {
            return Err(AddressError::Empty);
        }
        if digits.len() > SUI_ADDRESS_LENGTH * 2 {
            return Err(AddressError::TooLong);
        }

        // Left-pad to 64 digits so short forms like `0x2` decode.
        let padded = format!("{digits:0>64}");
        let mut bytes = [0u8; SUI_ADDRESS_LENGTH];
        hex::decode_to_slice(&padded, &mut bytes).map_err(|_| AddressError::InvalidHex)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SuiAddress({self})")
    }
}

impl FromStr for SuiAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<[u8; SUI_ADDRESS_LENGTH]> for SuiAddress {
    fn from(bytes: [u8; SUI_ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl Serialize for SuiAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SuiAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors that can occur when parsing an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressError {
    /// No hex digits were supplied.
    Empty,

    /// More than 64 hex digits were supplied.
    TooLong,

    /// The string contains a non-hex character.
    InvalidHex,
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty address"),
            Self::TooLong => write!(f, "address longer than 32 bytes"),
            Self::InvalidHex => write!(f, "address is not valid hex"),
        }
    }
}

impl std::error::Error for AddressError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
