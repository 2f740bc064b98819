//! Composite zkLogin signatures.
//!
//! A composite signature binds the partial proof, the address seed, the
//! key's `maxEpoch` and an ephemeral [`UserSignature`] into the form the
//! chain verifies.
//!
//! # Layout
//!
//! | Field | Encoding |
//! |-------|----------|
//! | flag | `0x05` |
//! | body | BCS of [`ZkLoginSignature`] |
//!
//! The whole thing is rendered as standard base64 for transport.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use num_bigint::BigUint;
use sdk_core::{IssBase64Details, ProofPoints, SignatureScheme, ZkProof};
use serde::{Deserialize, Serialize};
use signer::UserSignature;

use crate::ZkLoginError;

// ---------------------------------------------------------------------------
// BCS body
// ---------------------------------------------------------------------------

/// Proof inputs as embedded in a signature. Field order is the BCS order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZkLoginInputs {
    pub proof_points: ProofPoints,
    pub iss_base64_details: IssBase64Details,
    pub header_base64: String,
    /// Decimal address seed.
    pub address_seed: String,
}

/// BCS body of a composite signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZkLoginSignature {
    pub inputs: ZkLoginInputs,
    pub max_epoch: u64,
    /// Serialized ephemeral [`UserSignature`].
    pub user_signature: Vec<u8>,
}

// ---------------------------------------------------------------------------
// CompositeSignature
// ---------------------------------------------------------------------------

/// Serialized composite signature: flag byte followed by the BCS body.
#[derive(Clone, PartialEq, Eq)]
pub struct CompositeSignature(Vec<u8>);

impl CompositeSignature {
    /// The serialized bytes, flag included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    /// Parses a base64 composite signature.
    pub fn from_base64(encoded: &str) -> Result<Self, ZkLoginError> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|_| ZkLoginError::Encoding)?;
        let sig = Self(bytes);
        sig.decode()?;
        Ok(sig)
    }

    /// Decodes the BCS body.
    pub fn decode(&self) -> Result<ZkLoginSignature, ZkLoginError> {
        match self.0.split_first() {
            Some((&flag, body)) if flag == SignatureScheme::ZkLogin.flag() => {
                bcs::from_bytes(body).map_err(|_| ZkLoginError::Encoding)
            }
            _ => Err(ZkLoginError::Encoding),
        }
    }
}

impl fmt::Debug for CompositeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompositeSignature({} bytes)", self.0.len())
    }
}

impl fmt::Display for CompositeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

/// Combines an ephemeral signature with its proof into a composite signature.
///
/// The caller is responsible for checking that `user_signature` was made by
/// the key `proof` was issued for and that `max_epoch` has not passed.
pub fn compose_signature(
    user_signature: &UserSignature,
    proof: &ZkProof,
    address_seed: &BigUint,
    max_epoch: u64,
) -> Result<CompositeSignature, ZkLoginError> {
    let body = ZkLoginSignature {
        inputs: ZkLoginInputs {
            proof_points: proof.proof_points.clone(),
            iss_base64_details: proof.iss_base64_details.clone(),
            header_base64: proof.header_base64.clone(),
            address_seed: address_seed.to_string(),
        },
        max_epoch,
        user_signature: user_signature.as_bytes().to_vec(),
    };

    let encoded = bcs::to_bytes(&body).map_err(|_| ZkLoginError::Encoding)?;
    let mut bytes = Vec::with_capacity(1 + encoded.len());
    bytes.push(SignatureScheme::ZkLogin.flag());
    bytes.extend_from_slice(&encoded);
    Ok(CompositeSignature(bytes))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
