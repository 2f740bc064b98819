//! Proving-service wire types.
//!
//! [`ZkProof`] is the "partial zkLogin signature": everything the chain needs
//! to verify a zkLogin signature except the address seed, which is computed
//! locally from the salt and identity claims. Because the seed is excluded the
//! same proof can back any number of signatures made with the ephemeral key
//! it was issued for.
//!
//! The JSON shape matches the proving service response:
//!
//! ```json
//! {
//!   "proofPoints": { "a": ["..", "..", "1"], "b": [["..", ".."], ["..", ".."], ["1", "0"]], "c": [..] },
//!   "issBase64Details": { "value": "wiaXNzIjoi...", "indexMod4": 2 },
//!   "headerBase64": "eyJhbGciOi..."
//! }
//! ```
//!
//! Field order in each struct is also the BCS order used when the proof is
//! embedded in a composite signature, so it must not be rearranged.

use serde::{Deserialize, Serialize};

/// Groth16 proof points as decimal field-element strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofPoints {
    /// G1 point, projective (x, y, z).
    pub a: Vec<String>,
    /// G2 point, projective, each coordinate an Fq2 pair.
    pub b: Vec<Vec<String>>,
    /// G1 point, projective (x, y, z).
    pub c: Vec<String>,
}

/// The `iss` claim as it appears base64-encoded inside the JWT payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssBase64Details {
    /// Base64url substring covering the `"iss":"..."` claim.
    pub value: String,
    /// Offset of `value` within the payload, modulo 4.
    pub index_mod4: u8,
}

/// Partial zkLogin signature returned by the proving service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZkProof {
    /// Groth16 proof points.
    pub proof_points: ProofPoints,
    /// Encoded issuer claim details.
    pub iss_base64_details: IssBase64Details,
    /// Base64url JWT header.
    pub header_base64: String,
}

impl ZkProof {
    /// Checks the structural shape of the proof points.
    ///
    /// `a` and `c` must hold three coordinates, `b` three pairs, and every
    /// coordinate must be a non-empty decimal string. This does not verify
    /// the proof; it only rejects responses that could never serialize into a
    /// valid signature.
    pub fn is_well_formed(&self) -> bool {
        let decimal = |s: &String| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        let p = &self.proof_points;

        p.a.len() == 3
            && p.c.len() == 3
            && p.b.len() == 3
            && p.a.iter().all(decimal)
            && p.c.iter().all(decimal)
            && p.b.iter().all(|pair| pair.len() == 2 && pair.iter().all(decimal))
            && !self.header_base64.is_empty()
            && !self.iss_base64_details.value.is_empty()
            && self.iss_base64_details.index_mod4 < 4
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
