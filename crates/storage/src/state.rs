//! The persisted settings object.

use std::fmt;

use sdk_core::ZkProof;
use serde::{Deserialize, Serialize};

/// The whole persisted object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub zklogin: ZkLoginSettings,
    pub app: AppSession,
}

impl PersistedState {
    /// True when neither namespace holds anything.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Clears both namespaces.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// zkLogin session fields.
///
/// `proof_public_key` is the hex Ed25519 public key the cached proof was
/// issued for. A proof whose key differs from the active key is stale.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ZkLoginSettings {
    pub enabled: bool,
    /// `suiprivkey1...` encoding of the ephemeral secret.
    pub ephemeral_secret_key: Option<String>,
    /// Nonce randomness, decimal.
    pub randomness: Option<String>,
    pub max_epoch: Option<u64>,
    pub id_token: Option<String>,
    pub proof: Option<ZkProof>,
    pub proof_public_key: Option<String>,
}

impl ZkLoginSettings {
    /// Returns the cached proof only if it was issued for `public_key_hex`.
    pub fn proof_for(&self, public_key_hex: &str) -> Option<&ZkProof> {
        match (&self.proof, &self.proof_public_key) {
            (Some(proof), Some(pk)) if pk == public_key_hex => Some(proof),
            _ => None,
        }
    }
}

impl fmt::Debug for ZkLoginSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZkLoginSettings")
            .field("enabled", &self.enabled)
            .field("ephemeral_secret_key", &redacted(&self.ephemeral_secret_key))
            .field("randomness", &redacted(&self.randomness))
            .field("max_epoch", &self.max_epoch)
            .field("id_token", &redacted(&self.id_token))
            .field("proof", &self.proof.is_some())
            .field("proof_public_key", &self.proof_public_key)
            .finish()
    }
}

/// Application session namespace.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSession {
    pub logged_in: bool,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl fmt::Debug for AppSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSession")
            .field("logged_in", &self.logged_in)
            .field("access_token", &redacted(&self.access_token))
            .field("refresh_token", &redacted(&self.refresh_token))
            .finish()
    }
}

fn redacted(value: &Option<String>) -> &'static str {
    match value {
        Some(_) => "<redacted>",
        None => "<none>",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
