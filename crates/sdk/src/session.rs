//! The session aggregate.
//!
//! [`Session`] holds everything a signing session is made of: the active
//! ephemeral key with its epoch bound and nonce randomness, the identity
//! token and its claims, the salt, the derived address, and the proof. Only
//! [`Session::signing_parts`] hands those out, and only once every piece is
//! present and bound to the same key.
//!
//! The aggregate never talks to storage. The controller converts it to and
//! from [`ZkLoginSettings`] and is the only place state is persisted or
//! cleared.

use num_bigint::BigUint;
use sdk_core::{SuiAddress, ZkProof};
use signer::{EphemeralKeypair, PubKey, Signer};
use storage::ZkLoginSettings;

use crate::ZkLoginError;
use crate::jwt::IdentityClaims;
use crate::salt::DerivedAddress;

/// A proof together with the public key it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BoundProof {
    pub proof: ZkProof,
    pub public_key: PubKey,
}

/// Everything needed to produce a composite signature.
pub(crate) struct SigningParts<'a> {
    pub key: &'a EphemeralKeypair,
    pub proof: &'a ZkProof,
    pub address_seed: &'a BigUint,
    pub address: SuiAddress,
    pub max_epoch: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Session {
    key: Option<EphemeralKeypair>,
    max_epoch: Option<u64>,
    randomness: Option<String>,
    id_token: Option<String>,
    claims: Option<IdentityClaims>,
    salt: Option<BigUint>,
    derived: Option<DerivedAddress>,
    proof: Option<BoundProof>,
}

impl Session {
    /// Restores a session from persisted settings.
    ///
    /// A cached proof is only restored if it is bound to the persisted key.
    /// Claims, salt and address are never persisted and must be resolved
    /// again.
    pub fn from_settings(settings: &ZkLoginSettings) -> Result<Self, ZkLoginError> {
        let key = settings
            .ephemeral_secret_key
            .as_deref()
            .map(EphemeralKeypair::from_encoded)
            .transpose()?;

        let proof = key.as_ref().and_then(|k| {
            let public_key = k.public_key();
            settings
                .proof_for(&hex::encode(public_key))
                .map(|proof| BoundProof {
                    proof: proof.clone(),
                    public_key,
                })
        });

        Ok(Self {
            key,
            max_epoch: settings.max_epoch,
            randomness: settings.randomness.clone(),
            id_token: settings.id_token.clone(),
            proof,
            ..Self::default()
        })
    }

    /// The persisted form. Derived values are left out.
    pub fn to_settings(&self) -> ZkLoginSettings {
        ZkLoginSettings {
            enabled: self.key.is_some(),
            ephemeral_secret_key: self.key.as_ref().map(EphemeralKeypair::to_encoded),
            randomness: self.randomness.clone(),
            max_epoch: self.max_epoch,
            id_token: self.id_token.clone(),
            proof: self.proof.as_ref().map(|b| b.proof.clone()),
            proof_public_key: self.proof.as_ref().map(|b| hex::encode(b.public_key)),
        }
    }

    /// Makes `key` the active key.
    ///
    /// Everything bound to a previous key goes with it: the proof, the
    /// identity token (whose nonce names the old key) and what was
    /// resolved from it.
    pub fn install_key(&mut self, key: EphemeralKeypair, max_epoch: u64, randomness: String) {
        *self = Self {
            key: Some(key),
            max_epoch: Some(max_epoch),
            randomness: Some(randomness),
            ..Self::default()
        };
    }

    /// Drops every field.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn key(&self) -> Option<&EphemeralKeypair> {
        self.key.as_ref()
    }

    pub fn max_epoch(&self) -> Option<u64> {
        self.max_epoch
    }

    pub fn randomness(&self) -> Option<&str> {
        self.randomness.as_deref()
    }

    pub fn id_token(&self) -> Option<&str> {
        self.id_token.as_deref()
    }

    pub fn salt(&self) -> Option<&BigUint> {
        self.salt.as_ref()
    }

    /// Stores the identity token. Returns `true` if it replaced a different
    /// one, in which case everything resolved from the old token is dropped,
    /// the proof included.
    pub fn set_id_token(&mut self, id_token: String) -> bool {
        let changed = self.id_token.as_deref() != Some(id_token.as_str());
        if changed {
            self.claims = None;
            self.salt = None;
            self.derived = None;
            self.proof = None;
        }
        self.id_token = Some(id_token);
        changed
    }

    pub fn set_claims(&mut self, claims: IdentityClaims) {
        self.claims = Some(claims);
    }

    pub fn set_salt(&mut self, salt: BigUint) {
        self.salt = Some(salt);
    }

    pub fn set_derived(&mut self, derived: DerivedAddress) {
        self.derived = Some(derived);
    }

    /// The cached proof, if it is bound to the active key.
    pub fn bound_proof(&self) -> Option<&ZkProof> {
        let key = self.key.as_ref()?;
        self.proof
            .as_ref()
            .filter(|b| b.public_key == key.public_key())
            .map(|b| &b.proof)
    }

    /// Caches `proof` for the active key.
    pub fn set_proof(&mut self, proof: ZkProof) -> Result<(), ZkLoginError> {
        let key = self.key.as_ref().ok_or(ZkLoginError::KeyUnavailable)?;
        self.proof = Some(BoundProof {
            proof,
            public_key: key.public_key(),
        });
        Ok(())
    }

    /// The derived address, exposed only while a proof for the active key is
    /// cached.
    pub fn address(&self) -> Option<SuiAddress> {
        self.bound_proof()?;
        self.derived.as_ref().map(|d| d.address)
    }

    /// Checks readiness at `current_epoch` and returns the signing inputs.
    ///
    /// # Errors
    ///
    /// - [`ZkLoginError::KeyUnavailable`] if no key or epoch bound exists
    /// - [`ZkLoginError::SessionNotReady`] if there is no proof for the
    ///   active key or the identity token is gone
    /// - [`ZkLoginError::SaltMissing`] if the salt was never resolved
    /// - [`ZkLoginError::AddressSeedMissing`] if no address was derived
    /// - [`ZkLoginError::EpochExpired`] if `current_epoch` is past `maxEpoch`
    pub fn signing_parts(&self, current_epoch: u64) -> Result<SigningParts<'_>, ZkLoginError> {
        let key = self.key.as_ref().ok_or(ZkLoginError::KeyUnavailable)?;
        let max_epoch = self.max_epoch.ok_or(ZkLoginError::KeyUnavailable)?;
        let proof = self.bound_proof().ok_or(ZkLoginError::SessionNotReady)?;
        if self.id_token.is_none() || self.claims.is_none() {
            return Err(ZkLoginError::SessionNotReady);
        }
        if self.salt.is_none() {
            return Err(ZkLoginError::SaltMissing);
        }
        let derived = self
            .derived
            .as_ref()
            .ok_or(ZkLoginError::AddressSeedMissing)?;
        if current_epoch > max_epoch {
            return Err(ZkLoginError::EpochExpired {
                max_epoch,
                current: current_epoch,
            });
        }

        Ok(SigningParts {
            key,
            proof,
            address_seed: &derived.address_seed,
            address: derived.address,
            max_epoch,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
