//! Proof acquisition.
//!
//! A proof is requested at most once per (key, epoch window). Nothing here
//! retries: a failed request surfaces to the controller, which fails the
//! session.

use config::constants::KEY_CLAIM_NAME;
use num_bigint::BigUint;
use sdk_core::ZkProof;
use tokio_util::sync::CancellationToken;
use transport::{ProofRequest, ProvingService, TransportError, abortable};

use crate::ZkLoginError;

/// Assembles a prover request from the values bound into the nonce.
pub fn build_request(
    jwt: &str,
    public_key: &[u8; 32],
    max_epoch: u64,
    randomness: &str,
    salt: &BigUint,
) -> ProofRequest {
    ProofRequest {
        jwt: jwt.to_owned(),
        extended_ephemeral_public_key: zk_crypto::extended_ephemeral_public_key(public_key),
        max_epoch: max_epoch.to_string(),
        jwt_randomness: randomness.to_owned(),
        salt: salt.to_string(),
        key_claim_name: KEY_CLAIM_NAME.to_owned(),
    }
}

/// Requests a proof, racing it against `cancel`.
///
/// # Errors
///
/// - [`ZkLoginError::Aborted`] if `cancel` fires first
/// - [`ZkLoginError::ProofServiceError`] for a non-success response
/// - [`ZkLoginError::ProofMalformed`] for an unparseable or ill-shaped proof
/// - [`ZkLoginError::Transport`] if the service could not be reached
pub async fn request_proof<P: ProvingService>(
    prover: &P,
    cancel: &CancellationToken,
    request: &ProofRequest,
) -> Result<ZkProof, ZkLoginError> {
    let proof = abortable(cancel, prover.request_proof(request))
        .await
        .map_err(map_prover_error)?;

    if !proof.is_well_formed() {
        return Err(ZkLoginError::ProofMalformed);
    }
    Ok(proof)
}

fn map_prover_error(e: TransportError) -> ZkLoginError {
    match e {
        TransportError::Status {
            status,
            status_text,
            ..
        } => ZkLoginError::ProofServiceError {
            status_code: status,
            status_text,
        },
        TransportError::Malformed { .. } => ZkLoginError::ProofMalformed,
        other => other.into(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
