//! Proving service client.
//!
//! A single `POST {prover_url}/v1` per login. There is no retry loop here:
//! the service is slow and rate-limited, and whether a failure should reset
//! the session is the controller's decision.

use std::fmt;
use std::future::Future;

use reqwest::Client;
use sdk_core::ZkProof;
use serde::Serialize;
use tracing::{debug, error, info};
use url::Url;

use crate::http::{check_status, endpoint, read_text, send_error};
use crate::{HttpConfig, TransportError};

const PROVER: &str = "prover";

/// Inputs to a proof request.
///
/// Every value must be the exact one used to build the OAuth nonce; the
/// prover recomputes the nonce and rejects any drift.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofRequest {
    pub jwt: String,
    /// Decimal extended ephemeral public key.
    pub extended_ephemeral_public_key: String,
    /// Decimal `maxEpoch`.
    pub max_epoch: String,
    /// Decimal nonce randomness.
    pub jwt_randomness: String,
    /// Decimal salt.
    pub salt: String,
    pub key_claim_name: String,
}

impl fmt::Debug for ProofRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProofRequest")
            .field("extended_ephemeral_public_key", &self.extended_ephemeral_public_key)
            .field("max_epoch", &self.max_epoch)
            .field("key_claim_name", &self.key_claim_name)
            .finish_non_exhaustive()
    }
}

/// A zero-knowledge proving service.
pub trait ProvingService: Send + Sync {
    /// Requests a partial zkLogin signature.
    fn request_proof(
        &self,
        request: &ProofRequest,
    ) -> impl Future<Output = Result<ZkProof, TransportError>> + Send;
}

/// HTTPS implementation of [`ProvingService`].
#[derive(Debug, Clone)]
pub struct HttpProverClient {
    client: Client,
    url: Url,
}

impl HttpProverClient {
    /// Creates a client for the prover at `base_url`. No network I/O.
    pub fn new(base_url: &Url, http: &HttpConfig) -> Result<Self, TransportError> {
        Ok(Self {
            client: http.client(http.prover_timeout)?,
            url: endpoint(base_url, "v1")?,
        })
    }
}

impl ProvingService for HttpProverClient {
    async fn request_proof(&self, request: &ProofRequest) -> Result<ZkProof, TransportError> {
        debug!(max_epoch = %request.max_epoch, "proof_request_start");
        let response = self
            .client
            .post(self.url.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| send_error(PROVER, e))?;
        let body = read_text(PROVER, check_status(PROVER, response).await?).await?;
        let proof = parse_proof(&body)?;
        info!("proof_received");
        Ok(proof)
    }
}

/// Parses and shape-checks a prover response body.
pub fn parse_proof(body: &str) -> Result<ZkProof, TransportError> {
    let proof: ZkProof = serde_json::from_str(body).map_err(|e| {
        error!(error = %e, "proof_parse_error");
        TransportError::malformed(PROVER, e)
    })?;
    if !proof.is_well_formed() {
        error!("proof_shape_error");
        return Err(TransportError::malformed(PROVER, "proof points have the wrong shape"));
    }
    Ok(proof)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
