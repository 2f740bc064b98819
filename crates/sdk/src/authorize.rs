//! Nonce and authorization URL construction.

use config::OAuthConfig;
use url::Url;

use crate::ZkLoginError;

/// Derives the OAuth nonce for an ephemeral public key.
///
/// Must be called with the exact `max_epoch` and `randomness` that are
/// persisted and later sent to the prover.
pub fn build_nonce(
    public_key: &[u8; 32],
    max_epoch: u64,
    randomness: &str,
) -> Result<String, ZkLoginError> {
    Ok(zk_crypto::generate_nonce(public_key, max_epoch, randomness)?)
}

/// Builds the provider authorization URL for an implicit-flow ID token.
pub fn build_authorization_url(oauth: &OAuthConfig, nonce: &str) -> Url {
    let mut url = oauth.authorize_url.clone();
    url.query_pairs_mut()
        .append_pair("client_id", &oauth.client_id)
        .append_pair("response_type", "id_token")
        .append_pair("redirect_uri", oauth.redirect_uri.as_str())
        .append_pair("scope", &oauth.scope)
        .append_pair("nonce", nonce);
    url
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
