//! Identity backend client.
//!
//! | Call | Request | Response |
//! |------|---------|----------|
//! | `POST /oauth-exchange` | `{idToken}` | `{access_token, refresh_token}` |
//! | `GET /salt` (bearer) | -- | base64 salt, as a JSON string or plain text |
//! | `POST /update_address` (bearer) | `{signature, address}` | 2xx |
//! | `POST /payment` (bearer) | `{transaction_digest, proof_signature?}` | 2xx |

use std::fmt;
use std::future::Future;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::http::{check_status, endpoint, read_text, send_error};
use crate::{HttpConfig, TransportError};

const EXCHANGE: &str = "oauth-exchange";
const SALT: &str = "salt";
const UPDATE_ADDRESS: &str = "update_address";
const PAYMENT: &str = "payment";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Application session tokens returned by the identity exchange.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens").finish_non_exhaustive()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeRequest<'a> {
    id_token: &'a str,
}

#[derive(Serialize)]
struct UpdateAddressRequest<'a> {
    signature: &'a str,
    address: &'a str,
}

#[derive(Serialize)]
struct PaymentRequest<'a> {
    transaction_digest: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    proof_signature: Option<&'a str>,
}

#[derive(Deserialize)]
struct SaltObject {
    salt: String,
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// The application's identity backend.
///
/// The backend verifies identity tokens, owns the per-user salt and records
/// addresses and payments. `exchange_id_token` is assumed idempotent per
/// token server-side.
pub trait IdentityBackend: Send + Sync {
    /// Exchanges an identity token for application session tokens.
    fn exchange_id_token(
        &self,
        id_token: &str,
    ) -> impl Future<Output = Result<SessionTokens, TransportError>> + Send;

    /// Fetches the base64-encoded user salt.
    fn fetch_salt(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<String, TransportError>> + Send;

    /// Reports a signed proof of address ownership.
    fn update_address(
        &self,
        access_token: &str,
        signature: &str,
        address: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Reports a submitted payment.
    fn confirm_payment(
        &self,
        access_token: &str,
        transaction_digest: &str,
        proof_signature: Option<&str>,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

// ---------------------------------------------------------------------------
// HttpBackendClient
// ---------------------------------------------------------------------------

/// HTTPS implementation of [`IdentityBackend`].
#[derive(Debug, Clone)]
pub struct HttpBackendClient {
    client: Client,
    exchange_url: Url,
    salt_url: Url,
    update_address_url: Url,
    payment_url: Url,
}

impl HttpBackendClient {
    /// Creates a client for the backend at `base_url`. No network I/O.
    pub fn new(base_url: &Url, http: &HttpConfig) -> Result<Self, TransportError> {
        Ok(Self {
            client: http.client(http.request_timeout)?,
            exchange_url: endpoint(base_url, EXCHANGE)?,
            salt_url: endpoint(base_url, SALT)?,
            update_address_url: endpoint(base_url, UPDATE_ADDRESS)?,
            payment_url: endpoint(base_url, PAYMENT)?,
        })
    }
}

impl IdentityBackend for HttpBackendClient {
    async fn exchange_id_token(&self, id_token: &str) -> Result<SessionTokens, TransportError> {
        debug!("oauth_exchange_start");
        let response = self
            .client
            .post(self.exchange_url.clone())
            .json(&ExchangeRequest { id_token })
            .send()
            .await
            .map_err(|e| send_error(EXCHANGE, e))?;
        let body = read_text(EXCHANGE, check_status(EXCHANGE, response).await?).await?;
        serde_json::from_str(&body).map_err(|e| TransportError::malformed(EXCHANGE, e))
    }

    async fn fetch_salt(&self, access_token: &str) -> Result<String, TransportError> {
        debug!("salt_fetch_start");
        let response = self
            .client
            .get(self.salt_url.clone())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| send_error(SALT, e))?;
        let body = read_text(SALT, check_status(SALT, response).await?).await?;
        parse_salt_body(&body)
    }

    async fn update_address(
        &self,
        access_token: &str,
        signature: &str,
        address: &str,
    ) -> Result<(), TransportError> {
        let response = self
            .client
            .post(self.update_address_url.clone())
            .bearer_auth(access_token)
            .json(&UpdateAddressRequest { signature, address })
            .send()
            .await
            .map_err(|e| send_error(UPDATE_ADDRESS, e))?;
        check_status(UPDATE_ADDRESS, response).await?;
        Ok(())
    }

    async fn confirm_payment(
        &self,
        access_token: &str,
        transaction_digest: &str,
        proof_signature: Option<&str>,
    ) -> Result<(), TransportError> {
        let response = self
            .client
            .post(self.payment_url.clone())
            .bearer_auth(access_token)
            .json(&PaymentRequest {
                transaction_digest,
                proof_signature,
            })
            .send()
            .await
            .map_err(|e| send_error(PAYMENT, e))?;
        check_status(PAYMENT, response).await?;
        Ok(())
    }
}

/// Extracts the base64 salt from a `/salt` response body.
///
/// Accepts a JSON string (`"AAE="`), a JSON object with a `salt` field, or
/// the bare base64 text.
pub fn parse_salt_body(body: &str) -> Result<String, TransportError> {
    let trimmed = body.trim();
    let salt = if trimmed.starts_with('"') {
        serde_json::from_str::<String>(trimmed).map_err(|e| TransportError::malformed(SALT, e))?
    } else if trimmed.starts_with('{') {
        serde_json::from_str::<SaltObject>(trimmed)
            .map_err(|e| TransportError::malformed(SALT, e))?
            .salt
    } else {
        trimmed.to_owned()
    };
    if salt.is_empty() {
        return Err(TransportError::malformed(SALT, "empty salt"));
    }
    Ok(salt)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransportErrorKind;

    #[test]
    fn salt_body_forms() {
        assert_eq!(parse_salt_body("\"AAE=\"").unwrap(), "AAE=");
        assert_eq!(parse_salt_body("AAE=\n").unwrap(), "AAE=");
        assert_eq!(parse_salt_body(r#"{"salt":"AAE="}"#).unwrap(), "AAE=");
    }

    #[test]
    fn empty_salt_is_malformed() {
        assert_eq!(
            parse_salt_body("  ").unwrap_err().kind(),
            TransportErrorKind::Malformed
        );
        assert_eq!(
            parse_salt_body("\"\"").unwrap_err().kind(),
            TransportErrorKind::Malformed
        );
    }

    #[test]
    fn request_bodies() {
        let exchange = serde_json::to_value(ExchangeRequest { id_token: "t" }).unwrap();
        assert_eq!(exchange, serde_json::json!({ "idToken": "t" }));

        let bare = serde_json::to_value(PaymentRequest {
            transaction_digest: "D",
            proof_signature: None,
        })
        .unwrap();
        assert_eq!(bare, serde_json::json!({ "transaction_digest": "D" }));

        let signed = serde_json::to_value(PaymentRequest {
            transaction_digest: "D",
            proof_signature: Some("S"),
        })
        .unwrap();
        assert_eq!(
            signed,
            serde_json::json!({ "transaction_digest": "D", "proof_signature": "S" })
        );
    }

    #[test]
    fn tokens_debug_is_redacted() {
        let tokens: SessionTokens =
            serde_json::from_str(r#"{"access_token":"secret-a","refresh_token":"secret-r"}"#)
                .unwrap();
        let debug = format!("{tokens:?}");
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn client_endpoints() {
        let base = Url::parse("https://api.example.com/app").unwrap();
        let client = HttpBackendClient::new(&base, &HttpConfig::default()).unwrap();
        assert_eq!(client.exchange_url.as_str(), "https://api.example.com/app/oauth-exchange");
        assert_eq!(client.salt_url.as_str(), "https://api.example.com/app/salt");
        assert_eq!(client.payment_url.as_str(), "https://api.example.com/app/payment");
    }
}
