//! Shared HTTP plumbing: timeouts, endpoint joining, status handling and
//! cancellation.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Response};
use tokio_util::sync::CancellationToken;
use tracing::error;
use url::Url;

use crate::TransportError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// HTTP client configuration.
///
/// The proving service gets its own, longer timeout: proof generation
/// routinely takes several seconds.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// TCP + TLS handshake timeout. Default: 10 s.
    pub connect_timeout: Duration,

    /// Per-request timeout for backend and RPC calls. Default: 30 s.
    pub request_timeout: Duration,

    /// Per-request timeout for proof requests. Default: 60 s.
    pub prover_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            prover_timeout: Duration::from_secs(60),
        }
    }
}

impl HttpConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> HttpConfigBuilder {
        HttpConfigBuilder::default()
    }

    pub(crate) fn client(&self, timeout: Duration) -> Result<Client, TransportError> {
        Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))
    }
}

/// Builder for [`HttpConfig`].
#[derive(Debug, Default)]
pub struct HttpConfigBuilder {
    connect_timeout: Option<Duration>,
    request_timeout: Option<Duration>,
    prover_timeout: Option<Duration>,
}

impl HttpConfigBuilder {
    /// Sets the TCP + TLS connection timeout.
    pub fn connect_timeout(mut self, d: Duration) -> Self {
        self.connect_timeout = Some(d);
        self
    }

    /// Sets the per-request timeout.
    pub fn request_timeout(mut self, d: Duration) -> Self {
        self.request_timeout = Some(d);
        self
    }

    /// Sets the proof request timeout.
    pub fn prover_timeout(mut self, d: Duration) -> Self {
        self.prover_timeout = Some(d);
        self
    }

    /// Builds the configuration, using defaults for unset fields.
    pub fn build(self) -> HttpConfig {
        let defaults = HttpConfig::default();
        HttpConfig {
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            prover_timeout: self.prover_timeout.unwrap_or(defaults.prover_timeout),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Appends `path` to `base`, keeping any path prefix `base` already has.
///
/// `Url::join` would replace the last segment of a base without a trailing
/// slash, turning `https://host/api` + `salt` into `https://host/salt`.
pub(crate) fn endpoint(base: &Url, path: &str) -> Result<Url, TransportError> {
    let joined = format!("{}/{}", base.as_str().trim_end_matches('/'), path);
    Url::parse(&joined).map_err(|e| TransportError::InvalidEndpoint {
        url: joined,
        reason: e.to_string(),
    })
}

/// Maps a send failure to [`TransportError::Network`].
pub(crate) fn send_error(endpoint: &'static str, e: reqwest::Error) -> TransportError {
    error!(endpoint, error = %e, "http_send_error");
    TransportError::Network {
        endpoint,
        reason: e.to_string(),
    }
}

/// Passes through success responses; turns anything else into
/// [`TransportError::Status`] carrying the status code, reason and body.
pub(crate) async fn check_status(
    endpoint: &'static str,
    response: Response,
) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let status_text = status.canonical_reason().unwrap_or_default().to_owned();
    let body = response.text().await.unwrap_or_default();
    error!(
        endpoint,
        status = status.as_u16(),
        status_text = %status_text,
        "http_status_error"
    );
    Err(TransportError::Status {
        endpoint,
        status: status.as_u16(),
        status_text,
        body,
    })
}

/// Reads the whole body as text.
pub(crate) async fn read_text(
    endpoint: &'static str,
    response: Response,
) -> Result<String, TransportError> {
    response
        .text()
        .await
        .map_err(|e| TransportError::malformed(endpoint, e))
}

/// Runs `fut` unless `cancel` fires first.
///
/// When the token fires the future is dropped, which cancels the underlying
/// HTTP request, and [`TransportError::Aborted`] is returned. A token that is
/// already cancelled never polls `fut`.
pub async fn abortable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(TransportError::Aborted),
        res = fut => res,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
