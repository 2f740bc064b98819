//! Transport error type.

/// Coarse classification of a [`TransportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The request was cancelled locally before it completed.
    Aborted,
    /// The remote answered with a non-success status or an RPC error.
    Status,
    /// The request never got a response (DNS, TLS, timeout, reset).
    Network,
    /// The remote answered successfully but the body could not be used.
    Malformed,
    /// A client was constructed with an unusable endpoint or HTTP setting.
    Config,
}

/// Errors from remote calls.
///
/// `endpoint` names the logical call (`"oauth-exchange"`, `"prover"`, ...),
/// never a URL with credentials. Response bodies are kept for diagnostics;
/// none of the services echo secrets back.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request aborted")]
    Aborted,

    #[error("{endpoint} returned {status} {status_text}")]
    Status {
        endpoint: &'static str,
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("{endpoint} request failed: {reason}")]
    Network {
        endpoint: &'static str,
        reason: String,
    },

    #[error("{endpoint} returned malformed data: {reason}")]
    Malformed {
        endpoint: &'static str,
        reason: String,
    },

    #[error("JSON-RPC {method} failed ({code}): {message}")]
    Rpc {
        method: &'static str,
        code: i64,
        message: String,
    },

    #[error("invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("HTTP client setup failed: {0}")]
    ClientBuild(String),
}

impl TransportError {
    pub fn kind(&self) -> TransportErrorKind {
        match self {
            Self::Aborted => TransportErrorKind::Aborted,
            Self::Status { .. } | Self::Rpc { .. } => TransportErrorKind::Status,
            Self::Network { .. } => TransportErrorKind::Network,
            Self::Malformed { .. } => TransportErrorKind::Malformed,
            Self::InvalidEndpoint { .. } | Self::ClientBuild(_) => TransportErrorKind::Config,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    pub(crate) fn malformed(endpoint: &'static str, reason: impl ToString) -> Self {
        Self::Malformed {
            endpoint,
            reason: reason.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(TransportError::Aborted.kind(), TransportErrorKind::Aborted);
        assert!(TransportError::Aborted.is_aborted());

        let status = TransportError::Status {
            endpoint: "prover",
            status: 429,
            status_text: "Too Many Requests".into(),
            body: String::new(),
        };
        assert_eq!(status.kind(), TransportErrorKind::Status);
        assert_eq!(status.to_string(), "prover returned 429 Too Many Requests");

        let rpc = TransportError::Rpc {
            method: "suix_getCoins",
            code: -32602,
            message: "bad params".into(),
        };
        assert_eq!(rpc.kind(), TransportErrorKind::Status);

        assert_eq!(
            TransportError::malformed("salt", "empty body").kind(),
            TransportErrorKind::Malformed
        );
    }
}
