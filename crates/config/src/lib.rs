//! zkLogin SDK configuration.
//!
//! This crate provides validated, runtime configuration for the SDK:
//!
//! - [`ZkLoginConfig`] -- endpoints, OAuth client, payment target, epoch policy
//! - [`OAuthConfig`] -- identity provider authorization parameters
//! - [`PaymentConfig`] -- asset type and recipient for payments
//! - [`constants`] -- protocol-level parameters (claim limits, nonce length, margins)
//! - [`network`] -- per-network default endpoints
//!
//! Configuration is validated once, at build time. A missing RPC URL,
//! prover URL or OAuth client id is a [`ConfigError`] from
//! [`ZkLoginConfigBuilder::build`], so a session can never start with a
//! configuration that would only fail later, mid-login.
//!
//! `config` depends only on [`sdk_core`]. It does **not** depend on
//! transport, crypto, or any runtime crate.

pub mod constants;
pub mod network;

use sdk_core::{Network, SuiAddress};
use url::Url;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Configuration errors. All are fatal at construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No RPC URL was given and no network was named to default from.
    #[error("missing chain RPC URL")]
    MissingRpcUrl,

    /// No proving service URL was given.
    #[error("missing prover URL")]
    MissingProverUrl,

    /// No identity backend URL was given.
    #[error("missing backend URL")]
    MissingBackendUrl,

    /// No OAuth client id was given.
    #[error("missing OAuth client id")]
    MissingClientId,

    /// No OAuth redirect URI was given.
    #[error("missing OAuth redirect URI")]
    MissingRedirectUri,

    /// A URL field could not be parsed.
    #[error("invalid URL for {field}: {reason}")]
    InvalidUrl {
        /// Name of the offending field.
        field: &'static str,
        /// Parser error message.
        reason: String,
    },

    /// The payment recipient is not a valid address.
    #[error("invalid payment recipient: {0}")]
    InvalidRecipient(String),

    /// A numeric field could not be parsed.
    #[error("invalid number for {0}")]
    InvalidNumber(&'static str),

    /// The network name is not recognized.
    #[error("unknown network: {0}")]
    UnknownNetwork(String),
}

// ---------------------------------------------------------------------------
// Configuration types
// ---------------------------------------------------------------------------

/// Identity provider authorization parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthConfig {
    /// Provider authorization endpoint (e.g. Google's `/o/oauth2/v2/auth`).
    pub authorize_url: Url,
    /// OAuth client id registered with the provider. Also the JWT `aud`.
    pub client_id: String,
    /// Where the provider redirects with `#id_token=...`.
    pub redirect_uri: Url,
    /// Space-separated OAuth scopes.
    pub scope: String,
}

/// Payment target and transaction parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfig {
    /// Fully qualified coin type of the asset being paid.
    pub coin_type: String,
    /// Fixed payment recipient. Payments are refused when unset.
    pub recipient: Option<SuiAddress>,
    /// Gas budget for payment transactions.
    pub gas_budget: u64,
    /// Attach a composite signature over the digest when confirming payments.
    pub attach_proof_signature: bool,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            coin_type: constants::DEFAULT_COIN_TYPE.to_owned(),
            recipient: None,
            gas_budget: constants::DEFAULT_GAS_BUDGET,
            attach_proof_signature: false,
        }
    }
}

/// Validated SDK configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZkLoginConfig {
    /// The chain network.
    pub network: Network,
    /// Fullnode JSON-RPC endpoint.
    pub rpc_url: Url,
    /// Proving service base URL (requests go to `{prover_url}/v1`).
    pub prover_url: Url,
    /// Identity backend base URL (`/oauth-exchange`, `/salt`, ...).
    pub backend_url: Url,
    /// OAuth parameters.
    pub oauth: OAuthConfig,
    /// Payment parameters.
    pub payment: PaymentConfig,
    /// Epochs added to the current epoch to form `maxEpoch`.
    pub max_epoch_margin: u64,
}

impl ZkLoginConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ZkLoginConfigBuilder {
        ZkLoginConfigBuilder::default()
    }

    /// Loads configuration from `ZKLOGIN_*` environment variables.
    ///
    /// | Variable | Required | Default |
    /// |----------|----------|---------|
    /// | `ZKLOGIN_NETWORK` | no | `testnet` |
    /// | `ZKLOGIN_RPC_URL` | no | network fullnode |
    /// | `ZKLOGIN_PROVER_URL` | yes | |
    /// | `ZKLOGIN_BACKEND_URL` | yes | |
    /// | `ZKLOGIN_CLIENT_ID` | yes | |
    /// | `ZKLOGIN_REDIRECT_URI` | yes | |
    /// | `ZKLOGIN_AUTHORIZE_URL` | no | Google |
    /// | `ZKLOGIN_SCOPE` | no | `openid email` |
    /// | `ZKLOGIN_COIN_TYPE` | no | native coin |
    /// | `ZKLOGIN_RECIPIENT` | no | payments disabled |
    /// | `ZKLOGIN_GAS_BUDGET` | no | [`constants::DEFAULT_GAS_BUDGET`] |
    /// | `ZKLOGIN_ATTACH_PROOF_SIGNATURE` | no | `false` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    ///
    /// [`from_env`](Self::from_env) is this with `std::env::var`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let network = match lookup("ZKLOGIN_NETWORK") {
            Some(name) => name
                .parse::<Network>()
                .map_err(|_| ConfigError::UnknownNetwork(name))?,
            None => Network::Testnet,
        };

        let mut builder = Self::builder().network(network);
        if let Some(v) = lookup("ZKLOGIN_RPC_URL") {
            builder = builder.rpc_url(v);
        }
        if let Some(v) = lookup("ZKLOGIN_PROVER_URL") {
            builder = builder.prover_url(v);
        }
        if let Some(v) = lookup("ZKLOGIN_BACKEND_URL") {
            builder = builder.backend_url(v);
        }
        if let Some(v) = lookup("ZKLOGIN_CLIENT_ID") {
            builder = builder.client_id(v);
        }
        if let Some(v) = lookup("ZKLOGIN_REDIRECT_URI") {
            builder = builder.redirect_uri(v);
        }
        if let Some(v) = lookup("ZKLOGIN_AUTHORIZE_URL") {
            builder = builder.authorize_url(v);
        }
        if let Some(v) = lookup("ZKLOGIN_SCOPE") {
            builder = builder.scope(v);
        }
        if let Some(v) = lookup("ZKLOGIN_COIN_TYPE") {
            builder = builder.coin_type(v);
        }
        if let Some(v) = lookup("ZKLOGIN_RECIPIENT") {
            builder = builder.recipient(v);
        }
        if let Some(v) = lookup("ZKLOGIN_GAS_BUDGET") {
            let budget = v
                .parse()
                .map_err(|_| ConfigError::InvalidNumber("ZKLOGIN_GAS_BUDGET"))?;
            builder = builder.gas_budget(budget);
        }
        if let Some(v) = lookup("ZKLOGIN_ATTACH_PROOF_SIGNATURE") {
            builder = builder.attach_proof_signature(matches!(v.as_str(), "1" | "true" | "yes"));
        }

        builder.build()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`ZkLoginConfig`].
#[derive(Debug, Default)]
pub struct ZkLoginConfigBuilder {
    network: Option<Network>,
    rpc_url: Option<String>,
    prover_url: Option<String>,
    backend_url: Option<String>,
    client_id: Option<String>,
    redirect_uri: Option<String>,
    authorize_url: Option<String>,
    scope: Option<String>,
    coin_type: Option<String>,
    recipient: Option<String>,
    gas_budget: Option<u64>,
    attach_proof_signature: bool,
    max_epoch_margin: Option<u64>,
}

impl ZkLoginConfigBuilder {
    /// Sets the network. Supplies the default RPC URL if none is given.
    pub fn network(mut self, network: Network) -> Self {
        self.network = Some(network);
        self
    }

    /// Sets the fullnode JSON-RPC URL.
    pub fn rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = Some(url.into());
        self
    }

    /// Sets the proving service base URL.
    pub fn prover_url(mut self, url: impl Into<String>) -> Self {
        self.prover_url = Some(url.into());
        self
    }

    /// Sets the identity backend base URL.
    pub fn backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = Some(url.into());
        self
    }

    /// Sets the OAuth client id.
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self
    }

    /// Sets the OAuth redirect URI.
    pub fn redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    /// Sets the provider authorization endpoint. Default: Google.
    pub fn authorize_url(mut self, url: impl Into<String>) -> Self {
        self.authorize_url = Some(url.into());
        self
    }

    /// Sets the OAuth scope. Default: `openid email`.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Sets the payment coin type. Default: native coin.
    pub fn coin_type(mut self, coin_type: impl Into<String>) -> Self {
        self.coin_type = Some(coin_type.into());
        self
    }

    /// Sets the fixed payment recipient.
    pub fn recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    /// Sets the payment gas budget.
    pub fn gas_budget(mut self, budget: u64) -> Self {
        self.gas_budget = Some(budget);
        self
    }

    /// Attach a composite signature over the digest to payment confirmations.
    pub fn attach_proof_signature(mut self, attach: bool) -> Self {
        self.attach_proof_signature = attach;
        self
    }

    /// Overrides [`constants::MAX_EPOCH_MARGIN`].
    pub fn max_epoch_margin(mut self, margin: u64) -> Self {
        self.max_epoch_margin = Some(margin);
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found, checking the RPC URL, prover
    /// URL and client id before anything else.
    pub fn build(self) -> Result<ZkLoginConfig, ConfigError> {
        let network = self.network.unwrap_or(Network::Testnet);

        let rpc_url = match (self.rpc_url, self.network) {
            (Some(url), _) => parse_url("rpc_url", &url)?,
            (None, Some(n)) => parse_url("rpc_url", network::default_rpc_url(n))?,
            (None, None) => return Err(ConfigError::MissingRpcUrl),
        };
        let prover_url = parse_url(
            "prover_url",
            &self.prover_url.ok_or(ConfigError::MissingProverUrl)?,
        )?;
        let client_id = self
            .client_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(ConfigError::MissingClientId)?;
        let backend_url = parse_url(
            "backend_url",
            &self.backend_url.ok_or(ConfigError::MissingBackendUrl)?,
        )?;
        let redirect_uri = parse_url(
            "redirect_uri",
            &self.redirect_uri.ok_or(ConfigError::MissingRedirectUri)?,
        )?;
        let authorize_url = parse_url(
            "authorize_url",
            self.authorize_url
                .as_deref()
                .unwrap_or(constants::GOOGLE_AUTHORIZE_URL),
        )?;

        let recipient = self
            .recipient
            .map(|r| SuiAddress::parse(&r).map_err(|e| ConfigError::InvalidRecipient(e.to_string())))
            .transpose()?;

        let defaults = PaymentConfig::default();
        Ok(ZkLoginConfig {
            network,
            rpc_url,
            prover_url,
            backend_url,
            oauth: OAuthConfig {
                authorize_url,
                client_id,
                redirect_uri,
                scope: self
                    .scope
                    .unwrap_or_else(|| constants::DEFAULT_SCOPE.to_owned()),
            },
            payment: PaymentConfig {
                coin_type: self.coin_type.unwrap_or(defaults.coin_type),
                recipient,
                gas_budget: self.gas_budget.unwrap_or(defaults.gas_budget),
                attach_proof_signature: self.attach_proof_signature,
            },
            max_epoch_margin: self
                .max_epoch_margin
                .unwrap_or(constants::MAX_EPOCH_MARGIN),
        })
    }
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        field,
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
