//! zkLogin protocol constants.
//!
//! Claim-length limits and the nonce length are fixed by the proving
//! circuit; changing them produces nonces and address seeds the prover
//! rejects. The epoch margin is policy and can be overridden through
//! [`ZkLoginConfigBuilder::max_epoch_margin`](crate::ZkLoginConfigBuilder::max_epoch_margin).

/// Epochs added to the current epoch to form an ephemeral key's `maxEpoch`.
///
/// Tunable policy value: a login completed slightly in the past must still
/// fall inside the proof/signature window.
pub const MAX_EPOCH_MARGIN: u64 = 2;

/// JWT claim used as the stable user identifier.
pub const KEY_CLAIM_NAME: &str = "sub";

/// Maximum length of the key claim name, in bytes.
pub const MAX_KEY_CLAIM_NAME_LENGTH: usize = 32;

/// Maximum length of the key claim value, in bytes.
pub const MAX_KEY_CLAIM_VALUE_LENGTH: usize = 115;

/// Maximum length of the `aud` claim value, in bytes.
pub const MAX_AUD_VALUE_LENGTH: usize = 145;

/// Length of the base64url nonce embedded in the authorization request.
pub const NONCE_LENGTH: usize = 27;

/// Bytes of randomness mixed into each nonce.
pub const RANDOMNESS_BYTES: usize = 16;

/// Default OAuth scope.
pub const DEFAULT_SCOPE: &str = "openid email";

/// Google's OAuth 2.0 authorization endpoint.
pub const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Native coin type, used when no payment asset is configured.
pub const DEFAULT_COIN_TYPE: &str = "0x2::sui::SUI";

/// Gas budget for payment transactions, in MIST.
pub const DEFAULT_GAS_BUDGET: u64 = 10_000_000;
