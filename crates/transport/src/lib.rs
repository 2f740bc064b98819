//! Transport layer for the zkLogin SDK.
//!
//! Three remote collaborators, each behind a trait so the session controller
//! can be driven by in-process fakes in tests:
//!
//! | Module | Trait | HTTP client | Remote |
//! |--------|-------|-------------|--------|
//! | [`backend`] | [`IdentityBackend`] | [`HttpBackendClient`] | token exchange, salt, address and payment reports |
//! | [`prover`] | [`ProvingService`] | [`HttpProverClient`] | zero-knowledge proving service |
//! | [`rpc`] | [`ChainClient`] | [`JsonRpcChainClient`] | fullnode JSON-RPC |
//!
//! Every failure is a [`TransportError`] whose [`kind`](TransportError::kind)
//! separates an aborted request from a service that is down
//! ([`TransportErrorKind::Status`], [`TransportErrorKind::Network`]) or one
//! that answered with garbage ([`TransportErrorKind::Malformed`]).
//!
//! [`abortable`] races any call against a `CancellationToken`, dropping the
//! in-flight request when the token fires.

pub mod backend;
mod error;
pub mod http;
pub mod prover;
pub mod rpc;

pub use backend::{HttpBackendClient, IdentityBackend, SessionTokens};
pub use error::{TransportError, TransportErrorKind};
pub use http::{HttpConfig, HttpConfigBuilder, abortable};
pub use prover::{HttpProverClient, ProofRequest, ProvingService};
pub use rpc::{
    ChainClient, Coin, JsonRpcChainClient, TransactionResult, TransferRequest,
    pays_gas_from_inputs,
};
