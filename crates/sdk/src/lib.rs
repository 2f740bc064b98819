//! zkLogin session SDK.
//!
//! Lets a user sign in with an OAuth identity provider and use the
//! resulting on-chain address for signing, without a long-lived key tied to
//! that identity. A short-lived ephemeral key signs; a zero-knowledge proof
//! links it to the address.
//!
//! | Module | Role |
//! |--------|------|
//! | [`ephemeral`] | Restore or generate the ephemeral key, bind its epoch |
//! | [`authorize`] | Nonce and provider authorization URL |
//! | [`jwt`] | Pull the identity token out of the redirect, decode its claims |
//! | [`salt`] | Decode the salt, derive address seed and address |
//! | [`proof`] | Single-shot proof request |
//! | [`signature`] | Composite signature assembly and decoding |
//! | [`selection`] | Coin selection for payments |
//! | [`observer`] | Lifecycle callbacks |
//! | [`controller`] | [`SessionController`], the state machine driving all of the above |
//!
//! # Usage
//!
//! ```no_run
//! use config::ZkLoginConfig;
//! use sdk::{ChannelObserver, HttpSessionController};
//! use storage::FileSessionStore;
//! use tokio_util::sync::CancellationToken;
//! use transport::HttpConfig;
//!
//! # async fn example() -> Result<(), sdk::ZkLoginError> {
//! let config = ZkLoginConfig::from_env()?;
//! let (observer, _events) = ChannelObserver::new();
//! let controller = HttpSessionController::with_http(
//!     config,
//!     &HttpConfig::default(),
//!     FileSessionStore::new("zklogin-session.json"),
//!     observer,
//!     CancellationToken::new(),
//! )?;
//!
//! let url = controller.start_login().await?;
//! println!("open {url}");
//! // ... the provider redirects back with `#id_token=...`
//! # let redirect = String::new();
//! let address = controller.complete_login(&redirect).await?;
//! let signature = controller.sign_message(b"hello").await?;
//! println!("{address}: {signature}");
//! # Ok(())
//! # }
//! ```

pub mod authorize;
pub mod controller;
pub mod ephemeral;
pub mod error;
pub mod jwt;
pub mod observer;
pub mod payment;
pub mod proof;
pub mod salt;
pub(crate) mod session;
pub mod selection;
pub mod signature;
pub(crate) mod signing;

pub use controller::{HttpSessionController, SessionController, SessionState};
pub use error::{ErrorKind, ZkLoginError};
pub use observer::{ChannelObserver, NoopObserver, SessionEvent, SessionObserver};
pub use payment::PaymentReceipt;
pub use selection::{CoinSelection, CoinSelector, FirstFitSelector, SelectedCoin};
pub use signature::{CompositeSignature, ZkLoginInputs, ZkLoginSignature, compose_signature};
