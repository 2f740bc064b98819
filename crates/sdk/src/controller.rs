//! Session lifecycle controller.
//!
//! [`SessionController`] owns the session and is the only component that
//! persists or clears it. Lower layers report failures through
//! [`ZkLoginError`]; the controller inspects [`ErrorKind`](crate::ErrorKind) to decide what a
//! failure means for the session.
//!
//! # States
//!
//! | State | Meaning |
//! |-------|---------|
//! | `Uninitialized` | No identity token yet. Waiting for `start_login` or its redirect |
//! | `Resolving` | Token present, salt/address/proof not yet confirmed |
//! | `Ready` | Every session field present and bound to the active key |
//! | `Failed` | Resolution failed. Transient: state is cleared and the controller moves on |
//! | `Disconnected` | Cleared. Terminal until `start_login` |
//!
//! An aborted resolution (see [`SessionController::teardown`]) changes
//! nothing: persisted fields stay and the next controller built over the
//! same store resolves again from them.

use std::sync::Arc;

use config::ZkLoginConfig;
use rand_core::OsRng;
use sdk_core::SuiAddress;
use signer::Signer;
use storage::{AppSession, PersistedState, SessionStore};
use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use transport::{
    ChainClient, HttpBackendClient, HttpConfig, HttpProverClient, IdentityBackend,
    JsonRpcChainClient, ProvingService, abortable,
};
use url::Url;

use crate::authorize::{build_authorization_url, build_nonce};
use crate::ephemeral::{bind_epoch, get_or_create};
use crate::jwt::{decode_claims, extract_id_token, unix_now};
use crate::observer::{NoopObserver, SessionObserver};
use crate::salt::{decode_salt, derive_address};
use crate::selection::{CoinSelector, FirstFitSelector};
use crate::session::Session;
use crate::{ZkLoginError, proof};

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Lifecycle state of a [`SessionController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Uninitialized,
    Resolving,
    Ready,
    Failed,
    Disconnected,
}

#[derive(Debug, Clone, Copy)]
struct Status {
    state: SessionState,
    address: Option<SuiAddress>,
}

/// Mutable session data, guarded by one lock so it changes as a unit.
#[derive(Debug)]
pub(crate) struct Slot {
    pub session: Session,
    pub app: AppSession,
}

// ---------------------------------------------------------------------------
// SessionController
// ---------------------------------------------------------------------------

pub(crate) struct ControllerInner<B, P, C, S, O> {
    pub config: ZkLoginConfig,
    pub backend: B,
    pub prover: P,
    pub chain: C,
    pub store: S,
    pub observer: O,
    pub coin_selector: std::sync::RwLock<Arc<dyn CoinSelector>>,
    pub slot: Mutex<Slot>,
    status: std::sync::RwLock<Status>,
    pub cancel: CancellationToken,
}

/// The zkLogin session entry point.
///
/// `Clone`-able (wraps an `Arc`). Operations on one controller are
/// serialized: a second `start_login` while a resolution is in flight waits
/// for it, then replaces the key.
///
/// # Type Parameters
///
/// - `B`: identity backend (token exchange, salt, reports)
/// - `P`: proving service
/// - `C`: chain client
/// - `S`: persisted session store
/// - `O`: lifecycle observer (defaults to [`NoopObserver`])
pub struct SessionController<B, P, C, S, O = NoopObserver> {
    pub(crate) inner: Arc<ControllerInner<B, P, C, S, O>>,
}

/// A controller talking to real services over HTTPS.
pub type HttpSessionController<S, O = NoopObserver> =
    SessionController<HttpBackendClient, HttpProverClient, JsonRpcChainClient, S, O>;

impl<B, P, C, S, O> Clone for SessionController<B, P, C, S, O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B, P, C, S, O> std::fmt::Debug for SessionController<B, P, C, S, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("network", &self.inner.config.network)
            .field("state", &self.inner.status.read().unwrap().state)
            .finish_non_exhaustive()
    }
}

impl<S, O> HttpSessionController<S, O>
where
    S: SessionStore,
    O: SessionObserver,
{
    /// Builds HTTP clients from `config` and wraps them in a controller.
    ///
    /// No network I/O happens during construction.
    pub fn with_http(
        config: ZkLoginConfig,
        http: &HttpConfig,
        store: S,
        observer: O,
        cancel: CancellationToken,
    ) -> Result<Self, ZkLoginError> {
        let backend = HttpBackendClient::new(&config.backend_url, http)?;
        let prover = HttpProverClient::new(&config.prover_url, http)?;
        let chain = JsonRpcChainClient::new(config.rpc_url.clone(), http)?;
        Self::new(config, backend, prover, chain, store, observer, cancel)
    }
}

impl<B, P, C, S, O> SessionController<B, P, C, S, O>
where
    B: IdentityBackend,
    P: ProvingService,
    C: ChainClient,
    S: SessionStore,
    O: SessionObserver,
{
    /// Creates a controller over the persisted state in `store`.
    ///
    /// Starts in `Resolving` if an identity token is persisted, otherwise in
    /// `Uninitialized`. Call [`initialize`](Self::initialize) to drive a
    /// persisted session back to `Ready`. A persisted key that cannot be
    /// decoded is discarded and the controller starts `Disconnected`.
    ///
    /// # Errors
    ///
    /// Returns [`ZkLoginError::Storage`] if the store cannot be read.
    pub fn new(
        config: ZkLoginConfig,
        backend: B,
        prover: P,
        chain: C,
        store: S,
        observer: O,
        cancel: CancellationToken,
    ) -> Result<Self, ZkLoginError> {
        let persisted = store.load()?;

        let (session, app, state) = match Session::from_settings(&persisted.zklogin) {
            Ok(session) => {
                let state = if session.id_token().is_some() {
                    SessionState::Resolving
                } else {
                    SessionState::Uninitialized
                };
                (session, persisted.app, state)
            }
            Err(e) => {
                warn!(error = %e, "discarding unreadable persisted session");
                store.clear()?;
                (Session::default(), AppSession::default(), SessionState::Disconnected)
            }
        };
        debug!(?state, network = %config.network, "session controller created");

        Ok(Self {
            inner: Arc::new(ControllerInner {
                config,
                backend,
                prover,
                chain,
                store,
                observer,
                coin_selector: std::sync::RwLock::new(Arc::new(FirstFitSelector)),
                slot: Mutex::new(Slot { session, app }),
                status: std::sync::RwLock::new(Status {
                    state,
                    address: None,
                }),
                cancel,
            }),
        })
    }

    pub fn config(&self) -> &ZkLoginConfig {
        &self.inner.config
    }

    /// Returns a reference to the cancellation token.
    pub fn cancel(&self) -> &CancellationToken {
        &self.inner.cancel
    }

    pub fn state(&self) -> SessionState {
        self.inner.status.read().unwrap().state
    }

    /// Whether the last resolution reached `Ready`.
    ///
    /// This reflects the lifecycle state only and does not read the chain,
    /// so it stays `true` after `maxEpoch` has passed. Signing and payments
    /// check the current epoch themselves and return
    /// [`ZkLoginError::EpochExpired`]; [`initialize`](Self::initialize)
    /// re-checks it and clears an expired session.
    pub fn is_ready(&self) -> bool {
        self.state() == SessionState::Ready
    }

    /// The session address. `None` unless the session is `Ready`.
    pub fn address(&self) -> Option<SuiAddress> {
        let status = *self.inner.status.read().unwrap();
        match status.state {
            SessionState::Ready => status.address,
            _ => None,
        }
    }

    /// Replaces the coin selection strategy used by [`pay`](Self::pay).
    pub fn set_coin_selector(&self, selector: Arc<dyn CoinSelector>) {
        *self.inner.coin_selector.write().unwrap() = selector;
    }

    pub(crate) fn coin_selector(&self) -> Arc<dyn CoinSelector> {
        self.inner.coin_selector.read().unwrap().clone()
    }

    /// Aborts in-flight calls. Used when the host is shutting down.
    ///
    /// Anything racing the token returns [`ZkLoginError::Aborted`] and
    /// leaves persisted state as it was. The controller stays aborted.
    pub fn teardown(&self) {
        info!("session teardown requested");
        self.inner.cancel.cancel();
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Resolves a persisted session.
    ///
    /// Returns the address once `Ready`, or `None` when there is nothing to
    /// resolve. Calling it on a `Ready` session re-checks the epoch.
    pub async fn initialize(&self) -> Result<Option<SuiAddress>, ZkLoginError> {
        let mut slot = self.lock().await;
        match self.state() {
            SessionState::Resolving | SessionState::Ready => {
                self.resolve(&mut slot).await.map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Begins a login cycle and returns the provider authorization URL.
    ///
    /// Generates a new ephemeral key bound to `current epoch + margin`,
    /// which drops any previous key, proof and identity. Key material and
    /// randomness are persisted before the URL is built.
    pub async fn start_login(&self) -> Result<Url, ZkLoginError> {
        let mut slot = self.lock().await;

        let current = self.current_epoch().await?;
        let max_epoch = bind_epoch(current, self.inner.config.max_epoch_margin);
        let (key, origin) = get_or_create(None, &mut OsRng)?;
        let randomness = zk_crypto::generate_randomness(&mut OsRng);
        let nonce = build_nonce(&key.public_key(), max_epoch, &randomness)?;
        debug!(?origin, current_epoch = current, max_epoch, "ephemeral key bound");

        slot.session.install_key(key, max_epoch, randomness);
        slot.app = AppSession::default();
        self.persist(&slot)?;
        self.set_status(SessionState::Uninitialized, None);

        info!(max_epoch, "login started");
        Ok(build_authorization_url(&self.inner.config.oauth, &nonce))
    }

    /// Completes a login from the provider redirect and resolves the session.
    ///
    /// `redirect` is the full redirect URL or its fragment.
    ///
    /// # Errors
    ///
    /// - [`ZkLoginError::MissingIdToken`] if the redirect carries no token
    /// - [`ZkLoginError::KeyUnavailable`] if no login was started
    /// - any resolution error, after the session has been cleared
    pub async fn complete_login(&self, redirect: &str) -> Result<SuiAddress, ZkLoginError> {
        let id_token = extract_id_token(redirect).ok_or(ZkLoginError::MissingIdToken)?;

        let mut slot = self.lock().await;
        if slot.session.key().is_none() {
            return Err(ZkLoginError::KeyUnavailable);
        }
        if slot.session.set_id_token(id_token) {
            slot.app = AppSession::default();
        }
        self.persist(&slot)?;
        self.set_status(SessionState::Resolving, None);

        self.resolve(&mut slot).await
    }

    /// Clears every session field in memory and in the store.
    pub async fn disconnect(&self) -> Result<(), ZkLoginError> {
        let mut slot = self.lock().await;
        slot.session.clear();
        slot.app = AppSession::default();
        self.inner.store.clear()?;
        self.set_status(SessionState::Disconnected, None);
        self.inner.observer.on_disconnected();
        info!("session disconnected");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    async fn resolve(&self, slot: &mut Slot) -> Result<SuiAddress, ZkLoginError> {
        match self.try_resolve(slot).await {
            Ok(address) => {
                self.set_status(SessionState::Ready, Some(address));
                info!(%address, "session ready");
                self.inner.observer.on_ready(&address);
                Ok(address)
            }
            Err(e) if e.is_aborted() => {
                info!("session resolution aborted, state kept");
                Err(e)
            }
            Err(e) => {
                self.fail(slot, &e);
                Err(e)
            }
        }
    }

    async fn try_resolve(&self, slot: &mut Slot) -> Result<SuiAddress, ZkLoginError> {
        let id_token = slot
            .session
            .id_token()
            .ok_or(ZkLoginError::MissingIdToken)?
            .to_owned();
        let claims = decode_claims(&id_token)?;
        if claims.is_expired(unix_now()) {
            return Err(ZkLoginError::TokenExpired);
        }

        let key = slot.session.key().ok_or(ZkLoginError::KeyUnavailable)?;
        let public_key = key.public_key();
        let max_epoch = slot.session.max_epoch().ok_or(ZkLoginError::KeyUnavailable)?;
        let randomness = slot
            .session
            .randomness()
            .ok_or(ZkLoginError::KeyUnavailable)?
            .to_owned();

        let current = self.current_epoch().await?;
        if current > max_epoch {
            return Err(ZkLoginError::EpochExpired { max_epoch, current });
        }

        let expected = build_nonce(&public_key, max_epoch, &randomness)?;
        if claims.nonce.as_deref() != Some(expected.as_str()) {
            return Err(ZkLoginError::NonceMismatch);
        }
        debug!(sub_len = claims.sub.len(), "identity token accepted");

        let reusable = slot
            .app
            .access_token
            .clone()
            .filter(|_| slot.app.logged_in);
        let access_token = match reusable {
            Some(token) => token,
            None => {
                let tokens = abortable(
                    &self.inner.cancel,
                    self.inner.backend.exchange_id_token(&id_token),
                )
                .await?;
                slot.app = AppSession {
                    logged_in: true,
                    access_token: Some(tokens.access_token.clone()),
                    refresh_token: Some(tokens.refresh_token),
                };
                self.persist(slot)?;
                debug!("identity token exchanged");
                tokens.access_token
            }
        };

        let salt = match slot.session.salt() {
            Some(salt) => salt.clone(),
            None => {
                let encoded = abortable(
                    &self.inner.cancel,
                    self.inner.backend.fetch_salt(&access_token),
                )
                .await?;
                let salt = decode_salt(&encoded)?;
                slot.session.set_salt(salt.clone());
                salt
            }
        };

        let derived = derive_address(&claims, &salt)?;
        debug!(address = %derived.address, "address derived");
        slot.session.set_claims(claims);
        slot.session.set_derived(derived);

        if slot.session.bound_proof().is_none() {
            let request =
                proof::build_request(&id_token, &public_key, max_epoch, &randomness, &salt);
            let zk_proof = proof::request_proof(&self.inner.prover, &self.inner.cancel, &request)
                .await?;
            slot.session.set_proof(zk_proof)?;
            self.persist(slot)?;
            info!(max_epoch, "proof acquired");
        } else {
            debug!("reusing cached proof");
        }

        slot.session.address().ok_or(ZkLoginError::SessionNotReady)
    }

    /// `Failed` then `Disconnected`: both namespaces are cleared together.
    fn fail(&self, slot: &mut Slot, e: &ZkLoginError) {
        error!(kind = ?e.kind(), error = %e, "session resolution failed");
        slot.session.clear();
        slot.app = AppSession::default();
        if let Err(clear_err) = self.inner.store.clear() {
            warn!(error = %clear_err, "failed to clear persisted session");
        }

        self.set_status(SessionState::Failed, None);
        self.inner.observer.on_failed(e);
        self.set_status(SessionState::Disconnected, None);
        self.inner.observer.on_disconnected();
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    pub(crate) async fn lock(&self) -> MutexGuard<'_, Slot> {
        self.inner.slot.lock().await
    }

    pub(crate) async fn current_epoch(&self) -> Result<u64, ZkLoginError> {
        Ok(abortable(&self.inner.cancel, self.inner.chain.current_epoch()).await?)
    }

    fn persist(&self, slot: &Slot) -> Result<(), ZkLoginError> {
        let state = PersistedState {
            zklogin: slot.session.to_settings(),
            app: slot.app.clone(),
        };
        self.inner.store.save(&state)?;
        Ok(())
    }

    fn set_status(&self, state: SessionState, address: Option<SuiAddress>) {
        *self.inner.status.write().unwrap() = Status { state, address };
    }
}
