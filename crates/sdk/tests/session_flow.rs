//! End-to-end controller scenarios against in-process fakes.
//!
//! The fakes share one [`Shared`] record so a test can inspect what each
//! remote saw after the controller has taken ownership of them.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use config::ZkLoginConfig;
use num_bigint::BigUint;
use sdk::jwt::IdentityClaims;
use sdk::salt::{derive_address, derive_address_seed};
use sdk::{
    ChannelObserver, CompositeSignature, ErrorKind, SessionController, SessionEvent, SessionState,
    ZkLoginError,
};
use sdk_core::{IssBase64Details, ProofPoints, SuiAddress, ZkProof};
use signer::{EphemeralKeypair, IntentScope, Signer, UserSignature, intent_digest};
use storage::{InMemorySessionStore, SessionStore};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use transport::{
    ChainClient, Coin, IdentityBackend, ProofRequest, ProvingService, SessionTokens,
    TransactionResult, TransferRequest, TransportError,
};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum ProverMode {
    Valid,
    Status(u16),
    Hang,
}

struct Shared {
    epoch: AtomicU64,
    prover_mode: Mutex<ProverMode>,
    coins: Mutex<Vec<Coin>>,
    exchanges: AtomicUsize,
    /// Access token presented on each salt fetch.
    salt_requests: Mutex<Vec<String>>,
    proof_requests: Mutex<Vec<ProofRequest>>,
    address_updates: Mutex<Vec<(String, String)>>,
    payments: Mutex<Vec<(String, Option<String>)>>,
    transfers: Mutex<Vec<TransferRequest>>,
    executed: Mutex<Vec<(Vec<u8>, String)>>,
}

impl Shared {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            epoch: AtomicU64::new(100),
            prover_mode: Mutex::new(ProverMode::Valid),
            coins: Mutex::new(Vec::new()),
            exchanges: AtomicUsize::new(0),
            salt_requests: Mutex::new(Vec::new()),
            proof_requests: Mutex::new(Vec::new()),
            address_updates: Mutex::new(Vec::new()),
            payments: Mutex::new(Vec::new()),
            transfers: Mutex::new(Vec::new()),
            executed: Mutex::new(Vec::new()),
        })
    }

    fn proofs(&self) -> usize {
        self.proof_requests.lock().unwrap().len()
    }

    fn salt_fetches(&self) -> usize {
        self.salt_requests.lock().unwrap().len()
    }
}

struct FakeBackend(Arc<Shared>);

impl IdentityBackend for FakeBackend {
    async fn exchange_id_token(&self, _id_token: &str) -> Result<SessionTokens, TransportError> {
        let n = self.0.exchanges.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(SessionTokens {
            access_token: format!("access-{n}"),
            refresh_token: format!("refresh-{n}"),
        })
    }

    async fn fetch_salt(&self, access_token: &str) -> Result<String, TransportError> {
        self.0
            .salt_requests
            .lock()
            .unwrap()
            .push(access_token.to_owned());
        Ok("AAE=".into())
    }

    async fn update_address(
        &self,
        _access_token: &str,
        signature: &str,
        address: &str,
    ) -> Result<(), TransportError> {
        self.0
            .address_updates
            .lock()
            .unwrap()
            .push((signature.to_owned(), address.to_owned()));
        Ok(())
    }

    async fn confirm_payment(
        &self,
        _access_token: &str,
        transaction_digest: &str,
        proof_signature: Option<&str>,
    ) -> Result<(), TransportError> {
        self.0.payments.lock().unwrap().push((
            transaction_digest.to_owned(),
            proof_signature.map(str::to_owned),
        ));
        Ok(())
    }
}

struct FakeProver(Arc<Shared>);

impl ProvingService for FakeProver {
    async fn request_proof(&self, request: &ProofRequest) -> Result<ZkProof, TransportError> {
        let mode = *self.0.prover_mode.lock().unwrap();
        if let ProverMode::Hang = mode {
            return std::future::pending().await;
        }
        self.0.proof_requests.lock().unwrap().push(request.clone());
        match mode {
            ProverMode::Status(status) => Err(TransportError::Status {
                endpoint: "prover",
                status,
                status_text: "Internal Server Error".into(),
                body: String::new(),
            }),
            _ => Ok(sample_proof()),
        }
    }
}

struct FakeChain(Arc<Shared>);

impl ChainClient for FakeChain {
    async fn current_epoch(&self) -> Result<u64, TransportError> {
        Ok(self.0.epoch.load(Ordering::SeqCst))
    }

    async fn get_coins(
        &self,
        _owner: &SuiAddress,
        coin_type: &str,
    ) -> Result<Vec<Coin>, TransportError> {
        Ok(self
            .0
            .coins
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.coin_type == coin_type)
            .cloned()
            .collect())
    }

    async fn build_transfer(&self, request: &TransferRequest) -> Result<Vec<u8>, TransportError> {
        self.0.transfers.lock().unwrap().push(request.clone());
        let mut bytes = b"transfer".to_vec();
        bytes.extend_from_slice(&request.amount.to_le_bytes());
        Ok(bytes)
    }

    async fn execute_transaction(
        &self,
        tx_bytes: &[u8],
        signature: &str,
    ) -> Result<TransactionResult, TransportError> {
        self.0
            .executed
            .lock()
            .unwrap()
            .push((tx_bytes.to_vec(), signature.to_owned()));
        Ok(TransactionResult {
            digest: "8mUQdJ2u3VHCcWvHBeXmqZfEz1xTw6RgJ3ft3z7LXSEg".into(),
            success: true,
            error: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

type TestController = SessionController<
    FakeBackend,
    FakeProver,
    FakeChain,
    Arc<InMemorySessionStore>,
    ChannelObserver,
>;

const RECIPIENT: &str = "0xbeef";
const COIN_TYPE: &str = "0x2::sui::SUI";
const GAS_BUDGET: u64 = 5;

fn config() -> ZkLoginConfig {
    ZkLoginConfig::builder()
        .rpc_url("http://127.0.0.1:9000")
        .prover_url("http://127.0.0.1:8001")
        .backend_url("http://127.0.0.1:8080")
        .client_id("client-abc")
        .redirect_uri("https://app.example.com/callback")
        .recipient(RECIPIENT)
        .gas_budget(GAS_BUDGET)
        .attach_proof_signature(true)
        .build()
        .unwrap()
}

fn harness(
    shared: &Arc<Shared>,
    store: &Arc<InMemorySessionStore>,
    cancel: CancellationToken,
) -> (TestController, UnboundedReceiver<SessionEvent>) {
    let (observer, events) = ChannelObserver::new();
    let controller = SessionController::new(
        config(),
        FakeBackend(shared.clone()),
        FakeProver(shared.clone()),
        FakeChain(shared.clone()),
        store.clone(),
        observer,
        cancel,
    )
    .unwrap();
    (controller, events)
}

fn sample_proof() -> ZkProof {
    ZkProof {
        proof_points: ProofPoints {
            a: vec!["101".into(), "102".into(), "1".into()],
            b: vec![
                vec!["103".into(), "104".into()],
                vec!["105".into(), "106".into()],
                vec!["1".into(), "0".into()],
            ],
            c: vec!["107".into(), "108".into(), "1".into()],
        },
        iss_base64_details: IssBase64Details {
            value: "wiaXNzIjoiaHR0cHM6Ly9hY2NvdW50cy5nb29nbGUuY29tIiw".into(),
            index_mod4: 1,
        },
        header_base64: "eyJhbGciOiJSUzI1NiJ9".into(),
    }
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn id_token(nonce: &str, exp: u64) -> String {
    id_token_for("user123", nonce, exp)
}

fn id_token_for(sub: &str, nonce: &str, exp: u64) -> String {
    let payload = serde_json::json!({
        "iss": "https://accounts.google.com",
        "sub": sub,
        "aud": "client-abc",
        "exp": exp,
        "nonce": nonce,
    });
    format!(
        "{}.{}.c2lnbmF0dXJl",
        URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(payload.to_string())
    )
}

fn redirect(token: &str) -> String {
    format!("https://app.example.com/callback#id_token={token}&authuser=0")
}

fn nonce_of(url: &url::Url) -> String {
    url.query_pairs()
        .find(|(k, _)| k == "nonce")
        .map(|(_, v)| v.into_owned())
        .unwrap()
}

fn expected_address() -> SuiAddress {
    address_for("user123")
}

fn address_for(sub: &str) -> SuiAddress {
    let claims = IdentityClaims {
        iss: "https://accounts.google.com".into(),
        sub: sub.into(),
        aud: "client-abc".into(),
        exp: None,
        nonce: None,
    };
    derive_address(&claims, &BigUint::from(1u8)).unwrap().address
}

async fn login(controller: &TestController) -> SuiAddress {
    let url = controller.start_login().await.unwrap();
    let token = id_token(&nonce_of(&url), now() + 3600);
    controller.complete_login(&redirect(&token)).await.unwrap()
}

fn coin(id: &str, balance: u64) -> Coin {
    Coin {
        coin_type: COIN_TYPE.into(),
        coin_object_id: id.into(),
        balance,
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_reaches_ready_and_signs() {
    let shared = Shared::new();
    let store = Arc::new(InMemorySessionStore::new());
    let (controller, mut events) = harness(&shared, &store, CancellationToken::new());
    assert_eq!(controller.state(), SessionState::Uninitialized);

    let address = login(&controller).await;
    assert_eq!(address, expected_address());
    assert_eq!(controller.state(), SessionState::Ready);
    assert_eq!(controller.address(), Some(address));
    assert_eq!(events.try_recv().unwrap(), SessionEvent::Ready { address });

    let signature = controller.sign_message(b"hello").await.unwrap();
    assert!(!signature.as_bytes().is_empty());

    let body = CompositeSignature::from_base64(&signature.to_base64())
        .unwrap()
        .decode()
        .unwrap();
    assert_eq!(body.max_epoch, 102);
    assert_eq!(body.inputs.proof_points, sample_proof().proof_points);
    let seed = derive_address_seed(&BigUint::from(1u8), "user123", "client-abc").unwrap();
    assert_eq!(body.inputs.address_seed, seed.to_string());

    let user_sig = UserSignature::from_bytes(&body.user_signature).unwrap();
    let digest = intent_digest(IntentScope::PersonalMessage, b"hello").unwrap();
    user_sig.verify(&digest).unwrap();

    let persisted = store.load().unwrap();
    assert!(persisted.zklogin.enabled);
    assert!(persisted.app.logged_in);
    assert_eq!(
        persisted.zklogin.proof_public_key,
        Some(hex::encode(user_sig.public_key()))
    );
}

#[tokio::test]
async fn nonce_inputs_reach_the_prover_unchanged() {
    let shared = Shared::new();
    let store = Arc::new(InMemorySessionStore::new());
    let (controller, _events) = harness(&shared, &store, CancellationToken::new());

    let url = controller.start_login().await.unwrap();
    let url_nonce = nonce_of(&url);

    // Key material is persisted before the URL is handed out.
    let settings = store.load().unwrap().zklogin;
    let key = EphemeralKeypair::from_encoded(settings.ephemeral_secret_key.as_deref().unwrap())
        .unwrap();
    let max_epoch = settings.max_epoch.unwrap();
    let randomness = settings.randomness.clone().unwrap();
    assert_eq!(
        zk_crypto::generate_nonce(&key.public_key(), max_epoch, &randomness).unwrap(),
        url_nonce
    );

    let token = id_token(&url_nonce, now() + 3600);
    controller.complete_login(&redirect(&token)).await.unwrap();

    let requests = shared.proof_requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let sent = &requests[0];
    assert_eq!(sent.jwt, token);
    assert_eq!(sent.max_epoch, max_epoch.to_string());
    assert_eq!(sent.jwt_randomness, randomness);
    assert_eq!(
        sent.extended_ephemeral_public_key,
        zk_crypto::extended_ephemeral_public_key(&key.public_key())
    );
    assert_eq!(sent.salt, "1");
    assert_eq!(sent.key_claim_name, "sub");
}

#[tokio::test]
async fn rehydration_reuses_the_cached_proof() {
    let shared = Shared::new();
    let store = Arc::new(InMemorySessionStore::new());
    let (first, _events) = harness(&shared, &store, CancellationToken::new());
    let address = login(&first).await;
    drop(first);

    let (second, mut events) = harness(&shared, &store, CancellationToken::new());
    assert_eq!(second.state(), SessionState::Resolving);
    assert_eq!(second.address(), None);

    assert_eq!(second.initialize().await.unwrap(), Some(address));
    assert!(second.is_ready());
    assert_eq!(events.try_recv().unwrap(), SessionEvent::Ready { address });

    assert_eq!(shared.proofs(), 1, "proof must come from the cache");
    assert_eq!(shared.exchanges.load(Ordering::SeqCst), 1, "access token reused");
    second.sign_message(b"again").await.unwrap();

    // The salt lives only in memory: one fetch per process.
    assert_eq!(shared.salt_fetches(), 2);
    assert_eq!(*shared.salt_requests.lock().unwrap(), vec!["access-1", "access-1"]);
}

#[tokio::test]
async fn rehydration_rejects_an_elapsed_epoch() {
    let shared = Shared::new();
    let store = Arc::new(InMemorySessionStore::new());
    let (first, _events) = harness(&shared, &store, CancellationToken::new());
    login(&first).await;
    drop(first);

    shared.epoch.store(103, Ordering::SeqCst);
    let (second, mut events) = harness(&shared, &store, CancellationToken::new());
    let err = second.initialize().await.unwrap_err();
    assert!(matches!(
        err,
        ZkLoginError::EpochExpired {
            max_epoch: 102,
            current: 103
        }
    ));

    assert_eq!(second.state(), SessionState::Disconnected);
    assert!(store.load().unwrap().is_empty());
    assert!(matches!(
        events.try_recv().unwrap(),
        SessionEvent::Failed {
            kind: ErrorKind::Invalid,
            ..
        }
    ));
    assert_eq!(events.try_recv().unwrap(), SessionEvent::Disconnected);
}

#[tokio::test]
async fn new_key_makes_the_session_not_ready() {
    let shared = Shared::new();
    let store = Arc::new(InMemorySessionStore::new());
    let (controller, _events) = harness(&shared, &store, CancellationToken::new());
    login(&controller).await;

    controller.start_login().await.unwrap();
    assert!(!controller.is_ready());
    assert_eq!(controller.address(), None);
    assert!(matches!(
        controller.sign_message(b"hello").await,
        Err(ZkLoginError::SessionNotReady)
    ));

    let settings = store.load().unwrap().zklogin;
    assert!(settings.ephemeral_secret_key.is_some());
    assert!(settings.proof.is_none());
    assert!(settings.proof_public_key.is_none());
    assert!(settings.id_token.is_none());
}

#[tokio::test]
async fn disconnect_clears_everything() {
    let shared = Shared::new();
    let store = Arc::new(InMemorySessionStore::new());
    let (controller, mut events) = harness(&shared, &store, CancellationToken::new());
    login(&controller).await;
    let _ = events.try_recv();

    controller.disconnect().await.unwrap();

    let persisted = store.load().unwrap();
    assert!(persisted.is_empty());
    assert!(persisted.zklogin.ephemeral_secret_key.is_none());
    assert!(persisted.zklogin.randomness.is_none());
    assert!(persisted.zklogin.max_epoch.is_none());
    assert!(persisted.zklogin.proof.is_none());
    assert!(persisted.zklogin.id_token.is_none());
    assert_eq!(controller.state(), SessionState::Disconnected);
    assert_eq!(events.try_recv().unwrap(), SessionEvent::Disconnected);
    assert!(matches!(
        controller.sign_message(b"hello").await,
        Err(ZkLoginError::KeyUnavailable)
    ));
}

#[tokio::test]
async fn abort_mid_proof_keeps_persisted_state() {
    let shared = Shared::new();
    let store = Arc::new(InMemorySessionStore::new());
    *shared.prover_mode.lock().unwrap() = ProverMode::Hang;

    let (controller, mut events) = harness(&shared, &store, CancellationToken::new());
    let url = controller.start_login().await.unwrap();
    let token = id_token(&nonce_of(&url), now() + 3600);

    let redirect_url = redirect(&token);
    let (result, ()) = tokio::join!(controller.complete_login(&redirect_url), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        controller.teardown();
    });
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Aborted);
    assert_eq!(controller.state(), SessionState::Resolving);
    assert!(events.try_recv().is_err(), "no lifecycle event on abort");

    let persisted = store.load().unwrap();
    assert_eq!(persisted.zklogin.id_token.as_deref(), Some(token.as_str()));
    assert!(persisted.zklogin.ephemeral_secret_key.is_some());
    assert!(persisted.app.logged_in);

    // The next process picks up where this one stopped.
    *shared.prover_mode.lock().unwrap() = ProverMode::Valid;
    let (next, _events) = harness(&shared, &store, CancellationToken::new());
    assert_eq!(next.initialize().await.unwrap(), Some(expected_address()));
}

#[tokio::test]
async fn proof_failure_logs_the_app_out() {
    let shared = Shared::new();
    let store = Arc::new(InMemorySessionStore::new());
    *shared.prover_mode.lock().unwrap() = ProverMode::Status(500);
    let (controller, mut events) = harness(&shared, &store, CancellationToken::new());

    let url = controller.start_login().await.unwrap();
    let token = id_token(&nonce_of(&url), now() + 3600);
    let err = controller.complete_login(&redirect(&token)).await.unwrap_err();
    assert!(matches!(
        err,
        ZkLoginError::ProofServiceError {
            status_code: 500,
            ..
        }
    ));

    assert_eq!(controller.state(), SessionState::Disconnected);
    let persisted = store.load().unwrap();
    assert!(!persisted.app.logged_in);
    assert!(persisted.app.access_token.is_none());
    assert!(persisted.is_empty());
    assert!(matches!(
        events.try_recv().unwrap(),
        SessionEvent::Failed {
            kind: ErrorKind::Transport,
            ..
        }
    ));
    assert_eq!(events.try_recv().unwrap(), SessionEvent::Disconnected);
}

#[tokio::test]
async fn wrong_nonce_fails_before_proving() {
    let shared = Shared::new();
    let store = Arc::new(InMemorySessionStore::new());
    let (controller, _events) = harness(&shared, &store, CancellationToken::new());

    controller.start_login().await.unwrap();
    let token = id_token("AAAAAAAAAAAAAAAAAAAAAAAAAAA", now() + 3600);
    let err = controller.complete_login(&redirect(&token)).await.unwrap_err();
    assert!(matches!(err, ZkLoginError::NonceMismatch));
    assert_eq!(shared.proofs(), 0);
    assert_eq!(shared.exchanges.load(Ordering::SeqCst), 0);
    assert!(store.load().unwrap().is_empty());
}

#[tokio::test]
async fn expired_token_fails() {
    let shared = Shared::new();
    let store = Arc::new(InMemorySessionStore::new());
    let (controller, _events) = harness(&shared, &store, CancellationToken::new());

    let url = controller.start_login().await.unwrap();
    let token = id_token(&nonce_of(&url), now() - 60);
    let err = controller.complete_login(&redirect(&token)).await.unwrap_err();
    assert!(matches!(err, ZkLoginError::TokenExpired));
    assert_eq!(controller.state(), SessionState::Disconnected);
}

#[tokio::test]
async fn redirect_without_token_changes_nothing() {
    let shared = Shared::new();
    let store = Arc::new(InMemorySessionStore::new());
    let (controller, _events) = harness(&shared, &store, CancellationToken::new());
    controller.start_login().await.unwrap();

    let err = controller
        .complete_login("https://app.example.com/callback#error=access_denied")
        .await
        .unwrap_err();
    assert!(matches!(err, ZkLoginError::MissingIdToken));
    assert_eq!(controller.state(), SessionState::Uninitialized);
    assert!(store.load().unwrap().zklogin.ephemeral_secret_key.is_some());
}

#[tokio::test]
async fn payment_splits_and_reports() {
    let shared = Shared::new();
    let store = Arc::new(InMemorySessionStore::new());
    let (controller, _events) = harness(&shared, &store, CancellationToken::new());
    let address = login(&controller).await;
    *shared.coins.lock().unwrap() = vec![coin("0xc0", 30), coin("0xc1", 50), coin("0xc2", 20)];

    let receipt = controller.pay(45).await.unwrap();
    assert_eq!(receipt.amount, 45);
    assert_eq!(receipt.inputs.len(), 2);
    // 30 + 20 covers the amount and the gas budget.
    assert_eq!(receipt.inputs[1].take, 20);
    assert!(receipt.reported);

    let transfers = shared.transfers.lock().unwrap();
    assert_eq!(transfers[0].sender, address);
    assert_eq!(transfers[0].recipient, SuiAddress::parse(RECIPIENT).unwrap());
    assert_eq!(transfers[0].input_coins, vec!["0xc0", "0xc1"]);
    assert_eq!(transfers[0].amount, 45);

    let executed = shared.executed.lock().unwrap();
    let (tx_bytes, signature) = &executed[0];
    let body = CompositeSignature::from_base64(signature)
        .unwrap()
        .decode()
        .unwrap();
    let user_sig = UserSignature::from_bytes(&body.user_signature).unwrap();
    user_sig
        .verify(&intent_digest(IntentScope::TransactionData, tx_bytes).unwrap())
        .unwrap();

    let payments = shared.payments.lock().unwrap();
    assert_eq!(payments[0].0, receipt.digest);
    assert!(payments[0].1.is_some(), "proof signature attached");
}

#[tokio::test]
async fn insufficient_funds_leave_the_session_alone() {
    let shared = Shared::new();
    let store = Arc::new(InMemorySessionStore::new());
    let (controller, mut events) = harness(&shared, &store, CancellationToken::new());
    login(&controller).await;
    let _ = events.try_recv();
    *shared.coins.lock().unwrap() = vec![coin("0xc0", 30), coin("0xc1", 50), coin("0xc2", 20)];

    let err = controller.pay(200).await.unwrap_err();
    assert!(matches!(
        err,
        ZkLoginError::InsufficientBalance {
            requested: 205,
            available: 100
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Funds);
    assert!(controller.is_ready());
    assert!(!store.load().unwrap().is_empty());
    assert!(events.try_recv().is_err());
    assert!(shared.transfers.lock().unwrap().is_empty());
}

#[tokio::test]
async fn address_ownership_is_signed_and_posted() {
    let shared = Shared::new();
    let store = Arc::new(InMemorySessionStore::new());
    let (controller, _events) = harness(&shared, &store, CancellationToken::new());
    let address = login(&controller).await;

    let signature = controller.prove_address_ownership().await.unwrap();

    let updates = shared.address_updates.lock().unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].0, signature.to_base64());
    assert_eq!(updates[0].1, address.to_string());

    let body = signature.decode().unwrap();
    let user_sig = UserSignature::from_bytes(&body.user_signature).unwrap();
    user_sig
        .verify(
            &intent_digest(IntentScope::PersonalMessage, address.to_string().as_bytes()).unwrap(),
        )
        .unwrap();
}

#[tokio::test]
async fn native_payment_reserves_the_gas_budget() {
    let shared = Shared::new();
    let store = Arc::new(InMemorySessionStore::new());
    let (controller, _events) = harness(&shared, &store, CancellationToken::new());
    login(&controller).await;

    // An exact cover leaves nothing for gas.
    *shared.coins.lock().unwrap() = vec![coin("0xc0", 45)];
    let err = controller.pay(45).await.unwrap_err();
    assert!(matches!(
        err,
        ZkLoginError::InsufficientBalance {
            requested: 50,
            available: 45
        }
    ));
    assert!(shared.transfers.lock().unwrap().is_empty());

    *shared.coins.lock().unwrap() = vec![coin("0xc0", 45), coin("0xc1", 10)];
    let receipt = controller.pay(45).await.unwrap();
    assert_eq!(receipt.inputs[0].take, 45);
    assert_eq!(receipt.inputs[1].take, GAS_BUDGET);

    let transfers = shared.transfers.lock().unwrap();
    assert_eq!(transfers[0].input_coins, vec!["0xc0", "0xc1"]);
    assert_eq!(transfers[0].amount, 45);
    assert_eq!(transfers[0].gas_budget, GAS_BUDGET);
}

#[tokio::test]
async fn second_login_for_another_subject_gets_its_own_proof() {
    let shared = Shared::new();
    let store = Arc::new(InMemorySessionStore::new());
    let (controller, _events) = harness(&shared, &store, CancellationToken::new());

    let url = controller.start_login().await.unwrap();
    let nonce = nonce_of(&url);
    let first = controller
        .complete_login(&redirect(&id_token_for("user123", &nonce, now() + 3600)))
        .await
        .unwrap();
    assert_eq!(first, address_for("user123"));

    let second_token = id_token_for("user999", &nonce, now() + 3600);
    let second = controller
        .complete_login(&redirect(&second_token))
        .await
        .unwrap();
    assert_eq!(second, address_for("user999"));
    assert_ne!(first, second);

    assert_eq!(shared.proofs(), 2);
    assert_eq!(shared.proof_requests.lock().unwrap()[1].jwt, second_token);
    assert_eq!(shared.exchanges.load(Ordering::SeqCst), 2);
    assert_eq!(*shared.salt_requests.lock().unwrap(), vec!["access-1", "access-2"]);

    let body = controller.sign_message(b"hello").await.unwrap().decode().unwrap();
    let seed = derive_address_seed(&BigUint::from(1u8), "user999", "client-abc").unwrap();
    assert_eq!(body.inputs.address_seed, seed.to_string());
    assert_eq!(store.load().unwrap().app.access_token.as_deref(), Some("access-2"));
}

#[tokio::test]
async fn salt_is_fetched_once_for_a_session() {
    let shared = Shared::new();
    let store = Arc::new(InMemorySessionStore::new());
    let (controller, _events) = harness(&shared, &store, CancellationToken::new());
    login(&controller).await;
    *shared.coins.lock().unwrap() = vec![coin("0xc0", 100)];

    controller.sign_message(b"one").await.unwrap();
    controller.pay(10).await.unwrap();
    controller.prove_address_ownership().await.unwrap();
    controller.initialize().await.unwrap();

    assert_eq!(shared.salt_fetches(), 1);
}

#[tokio::test]
async fn ready_state_outlives_the_epoch_but_signing_does_not() {
    let shared = Shared::new();
    let store = Arc::new(InMemorySessionStore::new());
    let (controller, _events) = harness(&shared, &store, CancellationToken::new());
    login(&controller).await;

    shared.epoch.store(103, Ordering::SeqCst);
    assert!(controller.is_ready());
    assert!(matches!(
        controller.sign_message(b"late").await,
        Err(ZkLoginError::EpochExpired {
            max_epoch: 102,
            current: 103
        })
    ));
    assert_eq!(controller.state(), SessionState::Ready);
    assert!(!store.load().unwrap().is_empty());
}
