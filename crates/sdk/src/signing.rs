//! Message signing and address ownership.

use signer::{IntentScope, Signer};
use storage::SessionStore;
use transport::{ChainClient, IdentityBackend, ProvingService, abortable};

use crate::observer::SessionObserver;
use crate::session::Session;
use crate::signature::{CompositeSignature, compose_signature};
use crate::{SessionController, ZkLoginError};

impl<B, P, C, S, O> SessionController<B, P, C, S, O>
where
    B: IdentityBackend,
    P: ProvingService,
    C: ChainClient,
    S: SessionStore,
    O: SessionObserver,
{
    /// Signs `message` as a personal message.
    ///
    /// Reads the current epoch first; a key past its `maxEpoch` cannot sign.
    ///
    /// # Errors
    ///
    /// Any readiness failure from the session ([`ZkLoginError::SessionNotReady`],
    /// [`ZkLoginError::KeyUnavailable`], [`ZkLoginError::EpochExpired`], ...).
    /// Session state is never cleared here.
    pub async fn sign_message(&self, message: &[u8]) -> Result<CompositeSignature, ZkLoginError> {
        let slot = self.lock().await;
        let current = self.current_epoch().await?;
        sign_with(&slot.session, current, IntentScope::PersonalMessage, message)
    }

    /// Signs the session address and reports it to the backend.
    ///
    /// The signed payload is the `0x`-prefixed address string. Returns the
    /// signature that was posted.
    pub async fn prove_address_ownership(&self) -> Result<CompositeSignature, ZkLoginError> {
        let slot = self.lock().await;
        let current = self.current_epoch().await?;

        let address = slot
            .session
            .signing_parts(current)?
            .address
            .to_string();
        let signature = sign_with(
            &slot.session,
            current,
            IntentScope::PersonalMessage,
            address.as_bytes(),
        )?;
        let access_token = slot
            .app
            .access_token
            .as_deref()
            .ok_or(ZkLoginError::SessionNotReady)?;

        abortable(
            &self.inner.cancel,
            self.inner
                .backend
                .update_address(access_token, &signature.to_base64(), &address),
        )
        .await?;
        tracing::info!(%address, "address ownership reported");
        Ok(signature)
    }
}

/// Signs `payload` with the session key and wraps it in a composite
/// signature. Fails unless the session is ready at `current_epoch`.
pub(crate) fn sign_with(
    session: &Session,
    current_epoch: u64,
    scope: IntentScope,
    payload: &[u8],
) -> Result<CompositeSignature, ZkLoginError> {
    let parts = session.signing_parts(current_epoch)?;
    let user_signature = parts.key.sign_intent(scope, payload)?;
    compose_signature(
        &user_signature,
        parts.proof,
        parts.address_seed,
        parts.max_epoch,
    )
}
