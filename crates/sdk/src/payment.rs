//! Payments from the session address.
//!
//! A payment moves `amount` of the configured coin type to the configured
//! recipient. The fullnode builds the transaction from the coins picked by
//! the active [`CoinSelector`](crate::selection::CoinSelector); the session
//! key signs it and the composite signature is submitted with it.
//!
//! Payment failures never touch the session. Insufficient funds in
//! particular are reported before anything is built or signed.
//!
//! Native-coin transfers pay gas out of their input coins, so for the native
//! coin the selection must cover `amount + gas_budget`. Other coin types pay
//! gas from the sender's native coins and select exactly `amount`.

use signer::IntentScope;
use storage::SessionStore;
use tracing::{info, warn};
use transport::{
    ChainClient, IdentityBackend, ProvingService, TransferRequest, abortable, pays_gas_from_inputs,
};

use crate::controller::Slot;
use crate::observer::SessionObserver;
use crate::selection::{SelectedCoin, available_balance};
use crate::signing::sign_with;
use crate::{SessionController, ZkLoginError};

/// Outcome of a submitted payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub digest: String,
    pub amount: u64,
    /// Input coins. For the native coin these also cover the gas budget.
    pub inputs: Vec<SelectedCoin>,
    /// Whether the backend accepted the payment report.
    pub reported: bool,
}

impl<B, P, C, S, O> SessionController<B, P, C, S, O>
where
    B: IdentityBackend,
    P: ProvingService,
    C: ChainClient,
    S: SessionStore,
    O: SessionObserver,
{
    /// Pays `amount` to the configured recipient.
    ///
    /// # Errors
    ///
    /// - [`ZkLoginError::InvalidAmount`] for a zero amount
    /// - [`ZkLoginError::RecipientMissing`] if no recipient is configured
    /// - session readiness errors
    /// - [`ZkLoginError::InsufficientBalance`] if owned coins cannot cover
    ///   `amount`, plus the gas budget when paying in the native coin
    /// - [`ZkLoginError::TransactionFailed`] if the chain rejects execution
    pub async fn pay(&self, amount: u64) -> Result<PaymentReceipt, ZkLoginError> {
        if amount == 0 {
            return Err(ZkLoginError::InvalidAmount);
        }
        let payment = &self.inner.config.payment;
        let recipient = payment.recipient.ok_or(ZkLoginError::RecipientMissing)?;

        let slot = self.lock().await;
        let current = self.current_epoch().await?;
        let sender = slot.session.signing_parts(current)?.address;

        let coins = abortable(
            &self.inner.cancel,
            self.inner.chain.get_coins(&sender, &payment.coin_type),
        )
        .await?;
        let target = if pays_gas_from_inputs(&payment.coin_type) {
            amount.saturating_add(payment.gas_budget)
        } else {
            amount
        };
        let selection = self
            .coin_selector()
            .select(&coins, target)
            .ok_or_else(|| ZkLoginError::InsufficientBalance {
                requested: target,
                available: available_balance(&coins),
            })?;

        let request = TransferRequest {
            sender,
            coin_type: payment.coin_type.clone(),
            input_coins: selection.coin_ids(),
            recipient,
            amount,
            gas_budget: payment.gas_budget,
        };
        let tx_bytes = abortable(&self.inner.cancel, self.inner.chain.build_transfer(&request))
            .await?;
        let signature = sign_with(
            &slot.session,
            current,
            IntentScope::TransactionData,
            &tx_bytes,
        )?;

        let result = abortable(
            &self.inner.cancel,
            self.inner
                .chain
                .execute_transaction(&tx_bytes, &signature.to_base64()),
        )
        .await?;
        if !result.success {
            return Err(ZkLoginError::TransactionFailed {
                digest: result.digest,
                reason: result.error.unwrap_or_else(|| "unknown".to_owned()),
            });
        }
        info!(digest = %result.digest, amount, inputs = selection.inputs.len(), "payment executed");

        let reported = self.report_payment(&slot, current, &result.digest).await;
        Ok(PaymentReceipt {
            digest: result.digest,
            amount,
            inputs: selection.inputs,
            reported,
        })
    }

    /// Posts the payment to the backend. A failed report is logged, not
    /// returned: the transaction already executed.
    async fn report_payment(&self, slot: &Slot, current_epoch: u64, digest: &str) -> bool {
        let Some(access_token) = slot.app.access_token.as_deref() else {
            warn!(%digest, "no access token, payment not reported");
            return false;
        };

        let proof_signature = if self.inner.config.payment.attach_proof_signature {
            match sign_with(
                &slot.session,
                current_epoch,
                IntentScope::PersonalMessage,
                digest.as_bytes(),
            ) {
                Ok(sig) => Some(sig.to_base64()),
                Err(e) => {
                    warn!(%digest, error = %e, "could not sign payment proof");
                    None
                }
            }
        } else {
            None
        };

        match abortable(
            &self.inner.cancel,
            self.inner
                .backend
                .confirm_payment(access_token, digest, proof_signature.as_deref()),
        )
        .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(%digest, error = %e, "payment report failed");
                false
            }
        }
    }
}
