//! Transfer pipeline: build, confirm, sign, broadcast, await receipt.
//!
//! # Stages
//! ```text
//! validate inputs → derive sender → nonce → estimate gas (fallback) → buffer
//!     → gas price + chain id → user confirmation → sign → broadcast → receipt
//! ```
//!
//! Each stage either advances or ends the transfer. Nothing is retried across
//! stages, and a broadcast is attempted at most once per run.

use async_trait::async_trait;
use std::sync::Arc;

use crate::blockchain::session::RpcSession;
use crate::blockchain::types::{
    ConfirmError, GasLimit, GasSource, TransferError, TransferOutcome, TransferPreview,
    UnsignedTransfer,
};
use crate::blockchain::units::parse_amount;
use crate::blockchain::wallet::{parse_address, SecretKey, Wallet, WalletError};
use crate::config::{ConfirmationConfig, GasConfig};
use crate::observability::metrics;

/// Raw user input for one transfer. Dropped (and the key wiped) when the
/// pipeline finishes with it.
#[derive(Debug)]
pub struct TransferRequest {
    pub sender_key: SecretKey,
    pub recipient: String,
    /// Decimal amount of whole units, e.g. "0.1".
    pub amount: String,
}

/// The pre-signing yes/no decision.
#[async_trait]
pub trait Confirm: Send {
    async fn confirm(&mut self, preview: &TransferPreview) -> bool;
}

#[async_trait]
impl<F> Confirm for F
where
    F: FnMut(&TransferPreview) -> bool + Send,
{
    async fn confirm(&mut self, preview: &TransferPreview) -> bool {
        self(preview)
    }
}

/// Apply the safety buffer `numerator / denominator` to a gas estimate,
/// truncating toward zero. Never below the estimate.
pub fn apply_gas_buffer(estimate: u64, numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return estimate;
    }
    let buffered = estimate as u128 * numerator as u128 / denominator as u128;
    (buffered.min(u64::MAX as u128) as u64).max(estimate)
}

/// Runs transfers against one session.
pub struct TransferPipeline {
    session: Arc<RpcSession>,
    gas: GasConfig,
    confirmation: ConfirmationConfig,
}

impl TransferPipeline {
    pub fn new(session: Arc<RpcSession>, gas: GasConfig, confirmation: ConfirmationConfig) -> Self {
        Self {
            session,
            gas,
            confirmation,
        }
    }

    /// Run one transfer to completion.
    ///
    /// `Ok(TransferOutcome::Cancelled)` means the user declined; nothing was
    /// signed. `Ok(TransferOutcome::Unconfirmed { .. })` means the
    /// transaction was broadcast but no receipt arrived before the timeout.
    pub async fn execute<C>(&self, request: TransferRequest, confirm: &mut C) -> Result<TransferOutcome, TransferError>
    where
        C: Confirm + ?Sized,
    {
        let result = self.run(request, confirm).await;
        match &result {
            Ok(outcome) => metrics::record_transfer(outcome.label()),
            Err(e) if e.is_validation() => {}
            Err(_) => metrics::record_transfer("failed"),
        }
        result
    }

    async fn run<C>(&self, request: TransferRequest, confirm: &mut C) -> Result<TransferOutcome, TransferError>
    where
        C: Confirm + ?Sized,
    {
        let TransferRequest {
            sender_key,
            recipient,
            amount,
        } = request;

        // 1. Validate inputs
        let to = parse_address(&recipient)
            .map_err(|e| TransferError::InvalidRecipient(format!("{} ({})", recipient.trim(), e)))?;
        let value_wei = parse_amount(&amount)
            .map_err(|e| TransferError::InvalidAmount(e.to_string()))?;

        // 2. Derive sender; the key text is wiped when `from_secret` returns
        let wallet = Wallet::from_secret(sender_key).map_err(|e| match e {
            WalletError::InvalidKey(reason) => TransferError::InvalidKey(reason),
            WalletError::Signing(reason) => TransferError::Signing(reason),
        })?;
        let from = wallet.address();

        // 3. Nonce
        let nonce = self
            .session
            .get_nonce(from)
            .await
            .map_err(TransferError::NonceFetchFailed)?;

        let transfer = UnsignedTransfer {
            from,
            to,
            value_wei,
            nonce,
        };

        // 4–5. Gas limit
        let gas = self.gas_limit(&transfer).await;

        // 6. Fee parameters
        let gas_price = self
            .session
            .get_gas_price()
            .await
            .map_err(TransferError::FeeFetchFailed)?;
        let chain_id = self
            .session
            .get_chain_id()
            .await
            .map_err(TransferError::FeeFetchFailed)?;

        let draft = transfer.priced(gas.limit, gas_price, chain_id);
        let preview = TransferPreview {
            total_fee_wei: draft.max_fee(),
            draft,
            gas,
        };

        tracing::info!(
            from = %preview.draft.from,
            to = %preview.draft.to,
            value_wei = %preview.draft.value_wei,
            nonce = preview.draft.nonce,
            gas_limit = preview.draft.gas_limit,
            gas_price = %preview.draft.gas_price,
            chain_id = preview.draft.chain_id,
            "Transfer prepared"
        );

        // 7. Confirmation
        if !confirm.confirm(&preview).await {
            tracing::info!("Transfer cancelled by user");
            return Ok(TransferOutcome::Cancelled);
        }

        let TransferPreview { draft, gas, .. } = preview;

        // 8. Sign; the signer is consumed here
        let signed = wallet
            .sign(draft)
            .map_err(|e| TransferError::Signing(e.to_string()))?;

        // 9. Broadcast, exactly once
        let hash = match self.session.send_raw(&signed).await {
            Ok(hash) => hash,
            Err(e) => {
                tracing::error!(tx_hash = %signed.hash, error = %e, "Broadcast failed, not retrying");
                return Err(TransferError::Submit(e));
            }
        };
        tracing::info!(tx_hash = %hash, "Transaction broadcast, waiting for receipt");

        // 10. Receipt
        match self
            .session
            .wait_for_receipt(hash, self.confirmation.poll_interval(), self.confirmation.timeout())
            .await
        {
            Ok(receipt) => {
                tracing::info!(
                    tx_hash = %receipt.hash,
                    status = receipt.status,
                    block_number = ?receipt.block_number,
                    "Transaction confirmed"
                );
                Ok(TransferOutcome::Confirmed { receipt, gas })
            }
            Err(ConfirmError::Timeout { hash, .. }) => {
                tracing::warn!(tx_hash = %hash, "No receipt before timeout; transaction may still be mined");
                Ok(TransferOutcome::Unconfirmed {
                    hash,
                    gas,
                    waited: self.confirmation.timeout(),
                })
            }
        }
    }

    /// Estimate with buffer, or the default limit when estimation fails.
    async fn gas_limit(&self, transfer: &UnsignedTransfer) -> GasLimit {
        match self.session.estimate_gas(transfer).await {
            Ok(estimate) => GasLimit {
                limit: apply_gas_buffer(estimate, self.gas.buffer_numerator, self.gas.buffer_denominator),
                source: GasSource::Estimated { estimate },
            },
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    default_limit = self.gas.default_limit,
                    "Gas estimation failed, using default gas limit"
                );
                metrics::record_gas_fallback();
                GasLimit {
                    limit: self.gas.default_limit,
                    source: GasSource::Fallback {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }
}
