//! Chain-specific types and error definitions.

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use std::time::Duration;
use thiserror::Error;

/// Errors opening a session to a ledger node.
#[derive(Debug, Clone, Error)]
pub enum ConnectError {
    /// The configured URL cannot be used as an RPC endpoint.
    #[error("Invalid RPC URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The node answered with an error or the transport failed.
    #[error("Node at {url} is unreachable: {reason}")]
    Unreachable { url: String, reason: String },

    /// The reachability probe did not complete in time.
    #[error("Node at {url} did not respond within {secs} seconds")]
    Timeout { url: String, secs: u64 },
}

/// Errors from read-only RPC queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Input is not a 20-byte hex address. No request was sent.
    #[error("Invalid address '{0}'")]
    InvalidAddress(String),

    /// Transport or node-level failure.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The call did not complete within the request timeout.
    #[error("RPC {method} timed out after {secs} seconds")]
    Timeout { method: &'static str, secs: u64 },
}

/// Errors broadcasting a signed transaction.
///
/// Delivery status is unknown after any of these, so the transaction must
/// never be resent automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Transaction rejected: {0}")]
    Rejected(String),

    #[error("Submission timed out after {0} seconds; the transaction may still be pending")]
    Timeout(u64),
}

/// Errors waiting for a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfirmError {
    /// No receipt within the deadline. The transaction may still land.
    #[error("Transaction {hash} not confirmed after {secs} seconds")]
    Timeout { hash: TxHash, secs: u64 },
}

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Transfer with every field except gas known. Used for estimation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransfer {
    pub from: Address,
    pub to: Address,
    pub value_wei: U256,
    pub nonce: u64,
}

impl UnsignedTransfer {
    /// Complete the draft with fee fields.
    pub fn priced(self, gas_limit: u64, gas_price: U256, chain_id: u64) -> TransactionDraft {
        TransactionDraft {
            from: self.from,
            to: self.to,
            value_wei: self.value_wei,
            nonce: self.nonce,
            gas_limit,
            gas_price,
            chain_id,
        }
    }
}

/// A fully populated, not yet signed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    pub from: Address,
    pub to: Address,
    pub value_wei: U256,
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: U256,
    pub chain_id: u64,
}

impl TransactionDraft {
    /// Maximum fee the sender pays: gas_limit × gas_price.
    pub fn max_fee(&self) -> U256 {
        U256::from(self.gas_limit).saturating_mul(self.gas_price)
    }
}

/// A signed transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub draft: TransactionDraft,
    pub hash: TxHash,
    /// EIP-2718 encoded bytes.
    pub raw: Bytes,
}

/// Receipt of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub hash: TxHash,
    /// `true` if execution succeeded, `false` if it reverted.
    pub status: bool,
    pub block_number: Option<u64>,
    pub block_hash: Option<B256>,
    pub gas_used: u64,
}

/// How the gas limit of a transfer was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GasSource {
    /// The node estimated `estimate`; the limit carries the safety buffer.
    Estimated { estimate: u64 },
    /// Estimation failed; the configured default limit is used unbuffered.
    Fallback { reason: String },
}

/// Gas limit applied to a transfer and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasLimit {
    pub limit: u64,
    pub source: GasSource,
}

impl GasLimit {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, GasSource::Fallback { .. })
    }
}

/// What the user is asked to confirm before signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPreview {
    pub draft: TransactionDraft,
    pub gas: GasLimit,
    pub total_fee_wei: U256,
}

/// Terminal state of a transfer that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// A receipt was found. `receipt.status` tells whether it reverted.
    Confirmed { receipt: TransactionReceipt, gas: GasLimit },
    /// Broadcast succeeded but no receipt arrived in time.
    Unconfirmed { hash: TxHash, gas: GasLimit, waited: Duration },
    /// The user declined at the confirmation step. Nothing was signed.
    Cancelled,
}

impl TransferOutcome {
    /// Label used for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            TransferOutcome::Confirmed { receipt, .. } if receipt.status => "confirmed",
            TransferOutcome::Confirmed { .. } => "reverted",
            TransferOutcome::Unconfirmed { .. } => "unconfirmed",
            TransferOutcome::Cancelled => "cancelled",
        }
    }
}

/// Errors that abort a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Failed to fetch nonce: {0}")]
    NonceFetchFailed(QueryError),

    #[error("Failed to fetch fee parameters: {0}")]
    FeeFetchFailed(QueryError),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error(transparent)]
    Submit(#[from] SubmitError),
}

impl TransferError {
    /// Local input problems the caller should re-prompt for.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TransferError::InvalidRecipient(_)
                | TransferError::InvalidAmount(_)
                | TransferError::InvalidKey(_)
        )
    }
}
