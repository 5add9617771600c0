//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! user input (key, recipient, amount)
//!     → units.rs / wallet.rs (exact parsing, sender derivation)
//!     → transaction.rs (nonce, gas, fees, confirm, sign, broadcast, receipt)
//!     → session.rs (timeouts, swappable handle)
//!     → client.rs (alloy provider behind the LedgerClient trait)
//! ```
//!
//! # Security Constraints
//! - Private keys are entered per transfer and wiped after signing
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - Broadcasts are never retried automatically

pub mod client;
pub mod session;
pub mod transaction;
pub mod types;
pub mod units;
pub mod wallet;

pub use client::{Connector, HttpConnector, LedgerClient};
pub use session::{RpcSession, Session};
pub use transaction::{Confirm, TransferPipeline, TransferRequest};
pub use types::{
    ConfirmError, ConnectError, GasLimit, GasSource, QueryError, SubmitError, TransactionDraft,
    TransactionReceipt, TransferError, TransferOutcome, TransferPreview,
};
pub use wallet::{SecretKey, Wallet};
