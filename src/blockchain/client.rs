//! Ledger RPC client handles.
//!
//! # Responsibilities
//! - Define the narrow RPC surface the wallet needs (`LedgerClient`)
//! - Open handles to a configured endpoint (`Connector`)
//! - Map alloy provider calls and errors onto wallet types
//!
//! Timeouts and handle swapping live in `session.rs`; a handle here is a
//! plain, stateless view of one transport.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use std::sync::Arc;

use crate::blockchain::types::{
    ConnectError, QueryError, QueryResult, SubmitError, TransactionReceipt, UnsignedTransfer,
};
use crate::config::NetworkEndpoint;

/// One live connection to a ledger node.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// `eth_blockNumber`, used as the liveness probe.
    async fn block_number(&self) -> QueryResult<u64>;

    async fn chain_id(&self) -> QueryResult<u64>;

    async fn balance(&self, address: Address) -> QueryResult<U256>;

    async fn transaction_count(&self, address: Address) -> QueryResult<u64>;

    async fn gas_price(&self) -> QueryResult<U256>;

    async fn estimate_gas(&self, transfer: &UnsignedTransfer) -> QueryResult<u64>;

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash, SubmitError>;

    async fn transaction_receipt(&self, hash: TxHash) -> QueryResult<Option<TransactionReceipt>>;
}

/// Opens `LedgerClient` handles for an endpoint.
///
/// Implementations only build the transport; reachability is probed by the
/// session so every connector gets the same timeout treatment.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &NetworkEndpoint) -> Result<Arc<dyn LedgerClient>, ConnectError>;
}

/// JSON-RPC over HTTP via alloy.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnector;

#[async_trait]
impl Connector for HttpConnector {
    async fn connect(&self, endpoint: &NetworkEndpoint) -> Result<Arc<dyn LedgerClient>, ConnectError> {
        let url: url::Url = endpoint.rpc_url.parse().map_err(|e: url::ParseError| ConnectError::InvalidUrl {
            url: endpoint.rpc_url.clone(),
            reason: e.to_string(),
        })?;

        let provider = ProviderBuilder::new().connect_http(url);
        Ok(Arc::new(AlloyLedgerClient::new(Arc::new(provider))))
    }
}

/// `LedgerClient` backed by an alloy provider.
#[derive(Clone)]
pub struct AlloyLedgerClient {
    provider: Arc<dyn Provider + Send + Sync>,
}

impl AlloyLedgerClient {
    pub fn new(provider: Arc<dyn Provider + Send + Sync>) -> Self {
        Self { provider }
    }
}

impl std::fmt::Debug for AlloyLedgerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlloyLedgerClient").finish_non_exhaustive()
    }
}

fn rpc_err(e: impl std::fmt::Display) -> QueryError {
    QueryError::Rpc(e.to_string())
}

#[async_trait]
impl LedgerClient for AlloyLedgerClient {
    async fn block_number(&self) -> QueryResult<u64> {
        self.provider.get_block_number().await.map_err(rpc_err)
    }

    async fn chain_id(&self) -> QueryResult<u64> {
        self.provider.get_chain_id().await.map_err(rpc_err)
    }

    async fn balance(&self, address: Address) -> QueryResult<U256> {
        self.provider.get_balance(address).await.map_err(rpc_err)
    }

    async fn transaction_count(&self, address: Address) -> QueryResult<u64> {
        self.provider.get_transaction_count(address).await.map_err(rpc_err)
    }

    async fn gas_price(&self) -> QueryResult<U256> {
        self.provider
            .get_gas_price()
            .await
            .map(U256::from)
            .map_err(rpc_err)
    }

    async fn estimate_gas(&self, transfer: &UnsignedTransfer) -> QueryResult<u64> {
        let request = TransactionRequest::default()
            .with_from(transfer.from)
            .with_to(transfer.to)
            .with_value(transfer.value_wei)
            .with_nonce(transfer.nonce);

        self.provider.estimate_gas(request).await.map_err(rpc_err)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash, SubmitError> {
        let pending = self
            .provider
            .send_raw_transaction(raw)
            .await
            .map_err(|e| SubmitError::Rejected(e.to_string()))?;
        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(&self, hash: TxHash) -> QueryResult<Option<TransactionReceipt>> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(rpc_err)?;

        Ok(receipt.map(|r| TransactionReceipt {
            hash: r.transaction_hash,
            status: r.status(),
            block_number: r.block_number,
            block_hash: r.block_hash,
            gas_used: r.gas_used,
        }))
    }
}
