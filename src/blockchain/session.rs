//! RPC session with a swappable client handle.
//!
//! # Responsibilities
//! - Open a handle and verify the node answers before accepting it
//! - Serve every query through exactly one handle, with a timeout
//! - Replace the handle atomically when the supervisor reconnects
//!
//! # Concurrency
//! The current `Session` lives in an `ArcSwap`. Calls take a full snapshot
//! (`load_full`) before touching the network, so a concurrent swap is only
//! seen by calls that start after it. Sessions are never mutated in place.

use alloy::primitives::{Address, TxHash, U256};
use arc_swap::ArcSwap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::blockchain::client::{Connector, LedgerClient};
use crate::blockchain::types::{
    ConfirmError, ConnectError, QueryError, QueryResult, SignedTransaction, SubmitError,
    TransactionReceipt, UnsignedTransfer,
};
use crate::blockchain::wallet::parse_address;
use crate::config::{NetworkEndpoint, RpcConfig};
use crate::observability::metrics;

/// One connected handle. Replaced wholesale on reconnect.
pub struct Session {
    pub endpoint: NetworkEndpoint,
    pub connected: bool,
    pub client: Arc<dyn LedgerClient>,
    /// 1 for the first connect, +1 per successful reconnect.
    pub generation: u64,
    pub connected_at: Instant,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("rpc_url", &self.endpoint.rpc_url)
            .field("connected", &self.connected)
            .field("generation", &self.generation)
            .field("connected_for", &self.connected_at.elapsed())
            .finish()
    }
}

/// Owns the connection to the selected ledger node.
pub struct RpcSession {
    endpoint: NetworkEndpoint,
    connector: Arc<dyn Connector>,
    config: RpcConfig,
    current: ArcSwap<Session>,
    generations: AtomicU64,
}

impl RpcSession {
    /// Connect to `endpoint` and verify it answers.
    pub async fn connect(
        endpoint: NetworkEndpoint,
        connector: Arc<dyn Connector>,
        config: RpcConfig,
    ) -> Result<Self, ConnectError> {
        let client = open(&endpoint, connector.as_ref(), config.connect_timeout()).await?;

        tracing::info!(
            network = %endpoint.display_name,
            rpc_url = %endpoint.rpc_url,
            "Connected to ledger node"
        );
        metrics::record_session_alive(true);

        let session = Session {
            endpoint: endpoint.clone(),
            connected: true,
            client,
            generation: 1,
            connected_at: Instant::now(),
        };

        Ok(Self {
            endpoint,
            connector,
            config,
            current: ArcSwap::from_pointee(session),
            generations: AtomicU64::new(1),
        })
    }

    /// Open a fresh handle to the same endpoint and swap it in.
    ///
    /// Returns the new generation. On failure the current handle stays.
    pub async fn reconnect(&self) -> Result<u64, ConnectError> {
        let client = open(&self.endpoint, self.connector.as_ref(), self.config.connect_timeout()).await?;
        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;

        let previous = self.current.swap(Arc::new(Session {
            endpoint: self.endpoint.clone(),
            connected: true,
            client,
            generation,
            connected_at: Instant::now(),
        }));

        tracing::debug!(
            generation,
            previous_age_secs = previous.connected_at.elapsed().as_secs(),
            "Session handle replaced"
        );
        Ok(generation)
    }

    /// Probe the current handle. Never errors; bounded by the liveness timeout.
    pub async fn is_alive(&self) -> bool {
        let session = self.current.load_full();
        let alive = matches!(
            timeout(self.config.liveness_timeout(), session.client.block_number()).await,
            Ok(Ok(_))
        );
        metrics::record_session_alive(alive);
        alive
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Arc<Session> {
        self.current.load_full()
    }

    pub fn generation(&self) -> u64 {
        self.current.load().generation
    }

    pub fn endpoint(&self) -> &NetworkEndpoint {
        &self.endpoint
    }

    /// Run one query on a single handle snapshot with the request timeout.
    async fn query<T, F, Fut>(&self, method: &'static str, f: F) -> QueryResult<T>
    where
        F: FnOnce(Arc<dyn LedgerClient>) -> Fut,
        Fut: Future<Output = QueryResult<T>>,
    {
        let client = self.current.load_full().client.clone();
        match timeout(self.config.request_timeout(), f(client)).await {
            Ok(result) => {
                if let Err(e) = &result {
                    tracing::debug!(method, error = %e, "RPC call failed");
                }
                result
            }
            Err(_) => {
                tracing::warn!(method, "RPC timeout");
                Err(QueryError::Timeout {
                    method,
                    secs: self.config.request_timeout_secs,
                })
            }
        }
    }

    /// Balance of `address` in wei. Malformed addresses never reach the node.
    pub async fn get_balance(&self, address: &str) -> QueryResult<U256> {
        let address = parse_address(address).map_err(|e| {
            tracing::debug!(input = %address, reason = %e, "Rejected balance query");
            QueryError::InvalidAddress(address.trim().to_string())
        })?;
        self.query("eth_getBalance", |c| async move { c.balance(address).await })
            .await
    }

    /// Transaction count of `address`, used as the next nonce.
    pub async fn get_nonce(&self, address: Address) -> QueryResult<u64> {
        self.query("eth_getTransactionCount", |c| async move {
            c.transaction_count(address).await
        })
        .await
    }

    pub async fn get_gas_price(&self) -> QueryResult<U256> {
        self.query("eth_gasPrice", |c| async move { c.gas_price().await })
            .await
    }

    pub async fn get_chain_id(&self) -> QueryResult<u64> {
        self.query("eth_chainId", |c| async move { c.chain_id().await })
            .await
    }

    pub async fn estimate_gas(&self, transfer: &UnsignedTransfer) -> QueryResult<u64> {
        self.query("eth_estimateGas", |c| async move { c.estimate_gas(transfer).await })
            .await
    }

    pub async fn get_receipt(&self, hash: TxHash) -> QueryResult<Option<TransactionReceipt>> {
        self.query("eth_getTransactionReceipt", |c| async move {
            c.transaction_receipt(hash).await
        })
        .await
    }

    /// Broadcast a signed transaction once. Never retried here.
    pub async fn send_raw(&self, tx: &SignedTransaction) -> Result<TxHash, SubmitError> {
        let client = self.current.load_full().client.clone();
        match timeout(self.config.request_timeout(), client.send_raw_transaction(&tx.raw)).await {
            Ok(Ok(hash)) => {
                if hash != tx.hash {
                    tracing::warn!(expected = %tx.hash, returned = %hash, "Node returned unexpected transaction hash");
                }
                Ok(hash)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(SubmitError::Timeout(self.config.request_timeout_secs)),
        }
    }

    /// Poll for a receipt every `poll_interval` until one appears or
    /// `deadline` elapses. Query errors are logged and polling continues.
    pub async fn wait_for_receipt(
        &self,
        hash: TxHash,
        poll_interval: Duration,
        deadline: Duration,
    ) -> Result<TransactionReceipt, ConfirmError> {
        let result = timeout(deadline, async {
            let mut ticker = interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                match self.get_receipt(hash).await {
                    Ok(Some(receipt)) => return receipt,
                    Ok(None) => tracing::debug!(tx_hash = %hash, "Transaction pending"),
                    Err(e) => tracing::warn!(tx_hash = %hash, error = %e, "Receipt query failed, will retry"),
                }
            }
        })
        .await;

        result.map_err(|_| ConfirmError::Timeout {
            hash,
            secs: deadline.as_secs(),
        })
    }
}

impl std::fmt::Debug for RpcSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcSession")
            .field("rpc_url", &self.endpoint.rpc_url)
            .field("generation", &self.generation())
            .field("timeout_secs", &self.config.request_timeout_secs)
            .finish()
    }
}

/// Build a handle and require one successful probe within `limit`.
async fn open(
    endpoint: &NetworkEndpoint,
    connector: &dyn Connector,
    limit: Duration,
) -> Result<Arc<dyn LedgerClient>, ConnectError> {
    let client = connector.connect(endpoint).await?;

    match timeout(limit, client.block_number()).await {
        Ok(Ok(block)) => {
            tracing::debug!(rpc_url = %endpoint.rpc_url, block, "Reachability probe succeeded");
            Ok(client)
        }
        Ok(Err(e)) => Err(ConnectError::Unreachable {
            url: endpoint.rpc_url.clone(),
            reason: e.to_string(),
        }),
        Err(_) => Err(ConnectError::Timeout {
            url: endpoint.rpc_url.clone(),
            secs: limit.as_secs(),
        }),
    }
}
