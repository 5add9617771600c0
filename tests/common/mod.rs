//! Shared utilities for integration testing: an in-memory ledger node, a
//! connector that hands it out, and a scripted console.

#![allow(dead_code)]

use alloy::primitives::{keccak256, Address, TxHash, B256, U256};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ledger_wallet::blockchain::client::{Connector, LedgerClient};
use ledger_wallet::blockchain::types::{
    ConnectError, QueryError, QueryResult, SubmitError, TransactionReceipt, UnsignedTransfer,
};
use ledger_wallet::cli::Console;
use ledger_wallet::config::{NetworkEndpoint, RpcConfig};

// Anvil's first account
pub const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

pub const ONE_ETHER: u64 = 1_000_000_000_000_000_000;
pub const GWEI: u64 = 1_000_000_000;

/// Mutable behaviour of a `MockNode`.
#[derive(Debug, Clone)]
pub struct NodeState {
    pub alive: bool,
    pub balance: U256,
    pub nonce: u64,
    pub gas_price: Result<U256, QueryError>,
    pub chain_id: Result<u64, QueryError>,
    pub estimate: Result<u64, QueryError>,
    /// `Some` makes every broadcast fail with this error.
    pub reject: Option<SubmitError>,
    /// Receipt polls answered with "pending" before the receipt shows up.
    /// `None` never produces a receipt.
    pub pending_polls: Option<usize>,
    pub receipt_status: bool,
    /// Delay applied to every call.
    pub latency: Option<Duration>,
    /// Extra delay applied only to broadcasts.
    pub send_latency: Option<Duration>,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            alive: true,
            balance: U256::from(ONE_ETHER),
            nonce: 0,
            gas_price: Ok(U256::from(20 * GWEI)),
            chain_id: Ok(270),
            estimate: Ok(21_000),
            reject: None,
            pending_polls: Some(0),
            receipt_status: true,
            latency: None,
            send_latency: None,
        }
    }
}

/// In-memory ledger node.
#[derive(Debug, Default)]
pub struct MockNode {
    state: Mutex<NodeState>,
    sent: Mutex<Vec<(TxHash, Vec<u8>)>>,
    pub block_number_calls: AtomicUsize,
    pub balance_calls: AtomicUsize,
    pub nonce_calls: AtomicUsize,
    pub fee_calls: AtomicUsize,
    pub estimate_calls: AtomicUsize,
    pub send_calls: AtomicUsize,
    pub receipt_calls: AtomicUsize,
}

impl MockNode {
    pub fn new(state: NodeState) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(state),
            ..Default::default()
        })
    }

    pub fn healthy() -> Arc<Self> {
        Self::new(NodeState::default())
    }

    pub fn update(&self, f: impl FnOnce(&mut NodeState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn set_alive(&self, alive: bool) {
        self.update(|s| s.alive = alive);
    }

    pub fn sent_hashes(&self) -> Vec<TxHash> {
        self.sent.lock().unwrap().iter().map(|(h, _)| *h).collect()
    }

    pub fn sent_raw(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().iter().map(|(_, r)| r.clone()).collect()
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    async fn enter(&self, counter: &AtomicUsize) -> QueryResult<NodeState> {
        counter.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap().clone();
        if let Some(latency) = state.latency {
            tokio::time::sleep(latency).await;
        }
        if !state.alive {
            return Err(QueryError::Rpc("connection refused".to_string()));
        }
        Ok(state)
    }
}

#[async_trait]
impl LedgerClient for MockNode {
    async fn block_number(&self) -> QueryResult<u64> {
        self.enter(&self.block_number_calls).await?;
        Ok(1_000)
    }

    async fn chain_id(&self) -> QueryResult<u64> {
        self.enter(&self.fee_calls).await?.chain_id
    }

    async fn balance(&self, _address: Address) -> QueryResult<U256> {
        Ok(self.enter(&self.balance_calls).await?.balance)
    }

    async fn transaction_count(&self, _address: Address) -> QueryResult<u64> {
        Ok(self.enter(&self.nonce_calls).await?.nonce)
    }

    async fn gas_price(&self) -> QueryResult<U256> {
        self.enter(&self.fee_calls).await?.gas_price
    }

    async fn estimate_gas(&self, _transfer: &UnsignedTransfer) -> QueryResult<u64> {
        self.enter(&self.estimate_calls).await?.estimate
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash, SubmitError> {
        let state = self
            .enter(&self.send_calls)
            .await
            .map_err(|e| SubmitError::Rejected(e.to_string()))?;
        if let Some(latency) = state.send_latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(err) = state.reject {
            return Err(err);
        }
        let hash = keccak256(raw);
        self.sent.lock().unwrap().push((hash, raw.to_vec()));
        Ok(hash)
    }

    async fn transaction_receipt(&self, hash: TxHash) -> QueryResult<Option<TransactionReceipt>> {
        let state = self.enter(&self.receipt_calls).await?;
        if !self.sent_hashes().contains(&hash) {
            return Ok(None);
        }
        let polls = Self::count(&self.receipt_calls);
        match state.pending_polls {
            Some(pending) if polls > pending => Ok(Some(TransactionReceipt {
                hash,
                status: state.receipt_status,
                block_number: Some(1_001),
                block_hash: Some(B256::repeat_byte(0x11)),
                gas_used: 21_000,
            })),
            _ => Ok(None),
        }
    }
}

/// Hands out queued nodes; the last one is reused once the queue drains.
#[derive(Debug, Default)]
pub struct MockConnector {
    nodes: Mutex<VecDeque<Arc<MockNode>>>,
    failures_remaining: AtomicUsize,
    pub connects: AtomicUsize,
}

impl MockConnector {
    pub fn with_nodes(nodes: Vec<Arc<MockNode>>) -> Arc<Self> {
        Arc::new(Self {
            nodes: Mutex::new(nodes.into()),
            ..Default::default()
        })
    }

    pub fn unreachable() -> Arc<Self> {
        let connector = Self::with_nodes(vec![]);
        connector.fail_next(usize::MAX);
        connector
    }

    /// Fail the next `n` connects.
    pub fn fail_next(&self, n: usize) {
        self.failures_remaining.store(n, Ordering::SeqCst);
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, endpoint: &NetworkEndpoint) -> Result<Arc<dyn LedgerClient>, ConnectError> {
        self.connects.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ConnectError::Unreachable {
                url: endpoint.rpc_url.clone(),
                reason: "connection refused".to_string(),
            });
        }

        let mut nodes = self.nodes.lock().unwrap();
        let node = if nodes.len() > 1 { nodes.pop_front() } else { nodes.front().cloned() };
        match node {
            Some(node) => Ok(node as Arc<dyn LedgerClient>),
            None => Err(ConnectError::Unreachable {
                url: endpoint.rpc_url.clone(),
                reason: "no node configured".to_string(),
            }),
        }
    }
}

pub fn endpoint() -> NetworkEndpoint {
    NetworkEndpoint {
        id: "1".to_string(),
        display_name: "Mock Ledger".to_string(),
        rpc_url: "http://localhost:3050".to_string(),
    }
}

pub fn fast_rpc() -> RpcConfig {
    RpcConfig {
        connect_timeout_secs: 1,
        request_timeout_secs: 1,
        liveness_timeout_secs: 1,
    }
}

/// Console fed from a fixed script; everything printed or prompted is kept.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    pub output: Vec<String>,
}

impl ScriptedConsole {
    pub fn new(inputs: &[&str]) -> Self {
        Self {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            output: Vec::new(),
        }
    }

    pub fn printed(&self, needle: &str) -> bool {
        self.output.iter().any(|line| line.contains(needle))
    }

    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }
}

#[async_trait]
impl Console for ScriptedConsole {
    async fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.output.push(prompt.to_string());
        self.inputs.pop_front()
    }

    fn print(&mut self, text: &str) {
        self.output.push(text.to_string());
    }
}
