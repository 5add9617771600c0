//! Interactive menu shell.
//!
//! Owns nothing but configuration and a connector; the session, supervisor
//! and pipeline are created once a network connects.

use async_trait::async_trait;
use std::sync::Arc;

use crate::blockchain::client::Connector;
use crate::blockchain::session::RpcSession;
use crate::blockchain::transaction::{Confirm, TransferPipeline, TransferRequest};
use crate::blockchain::types::{QueryError, TransferOutcome, TransferPreview};
use crate::blockchain::units::{format_ether, format_gwei};
use crate::blockchain::wallet::SecretKey;
use crate::cli::prompt::{is_yes, Console};
use crate::config::{NetworkEndpoint, WalletConfig};
use crate::health::ConnectionSupervisor;
use crate::lifecycle::Shutdown;

/// How the shell ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellExit {
    /// The user chose exit, or input closed.
    Completed,
    /// No network could be connected and the user declined to retry.
    NoConnection,
}

impl ShellExit {
    /// Process exit status. Declining the retry prompt is a clean exit.
    pub fn code(self) -> i32 {
        match self {
            ShellExit::Completed | ShellExit::NoConnection => 0,
        }
    }
}

pub struct Shell {
    config: WalletConfig,
    connector: Arc<dyn Connector>,
    network: Option<String>,
}

impl Shell {
    /// `network` preselects an endpoint id and skips the network menu.
    pub fn new(config: WalletConfig, connector: Arc<dyn Connector>, network: Option<String>) -> Self {
        Self {
            config,
            connector,
            network,
        }
    }

    pub async fn run<C: Console>(&self, console: &mut C) -> ShellExit {
        console.print("========================================");
        console.print("        Ledger Wallet Command Line      ");
        console.print("========================================");

        let Some(session) = self.connect(console).await else {
            console.print("Cannot proceed without network connection. Exiting...");
            return ShellExit::NoConnection;
        };

        let shutdown = Shutdown::new();
        let supervisor = ConnectionSupervisor::new(session.clone(), &self.config.supervisor)
            .spawn(shutdown.subscribe());
        let pipeline = TransferPipeline::new(
            session.clone(),
            self.config.gas.clone(),
            self.config.confirmation.clone(),
        );

        loop {
            console.print("");
            console.print("Please select an operation:");
            console.print("1. Check Account Balance");
            console.print("2. Transfer ETH");
            console.print("3. Exit");

            let Some(choice) = console.read_line("Enter your choice (1-3): ").await else {
                break;
            };

            let keep_going = match choice.trim() {
                "1" => self.balance(console, &session).await,
                "2" => self.transfer(console, &pipeline).await,
                "3" => {
                    console.print("Thank you for using Ledger Wallet. Goodbye!");
                    break;
                }
                _ => {
                    console.print("Invalid choice, please try again");
                    true
                }
            };
            if !keep_going {
                break;
            }
        }

        shutdown.trigger();
        if let Err(e) = supervisor.await {
            tracing::error!(error = %e, "Connection supervisor task failed");
        }
        ShellExit::Completed
    }

    /// Pick an endpoint and connect, offering a retry on failure.
    async fn connect<C: Console>(&self, console: &mut C) -> Option<Arc<RpcSession>> {
        let preselected = self
            .network
            .as_deref()
            .and_then(|id| match self.config.networks.find(id) {
                Some(endpoint) => Some(endpoint.clone()),
                None => {
                    console.print(&format!("Unknown network '{}'", id));
                    None
                }
            });
        let endpoint = match preselected {
            Some(endpoint) => endpoint,
            None => self.select_network(console).await?,
        };

        loop {
            console.print(&format!("Connecting to {}...", endpoint.display_name));
            match RpcSession::connect(endpoint.clone(), self.connector.clone(), self.config.rpc.clone()).await {
                Ok(session) => {
                    console.print(&format!("Connected to {} ({})", endpoint.display_name, endpoint.rpc_url));
                    return Some(Arc::new(session));
                }
                Err(e) => {
                    tracing::error!(rpc_url = %endpoint.rpc_url, error = %e, "Connection failed");
                    console.print(&format!("Connection failed: {}", e));
                    let answer = console.read_line("Retry connection? (y/n): ").await?;
                    if !is_yes(&answer) {
                        return None;
                    }
                }
            }
        }
    }

    async fn select_network<C: Console>(&self, console: &mut C) -> Option<NetworkEndpoint> {
        let endpoints = &self.config.networks.endpoints;
        loop {
            console.print("");
            console.print("Please select a network:");
            for endpoint in endpoints {
                console.print(&format!("{}. {}", endpoint.id, endpoint.display_name));
            }

            let choice = console.read_line("Enter your choice: ").await?;
            match self.config.networks.find(choice.trim()) {
                Some(endpoint) => return Some(endpoint.clone()),
                None => console.print("Invalid choice, please try again"),
            }
        }
    }

    /// Returns `false` when input closed.
    async fn balance<C: Console>(&self, console: &mut C, session: &RpcSession) -> bool {
        loop {
            let Some(address) = console.read_line("Enter wallet address (blank to go back): ").await else {
                return false;
            };
            if address.trim().is_empty() {
                return true;
            }

            match session.get_balance(&address).await {
                Ok(wei) => {
                    console.print(&format!("Balance: {} ETH", format_ether(wei)));
                    return true;
                }
                Err(QueryError::InvalidAddress(_)) => {
                    console.print("Invalid wallet address!");
                }
                Err(e) => {
                    console.print(&format!("Error querying balance: {}", e));
                    return true;
                }
            }
        }
    }

    /// Returns `false` when input closed.
    async fn transfer<C: Console>(&self, console: &mut C, pipeline: &TransferPipeline) -> bool {
        loop {
            let Some(key) = console.read_line("Enter sender private key (blank to go back): ").await else {
                return false;
            };
            let key = SecretKey::from(key);
            if key.is_blank() {
                return true;
            }
            let Some(recipient) = console.read_line("Enter recipient address: ").await else {
                return false;
            };
            let Some(amount) = console.read_line("Enter transfer amount (ETH): ").await else {
                return false;
            };

            let request = TransferRequest {
                sender_key: key,
                recipient,
                amount,
            };
            let mut confirm = ConsoleConfirm { console: &mut *console };

            match pipeline.execute(request, &mut confirm).await {
                Ok(outcome) => {
                    show_outcome(console, &outcome);
                    return true;
                }
                Err(e) if e.is_validation() => {
                    console.print(&e.to_string());
                }
                Err(e) => {
                    console.print(&format!("Transfer failed: {}", e));
                    return true;
                }
            }
        }
    }
}

/// Shows the preview and asks `(y/n)`.
struct ConsoleConfirm<'a, C> {
    console: &'a mut C,
}

#[async_trait]
impl<'a, C: Console> Confirm for ConsoleConfirm<'a, C> {
    async fn confirm(&mut self, preview: &TransferPreview) -> bool {
        for line in preview_lines(preview) {
            self.console.print(&line);
        }
        match self.console.read_line("Confirm transaction? (y/n): ").await {
            Some(answer) => is_yes(&answer),
            None => false,
        }
    }
}

/// Lines shown before the confirmation question.
pub fn preview_lines(preview: &TransferPreview) -> Vec<String> {
    let draft = &preview.draft;
    let mut lines = Vec::new();
    if preview.gas.is_fallback() {
        lines.push(format!(
            "Warning: gas estimation failed, using default gas limit {}",
            preview.gas.limit
        ));
    }
    lines.push(format!("Estimated gas cost: {} ETH", format_ether(preview.total_fee_wei)));
    lines.push(String::new());
    lines.push("Transaction Details:".to_string());
    lines.push(format!("From: {}", draft.from));
    lines.push(format!("To: {}", draft.to));
    lines.push(format!("Amount: {} ETH", format_ether(draft.value_wei)));
    lines.push(format!("Gas Limit: {}", draft.gas_limit));
    lines.push(format!("Gas Price: {} Gwei", format_gwei(draft.gas_price)));
    lines.push(format!("Nonce: {}", draft.nonce));
    lines.push(format!("Chain ID: {}", draft.chain_id));
    lines
}

fn show_outcome<C: Console>(console: &mut C, outcome: &TransferOutcome) {
    match outcome {
        TransferOutcome::Confirmed { receipt, .. } if receipt.status => {
            console.print("Transaction completed!");
            console.print(&format!("Transaction hash: {}", receipt.hash));
            if let Some(block) = receipt.block_number {
                console.print(&format!("Included in block {} (gas used {})", block, receipt.gas_used));
            }
        }
        TransferOutcome::Confirmed { receipt, .. } => {
            console.print("Transaction reverted!");
            console.print(&format!("Transaction hash: {}", receipt.hash));
        }
        TransferOutcome::Unconfirmed { hash, waited, .. } => {
            console.print(&format!(
                "Transaction {} not confirmed after {} seconds. It may still be mined; check it before sending again.",
                hash,
                waited.as_secs()
            ));
        }
        TransferOutcome::Cancelled => {
            console.print("Transaction cancelled");
        }
    }
}
