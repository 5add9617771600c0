//! Ledger Wallet (v1)
//!
//! An interactive terminal wallet for an Ethereum-compatible JSON-RPC node.
//!
//! # Architecture Overview
//!
//! ```text
//!     ┌──────────────────────────────────────────────────────────────┐
//!     │                        LEDGER WALLET                          │
//!     │                                                               │
//!     │  ┌─────────┐    ┌──────────────────┐    ┌────────────────┐    │
//!     │  │   cli   │───▶│ TransferPipeline │───▶│   RpcSession   │────┼──▶ Ledger
//!     │  │  shell  │───▶│  (transaction)   │    │ ArcSwap<Session│    │    node
//!     │  └─────────┘    └──────────────────┘    └───────▲────────┘    │
//!     │                                                 │ swap        │
//!     │                                        ┌────────┴─────────┐   │
//!     │                                        │ConnectionSupervisor│  │
//!     │                                        │  (every 30s)     │   │
//!     │                                        └──────────────────┘   │
//!     │                                                               │
//!     │   Cross-cutting: config · observability · lifecycle           │
//!     └──────────────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::sync::Arc;

use ledger_wallet::blockchain::HttpConnector;
use ledger_wallet::cli::{Cli, Shell, ShellExit, StdConsole};
use ledger_wallet::config::load_or_default;
use ledger_wallet::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_or_default(cli.config.as_deref())?;

    let filter = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.observability.log_level.clone());
    logging::init_logging(&filter);

    tracing::info!(
        networks = config.networks.endpoints.len(),
        supervisor_interval_secs = config.supervisor.interval_secs,
        request_timeout_secs = config.rpc.request_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shell = Shell::new(config, Arc::new(HttpConnector), cli.network);
    let mut console = StdConsole::new();

    let exit = tokio::select! {
        exit = shell.run(&mut console) => exit,
        _ = tokio::signal::ctrl_c() => {
            println!();
            println!("Program interrupted by user. Goodbye!");
            ShellExit::Completed
        }
    };

    tracing::info!(exit = ?exit, "Shutdown complete");
    match exit.code() {
        0 => Ok(()),
        code => std::process::exit(code),
    }
}
