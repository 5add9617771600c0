use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "ledger-wallet")]
#[command(about = "Query balances and send native transfers through a ledger JSON-RPC node", long_about = None)]
pub struct Cli {
    /// TOML configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Network id to connect to, skipping the network menu
    #[arg(short, long)]
    pub network: Option<String>,

    /// Log filter, overrides the configured level (RUST_LOG still wins)
    #[arg(long)]
    pub log_level: Option<String>,
}
