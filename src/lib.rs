//! Interactive ledger wallet library

pub mod blockchain;
pub mod cli;
pub mod config;
pub mod health;
pub mod lifecycle;
pub mod observability;

pub use blockchain::{RpcSession, TransferPipeline};
pub use config::schema::WalletConfig;
pub use health::ConnectionSupervisor;
pub use lifecycle::Shutdown;
