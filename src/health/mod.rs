//! Connection health subsystem.
//!
//! # Data Flow
//! ```text
//! supervisor.rs:
//!     Periodic timer (30s default)
//!     → RpcSession::is_alive()
//!     → on failure: RpcSession::reconnect() swaps the handle
//!     → failures logged, loop continues
//! ```
//!
//! # Design Decisions
//! - One supervisor per process, started after the first successful connect
//! - Stops only on the lifecycle shutdown broadcast
//! - Never surfaces errors to the foreground; queries fail on their own

pub mod supervisor;

pub use supervisor::{ConnectionSupervisor, SupervisorCheck};
