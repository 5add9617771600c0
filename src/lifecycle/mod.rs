//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → select network → connect → spawn supervisor → menu loop
//!
//! Shutdown (shutdown.rs):
//!     Exit chosen / Ctrl-C → trigger broadcast → supervisor exits → process ends
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
