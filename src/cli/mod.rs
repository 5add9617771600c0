//! Command-line surface.
//!
//! # Flow
//! ```text
//! args.rs (flags) → shell.rs: banner → network menu → connect (retry prompt)
//!     → spawn supervisor → menu loop (balance / transfer / exit)
//! ```
//! All terminal I/O goes through the `Console` trait in prompt.rs.

pub mod args;
pub mod prompt;
pub mod shell;

pub use args::Cli;
pub use prompt::{Console, StdConsole};
pub use shell::{Shell, ShellExit};
