//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! session / supervisor / pipeline produce:
//!     → logging.rs (structured log events on stderr)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → terminal (warnings, reconnect notices)
//!     → Metrics endpoint (Prometheus scrape, opt-in)
//! ```

pub mod logging;
pub mod metrics;
