//! Connection supervision.
//!
//! # Responsibilities
//! - Periodically probe the RPC session
//! - Reconnect and swap the handle when the probe fails
//! - Log reconnect failures without stopping

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::blockchain::session::RpcSession;
use crate::config::SupervisorConfig;
use crate::observability::metrics;

/// Result of one supervision cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorCheck {
    Healthy,
    Reconnected { generation: u64 },
    ReconnectFailed { consecutive_failures: u32 },
}

pub struct ConnectionSupervisor {
    session: Arc<RpcSession>,
    interval: Duration,
    consecutive_failures: u32,
}

impl ConnectionSupervisor {
    pub fn new(session: Arc<RpcSession>, config: &SupervisorConfig) -> Self {
        Self::with_interval(session, Duration::from_secs(config.interval_secs))
    }

    pub fn with_interval(session: Arc<RpcSession>, interval: Duration) -> Self {
        Self {
            session,
            interval,
            consecutive_failures: 0,
        }
    }

    /// Spawn the supervision loop on the current runtime.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Check every interval until the shutdown signal fires.
    ///
    /// The first check happens one full interval after start; the session
    /// was just verified by `connect`.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            rpc_url = %self.session.endpoint().rpc_url,
            "Connection supervisor starting"
        );

        let start = time::Instant::now() + self.interval;
        let mut ticker = time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // A check can take liveness + connect timeouts; shutdown must not wait for it
                    tokio::select! {
                        _ = self.check_once() => {}
                        _ = shutdown.recv() => {
                            tracing::info!("Connection supervisor received shutdown signal during check, exiting loop");
                            break;
                        }
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Connection supervisor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// One liveness check, reconnecting if needed.
    pub async fn check_once(&mut self) -> SupervisorCheck {
        if self.session.is_alive().await {
            if self.consecutive_failures > 0 {
                tracing::info!(
                    failures = self.consecutive_failures,
                    "Ledger node reachable again"
                );
            }
            self.consecutive_failures = 0;
            return SupervisorCheck::Healthy;
        }

        tracing::warn!(
            rpc_url = %self.session.endpoint().rpc_url,
            "Network connection lost, attempting to reconnect"
        );

        match self.session.reconnect().await {
            Ok(generation) => {
                metrics::record_reconnect(true);
                self.consecutive_failures = 0;
                tracing::info!(generation, "Reconnected to ledger node");
                SupervisorCheck::Reconnected { generation }
            }
            Err(e) => {
                metrics::record_reconnect(false);
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                tracing::error!(
                    error = %e,
                    consecutive_failures = self.consecutive_failures,
                    "Reconnect failed, will retry next interval"
                );
                SupervisorCheck::ReconnectFailed {
                    consecutive_failures: self.consecutive_failures,
                }
            }
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}
