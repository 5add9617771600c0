//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the wallet.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the wallet CLI.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WalletConfig {
    /// Ledger nodes the user can pick from at startup.
    pub networks: NetworksConfig,

    /// RPC timeouts.
    pub rpc: RpcConfig,

    /// Connection supervisor settings.
    pub supervisor: SupervisorConfig,

    /// Gas limit policy.
    pub gas: GasConfig,

    /// Receipt polling.
    pub confirmation: ConfirmationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// A ledger node the wallet can connect to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NetworkEndpoint {
    /// Menu key (e.g. "1").
    pub id: String,

    /// Human readable name shown in the network menu.
    pub display_name: String,

    /// JSON-RPC endpoint URL.
    pub rpc_url: String,
}

/// The enumerated set of selectable networks.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworksConfig {
    pub endpoints: Vec<NetworkEndpoint>,
}

impl Default for NetworksConfig {
    fn default() -> Self {
        Self {
            endpoints: vec![NetworkEndpoint {
                id: "1".to_string(),
                display_name: "Local zkSync".to_string(),
                rpc_url: "http://localhost:3050".to_string(),
            }],
        }
    }
}

impl NetworksConfig {
    /// Look up an endpoint by its menu id.
    pub fn find(&self, id: &str) -> Option<&NetworkEndpoint> {
        self.endpoints.iter().find(|e| e.id == id)
    }
}

/// RPC timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Timeout for opening a session (including the reachability probe).
    pub connect_timeout_secs: u64,

    /// Timeout applied to every individual RPC call.
    pub request_timeout_secs: u64,

    /// Timeout for the liveness probe used by the supervisor.
    pub liveness_timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            request_timeout_secs: 10,
            liveness_timeout_secs: 3,
        }
    }
}

impl RpcConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn liveness_timeout(&self) -> Duration {
        Duration::from_secs(self.liveness_timeout_secs)
    }
}

/// Connection supervisor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Seconds between liveness checks.
    pub interval_secs: u64,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

/// Gas limit policy for transfers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GasConfig {
    /// Limit used when the node cannot estimate gas.
    pub default_limit: u64,

    /// Safety buffer applied to estimates, as a fraction (6/5 = 1.2).
    pub buffer_numerator: u64,
    pub buffer_denominator: u64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            default_limit: 3_000_000,
            buffer_numerator: 6,
            buffer_denominator: 5,
        }
    }
}

/// Receipt polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Seconds between receipt queries.
    pub poll_interval_secs: u64,

    /// Give up waiting (the transaction stays unconfirmed) after this many seconds.
    pub timeout_secs: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 2,
            timeout_secs: 120,
        }
    }
}

impl ConfirmationConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter (trace, debug, info, warn, error or a full EnvFilter directive).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
