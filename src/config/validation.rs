//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that network ids are unique and URLs parse
//! - Validate value ranges (timeouts > 0, gas buffer >= 1)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WalletConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use thiserror::Error;

use crate::config::schema::WalletConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no networks configured")]
    NoNetworks,

    #[error("network id must not be empty")]
    EmptyNetworkId,

    #[error("duplicate network id '{0}'")]
    DuplicateNetworkId(String),

    #[error("network '{id}' has invalid rpc_url '{url}': {reason}")]
    InvalidRpcUrl { id: String, url: String, reason: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("gas buffer {numerator}/{denominator} must be at least 1")]
    GasBufferBelowOne { numerator: u64, denominator: u64 },

    #[error("invalid metrics_address '{0}'")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &WalletConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.networks.endpoints.is_empty() {
        errors.push(ValidationError::NoNetworks);
    }

    let mut seen = HashSet::new();
    for endpoint in &config.networks.endpoints {
        if endpoint.id.trim().is_empty() {
            errors.push(ValidationError::EmptyNetworkId);
        } else if !seen.insert(endpoint.id.as_str()) {
            errors.push(ValidationError::DuplicateNetworkId(endpoint.id.clone()));
        }

        match url::Url::parse(&endpoint.rpc_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ValidationError::InvalidRpcUrl {
                id: endpoint.id.clone(),
                url: endpoint.rpc_url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            }),
            Err(e) => errors.push(ValidationError::InvalidRpcUrl {
                id: endpoint.id.clone(),
                url: endpoint.rpc_url.clone(),
                reason: e.to_string(),
            }),
        }
    }

    let non_zero = [
        ("rpc.connect_timeout_secs", config.rpc.connect_timeout_secs),
        ("rpc.request_timeout_secs", config.rpc.request_timeout_secs),
        ("rpc.liveness_timeout_secs", config.rpc.liveness_timeout_secs),
        ("supervisor.interval_secs", config.supervisor.interval_secs),
        ("gas.default_limit", config.gas.default_limit),
        ("gas.buffer_denominator", config.gas.buffer_denominator),
        ("confirmation.poll_interval_secs", config.confirmation.poll_interval_secs),
        ("confirmation.timeout_secs", config.confirmation.timeout_secs),
    ];
    for (field, value) in non_zero {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    let gas = &config.gas;
    if gas.buffer_denominator != 0 && gas.buffer_numerator < gas.buffer_denominator {
        errors.push(ValidationError::GasBufferBelowOne {
            numerator: gas.buffer_numerator,
            denominator: gas.buffer_denominator,
        });
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
