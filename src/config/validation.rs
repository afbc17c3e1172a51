//! Semantic configuration checks.
//!
//! Serde catches malformed TOML; this pass catches configs that parse but
//! cannot run: an empty target pool, unparseable addresses, zero weights or
//! zero health-check intervals.

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{ProxyConfig, Strategy};

/// A single semantic configuration error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no targets configured")]
    NoTargets,

    #[error("target address `{address}` is not a valid socket address")]
    InvalidAddress { address: String },

    #[error("target `{address}` has weight {weight}; weights must be positive")]
    InvalidWeight { address: String, weight: u32 },

    #[error("listener bind address `{address}` is not a valid socket address")]
    InvalidBindAddress { address: String },

    #[error("health check period must be positive")]
    ZeroHealthPeriod,

    #[error("health check timeout must be positive")]
    ZeroHealthTimeout,
}

/// Validate a parsed configuration, collecting every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress {
            address: config.listener.bind_address.clone(),
        });
    }

    if config.targets.is_empty() {
        errors.push(ValidationError::NoTargets);
    }

    for target in &config.targets {
        if target.address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidAddress {
                address: target.address.clone(),
            });
        }
        if config.strategy == Strategy::WeightedRoundRobin && target.weight == 0 {
            errors.push(ValidationError::InvalidWeight {
                address: target.address.clone(),
                weight: target.weight,
            });
        }
    }

    if config.health_check.period_secs == 0 {
        errors.push(ValidationError::ZeroHealthPeriod);
    }
    if config.health_check.timeout_secs == 0 {
        errors.push(ValidationError::ZeroHealthTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
