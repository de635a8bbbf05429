//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, multipliers >= 1.0)
//! - Check that the bridge threshold covers the bridged amount
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: HarvesterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::HarvesterConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `gas.gas_price_multiplier`.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &HarvesterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.chain.rpc_url.parse::<url::Url>().is_err() {
        errors.push(ValidationError::new("chain.rpc_url", "must be a valid URL"));
    }
    for (i, failover) in config.chain.failover_urls.iter().enumerate() {
        if failover.parse::<url::Url>().is_err() {
            errors.push(ValidationError::new(
                &format!("chain.failover_urls[{}]", i),
                "must be a valid URL",
            ));
        }
    }
    if config.chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("chain.rpc_timeout_secs", "must be greater than 0"));
    }
    if config.chain.receipt_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "chain.receipt_timeout_secs",
            "must be greater than 0",
        ));
    }
    if config.chain.confirmation_blocks == 0 {
        errors.push(ValidationError::new(
            "chain.confirmation_blocks",
            "must be at least 1",
        ));
    }

    if !(config.gas.gas_price_multiplier >= 1.0 && config.gas.gas_price_multiplier.is_finite()) {
        errors.push(ValidationError::new(
            "gas.gas_price_multiplier",
            "must be a finite value >= 1.0",
        ));
    }
    if !(config.gas.gas_limit_multiplier >= 1.0 && config.gas.gas_limit_multiplier.is_finite()) {
        errors.push(ValidationError::new(
            "gas.gas_limit_multiplier",
            "must be a finite value >= 1.0",
        ));
    }
    if config.gas.min_gas_price_wei == 0 {
        errors.push(ValidationError::new("gas.min_gas_price_wei", "must be greater than 0"));
    }
    if config.gas.default_gas_limit < 21_000 {
        errors.push(ValidationError::new(
            "gas.default_gas_limit",
            "must be at least 21000",
        ));
    }

    if config.faucet.enabled {
        if config.faucet.url.parse::<url::Url>().is_err() {
            errors.push(ValidationError::new("faucet.url", "must be a valid URL"));
        }
        if config.faucet.timeout_secs == 0 {
            errors.push(ValidationError::new("faucet.timeout_secs", "must be greater than 0"));
        }
    }

    if config.bridge.enabled {
        if config.bridge.amount.is_zero() {
            errors.push(ValidationError::new("bridge.amount", "must be greater than 0"));
        }
        if config.bridge.min_balance <= config.bridge.amount {
            errors.push(ValidationError::new(
                "bridge.min_balance",
                format!(
                    "must exceed bridge.amount ({}) to leave room for gas",
                    config.bridge.amount
                ),
            ));
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "must be a socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
