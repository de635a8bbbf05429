//! Transaction parameters and outcomes.
//!
//! # Responsibilities
//! - Describe the gas decision for one attempt, including where it came from
//! - Carry the result of a submission as data rather than as an error

use serde::Serialize;

/// Where a gas value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GasSource {
    /// Derived from a successful node query or estimate.
    Network,
    /// The node could not answer; a configured value was used.
    Fallback,
}

/// Gas price decision in wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasPrice {
    pub wei: u128,
    pub source: GasSource,
}

/// Gas limit decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasLimit {
    pub gas: u64,
    pub source: GasSource,
}

/// Gas parameters for a single transaction attempt. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GasPlan {
    pub gas_price_wei: u128,
    pub gas_limit: u64,
    pub price_source: GasSource,
    pub limit_source: GasSource,
}

impl GasPlan {
    pub fn new(price: GasPrice, limit: GasLimit) -> Self {
        Self {
            gas_price_wei: price.wei,
            gas_limit: limit.gas,
            price_source: price.source,
            limit_source: limit.source,
        }
    }

    /// Whether any part of the plan came from a fallback.
    pub fn used_fallback(&self) -> bool {
        self.price_source == GasSource::Fallback || self.limit_source == GasSource::Fallback
    }
}

/// Result of one submission attempt: a hash or an error, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransactionOutcome {
    Success { tx_hash: String },
    Failed { error: String },
}

impl TransactionOutcome {
    pub fn success(tx_hash: impl Into<String>) -> Self {
        Self::Success {
            tx_hash: tx_hash.into(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn tx_hash(&self) -> Option<&str> {
        match self {
            Self::Success { tx_hash } => Some(tx_hash),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failed { error } => Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_is_never_partial() {
        let ok = TransactionOutcome::success("0xABC123");
        assert!(ok.is_success());
        assert_eq!(ok.tx_hash(), Some("0xABC123"));
        assert_eq!(ok.error(), None);

        let failed = TransactionOutcome::failed("boom");
        assert!(!failed.is_success());
        assert_eq!(failed.tx_hash(), None);
        assert_eq!(failed.error(), Some("boom"));
    }

    #[test]
    fn test_outcome_json_shape() {
        let json = serde_json::to_value(TransactionOutcome::success("0x1")).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["tx_hash"], "0x1");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_plan_fallback_flag() {
        let plan = GasPlan::new(
            GasPrice { wei: 1, source: GasSource::Network },
            GasLimit { gas: 21_000, source: GasSource::Fallback },
        );
        assert!(plan.used_fallback());
    }
}
