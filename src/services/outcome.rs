//! Per-step decisions and the per-account result they roll up into.

use std::fmt;

use crate::blockchain::transaction::TransactionOutcome;
use crate::blockchain::types::Ether;

/// Why a step was not attempted. Skips are decisions, not failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    InsufficientBalance { balance: Ether, required: Ether },
    /// The simulated call reverted: nothing to claim right now.
    NotAvailable(String),
    /// The contract does not know this account.
    NotRegistered,
    /// Turned off in configuration.
    Disabled,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InsufficientBalance { balance, required } => {
                write!(f, "insufficient balance: {} < {}", balance, required)
            }
            SkipReason::NotAvailable(reason) => {
                write!(f, "reward not available or already claimed ({})", reason)
            }
            SkipReason::NotRegistered => f.write_str("user not registered"),
            SkipReason::Disabled => f.write_str("disabled"),
        }
    }
}

/// Terminal state of one step for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed(TransactionOutcome),
    Skipped(SkipReason),
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Completed(o) if o.is_success())
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ActionOutcome::Skipped(_))
    }

    /// Label used for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ActionOutcome::Completed(TransactionOutcome::Success { .. }) => "success",
            ActionOutcome::Completed(TransactionOutcome::Failed { .. }) => "failed",
            ActionOutcome::Skipped(_) => "skipped",
        }
    }
}

impl From<TransactionOutcome> for ActionOutcome {
    fn from(outcome: TransactionOutcome) -> Self {
        ActionOutcome::Completed(outcome)
    }
}

/// Everything that happened to one account in one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResult {
    pub faucet: ActionOutcome,
    pub reward: ActionOutcome,
    pub bridge: ActionOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(
            ActionOutcome::from(TransactionOutcome::success("0x1")).label(),
            "success"
        );
        assert_eq!(
            ActionOutcome::from(TransactionOutcome::failed("x")).label(),
            "failed"
        );
        assert_eq!(ActionOutcome::Skipped(SkipReason::Disabled).label(), "skipped");
    }

    #[test]
    fn test_skip_reason_display() {
        let reason = SkipReason::InsufficientBalance {
            balance: "0.0005".parse().unwrap(),
            required: "0.001".parse().unwrap(),
        };
        assert_eq!(reason.to_string(), "insufficient balance: 0.0005 < 0.001");
    }
}
