//! What a run produced, for the caller and for the end-of-round log line.

use alloy::primitives::Address;

use crate::services::outcome::{ActionOutcome, ActionResult};

/// How one account's slice of a round ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountOutcome {
    Finished(ActionResult),
    /// A panic was caught at the account boundary.
    Panicked(String),
    /// Shutdown arrived during one of the account's pauses.
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountReport {
    pub address: Address,
    pub outcome: AccountOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundReport {
    pub round: u64,
    pub accounts: Vec<AccountReport>,
    /// Shutdown cut the round short.
    pub interrupted: bool,
}

/// Step counters accumulated across rounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeTotals {
    pub succeeded: u64,
    pub failed: u64,
    pub skipped: u64,
    pub panicked: u64,
}

impl OutcomeTotals {
    pub fn record_step(&mut self, outcome: &ActionOutcome) {
        match outcome {
            o if o.is_success() => self.succeeded += 1,
            o if o.is_skipped() => self.skipped += 1,
            _ => self.failed += 1,
        }
    }

    pub fn record_account(&mut self, outcome: &AccountOutcome) {
        match outcome {
            AccountOutcome::Finished(result) => {
                self.record_step(&result.faucet);
                self.record_step(&result.reward);
                self.record_step(&result.bridge);
            }
            AccountOutcome::Panicked(_) => self.panicked += 1,
            AccountOutcome::Interrupted => {}
        }
    }
}

/// Returned when the run loop stops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub rounds_completed: u64,
    pub stopped_by_shutdown: bool,
    pub totals: OutcomeTotals,
    pub last_round: Option<RoundReport>,
}
