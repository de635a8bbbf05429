//! The round loop.
//!
//! # Data Flow
//! ```text
//! round n:
//!     for each account (in key-file order):
//!         balance → faucet → pause → reward → pause → bridge → pause → next wallet
//!     countdown to round n+1
//! ```
//!
//! Accounts are strictly sequential. Each account slice runs behind a
//! panic boundary, so one misbehaving account cannot end the round. Every
//! wait goes through the [`Pacer`] and therefore observes shutdown.

pub mod pacer;
pub mod report;

use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tracing::Instrument;

use crate::blockchain::gateway::ChainGateway;
use crate::blockchain::wallet::Account;
use crate::config::schema::ScheduleConfig;
use crate::observability::metrics;
use crate::observability::redact::mask_tx_hash;
use crate::services::{
    ActionOutcome, ActionResult, BridgeService, FaucetClient, RewardService, SkipReason,
};

pub use pacer::{Pace, Pacer};
pub use report::{AccountOutcome, AccountReport, OutcomeTotals, RoundReport, RunSummary};

/// The three per-account actions.
#[derive(Debug, Clone)]
pub struct Services {
    pub faucet: FaucetClient,
    pub reward: RewardService,
    pub bridge: BridgeService,
}

pub struct Orchestrator {
    accounts: Vec<Account>,
    gateway: ChainGateway,
    services: Services,
    schedule: ScheduleConfig,
    pacer: Pacer,
}

/// Shutdown observed inside an account slice.
struct Interrupted;

impl Orchestrator {
    pub fn new(
        accounts: Vec<Account>,
        gateway: ChainGateway,
        services: Services,
        schedule: ScheduleConfig,
        pacer: Pacer,
    ) -> Self {
        Self {
            accounts,
            gateway,
            services,
            schedule,
            pacer,
        }
    }

    /// Run rounds until `max_rounds` is reached or shutdown is signalled.
    pub async fn run(mut self) -> RunSummary {
        let mut summary = RunSummary::default();
        let mut round: u64 = 1;

        tracing::info!(
            wallets = self.accounts.len(),
            max_rounds = ?self.schedule.max_rounds,
            "Harvester starting"
        );

        loop {
            let report = self.run_round(round).await;
            for account in &report.accounts {
                summary.totals.record_account(&account.outcome);
            }
            let interrupted = report.interrupted;
            summary.last_round = Some(report);

            if interrupted {
                summary.stopped_by_shutdown = true;
                break;
            }

            summary.rounds_completed = round;
            metrics::record_round_completed();
            tracing::info!(
                round,
                succeeded = summary.totals.succeeded,
                failed = summary.totals.failed,
                skipped = summary.totals.skipped,
                panicked = summary.totals.panicked,
                "Round complete"
            );

            if self.schedule.max_rounds.is_some_and(|max| round >= max) {
                break;
            }

            tracing::info!(
                wait_secs = self.schedule.between_rounds_secs,
                "All wallets processed, waiting for next round"
            );
            if self
                .pacer
                .countdown("Next round in", self.schedule.between_rounds_secs)
                .await
                == Pace::Cancelled
            {
                summary.stopped_by_shutdown = true;
                break;
            }
            round += 1;
        }

        tracing::info!(
            rounds = summary.rounds_completed,
            shutdown = summary.stopped_by_shutdown,
            "Harvester stopped"
        );
        summary
    }

    /// One pass over every account. Stops early only on shutdown.
    pub async fn run_round(&mut self, round: u64) -> RoundReport {
        tracing::info!(round, "Starting round");
        let mut report = RoundReport {
            round,
            accounts: Vec::with_capacity(self.accounts.len()),
            interrupted: false,
        };
        let total = self.accounts.len();

        for index in 0..total {
            let account = self.accounts[index].clone();
            let span = tracing::info_span!(
                "wallet",
                index = index + 1,
                total,
                address = %account.masked_address()
            );

            let slice = AssertUnwindSafe(self.process_account(&account))
                .catch_unwind()
                .instrument(span)
                .await;
            let outcome = match slice {
                Ok(Ok(result)) => AccountOutcome::Finished(result),
                Ok(Err(Interrupted)) => AccountOutcome::Interrupted,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::error!(
                        address = %account.masked_address(),
                        panic = %message,
                        "Wallet processing panicked, moving on"
                    );
                    AccountOutcome::Panicked(message)
                }
            };
            report.interrupted = outcome == AccountOutcome::Interrupted;
            report.accounts.push(AccountReport {
                address: account.address(),
                outcome,
            });
            if report.interrupted {
                break;
            }

            // The gap follows every wallet, the last one included
            let gap = Duration::from_millis(self.schedule.between_wallets_ms);
            if self.pacer.sleep(gap).await == Pace::Cancelled {
                report.interrupted = true;
                break;
            }
        }

        report
    }

    async fn process_account(&mut self, account: &Account) -> Result<ActionResult, Interrupted> {
        tracing::info!("Processing wallet");
        let balance = self.gateway.get_balance(account.address()).await;
        tracing::info!(balance = %balance, "Wallet balance");

        let faucet = if self.services.faucet.is_enabled() {
            tracing::info!("Requesting faucet grant");
            ActionOutcome::Completed(self.services.faucet.claim(account.address()).await)
        } else {
            ActionOutcome::Skipped(SkipReason::Disabled)
        };
        report_step("faucet", &faucet);
        self.pause("Waiting after faucet", self.schedule.pause_after_faucet_secs)
            .await?;

        let reward = self.services.reward.claim(account).await;
        report_step("reward", &reward);
        self.pause("Waiting after reward", self.schedule.pause_after_reward_secs)
            .await?;

        let bridge = self.services.bridge.bridge(account).await;
        report_step("bridge", &bridge);
        self.pause("Waiting after bridge", self.schedule.pause_after_bridge_secs)
            .await?;

        Ok(ActionResult {
            faucet,
            reward,
            bridge,
        })
    }

    async fn pause(&mut self, label: &str, secs: u64) -> Result<(), Interrupted> {
        match self.pacer.countdown(label, secs).await {
            Pace::Elapsed => Ok(()),
            Pace::Cancelled => Err(Interrupted),
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("accounts", &self.accounts.len())
            .field("schedule", &self.schedule)
            .finish_non_exhaustive()
    }
}

fn report_step(action: &'static str, outcome: &ActionOutcome) {
    metrics::record_action(action, outcome.label());
    match outcome {
        ActionOutcome::Completed(o) if o.is_success() => tracing::info!(
            action,
            tx_hash = %mask_tx_hash(o.tx_hash().unwrap_or_default()),
            "Step succeeded"
        ),
        ActionOutcome::Completed(o) => tracing::error!(
            action,
            error = o.error().unwrap_or_default(),
            "Step failed"
        ),
        ActionOutcome::Skipped(reason) => {
            tracing::warn!(action, reason = %reason, "Step skipped")
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
