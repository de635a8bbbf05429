//! Protocol reward claims.
//!
//! A claim goes through three gates before anything is signed: the service
//! must be enabled, the balance must cover gas, and a simulated
//! `claimReward()` must not revert. Only then is a gas plan drawn up and the
//! transaction sent.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;

use crate::blockchain::contracts::IRewards;
use crate::blockchain::gateway::{CallSpec, ChainGateway, ProbeResult};
use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::blockchain::wallet::Account;
use crate::config::schema::RewardConfig;
use crate::services::outcome::{ActionOutcome, SkipReason};

const NOT_REGISTERED_MARKER: &str = "user not registered";

/// Claim state for one address, as read from the rewards contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimStatus {
    pub epoch: U256,
    pub genesis_claimed: bool,
    pub epoch_claimed: bool,
    pub buffer: U256,
}

/// Map a probe revert reason to a skip decision.
pub fn classify_revert(reason: &str) -> SkipReason {
    if reason.to_lowercase().contains(NOT_REGISTERED_MARKER) {
        SkipReason::NotRegistered
    } else {
        SkipReason::NotAvailable(reason.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct RewardService {
    gateway: ChainGateway,
    config: RewardConfig,
}

impl RewardService {
    pub fn new(gateway: ChainGateway, config: RewardConfig) -> Self {
        Self { gateway, config }
    }

    pub async fn claim(&self, account: &Account) -> ActionOutcome {
        if !self.config.enabled {
            return ActionOutcome::Skipped(SkipReason::Disabled);
        }

        let balance = self.gateway.get_balance(account.address()).await;
        if balance < self.config.min_balance {
            tracing::warn!(
                balance = %balance,
                required = %self.config.min_balance,
                "Insufficient balance for reward claim"
            );
            return ActionOutcome::Skipped(SkipReason::InsufficientBalance {
                balance,
                required: self.config.min_balance,
            });
        }

        let call = CallSpec::new(
            account.address(),
            self.config.contract,
            IRewards::claimRewardCall {}.abi_encode(),
        );

        match self.gateway.probe(&call).await {
            ProbeResult::Callable(_) => {}
            ProbeResult::Reverted(reason) => {
                let skip = classify_revert(&reason);
                tracing::warn!(reason = %skip, "Reward claim would revert, skipping");
                return ActionOutcome::Skipped(skip);
            }
            ProbeResult::Inconclusive(error) => {
                tracing::debug!(error = %error, "Reward probe inconclusive, attempting claim");
            }
        }

        let plan = self.gateway.plan_gas(&call).await;
        tracing::info!("Claiming reward");
        self.gateway.build_and_send(&call, &plan, account).await.into()
    }

    /// Epoch and claim flags for `address`. Read-only.
    pub async fn claim_status(&self, address: Address) -> BlockchainResult<ClaimStatus> {
        let epoch = self.view(IRewards::currentEpochCall {}).await?;
        let genesis_claimed = self
            .view(IRewards::userGenesisClaimStatusCall { user: address })
            .await?;
        let claim = self
            .view(IRewards::userClaimStatusCall {
                user: address,
                epochID: epoch,
            })
            .await?;

        Ok(ClaimStatus {
            epoch,
            genesis_claimed,
            epoch_claimed: claim.claimStatus,
            buffer: claim.buffer,
        })
    }

    async fn view<C: SolCall>(&self, call: C) -> BlockchainResult<C::Return> {
        let request = TransactionRequest::default()
            .with_to(self.config.contract)
            .with_input(call.abi_encode());
        let output = self.gateway.rpc().call(request).await?;
        C::abi_decode_returns(&output).map_err(|e| BlockchainError::Rpc(e.to_string()))
    }
}
