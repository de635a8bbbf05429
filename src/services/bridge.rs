//! Native-asset bridge transfers.

use alloy::primitives::{Address, Bytes};
use alloy::sol_types::SolCall;

use crate::blockchain::contracts::IBridge;
use crate::blockchain::gateway::{CallSpec, ChainGateway};
use crate::blockchain::wallet::Account;
use crate::config::schema::BridgeConfig;
use crate::observability::redact::mask_address;
use crate::services::outcome::{ActionOutcome, SkipReason};

#[derive(Debug, Clone)]
pub struct BridgeService {
    gateway: ChainGateway,
    config: BridgeConfig,
}

impl BridgeService {
    pub fn new(gateway: ChainGateway, config: BridgeConfig) -> Self {
        Self { gateway, config }
    }

    /// Bridge `amount` to `destination`, attaching the same amount as value.
    pub fn bridge_call(&self, from: Address) -> CallSpec {
        let destination = self.config.destination_address.unwrap_or(from);
        let data = IBridge::bridgeAssetCall {
            destinationNetwork: self.config.destination_network,
            destinationAddress: destination,
            amount: self.config.amount.wei(),
            token: self.config.token,
            forceUpdateGlobalExitRoot: self.config.force_update_global_exit_root,
            permitData: Bytes::new(),
        }
        .abi_encode();

        CallSpec::new(from, self.config.contract, data).with_value(self.config.amount.wei())
    }

    /// Balance gate then submit. There is no availability probe here.
    pub async fn bridge(&self, account: &Account) -> ActionOutcome {
        if !self.config.enabled {
            return ActionOutcome::Skipped(SkipReason::Disabled);
        }

        let balance = self.gateway.get_balance(account.address()).await;
        if balance < self.config.min_balance {
            tracing::warn!(
                balance = %balance,
                required = %self.config.min_balance,
                "Insufficient balance for bridge"
            );
            return ActionOutcome::Skipped(SkipReason::InsufficientBalance {
                balance,
                required: self.config.min_balance,
            });
        }

        let call = self.bridge_call(account.address());
        let plan = self.gateway.plan_gas(&call).await;

        tracing::info!(
            amount = %self.config.amount,
            destination_network = self.config.destination_network,
            destination = %mask_address(
                &self.config.destination_address.unwrap_or(account.address()).to_string()
            ),
            "Bridging assets"
        );

        self.gateway.build_and_send(&call, &plan, account).await.into()
    }
}
