//! Gas policy, offline signing and submission on top of a [`NodeRpc`].
//!
//! # Responsibilities
//! - Balance lookups that degrade to zero instead of failing
//! - Safe gas price: floor + multiplier, floor alone on failure
//! - Gas limit: scaled estimate, configured default on failure
//! - Build, sign, broadcast and wait for inclusion; failures become data
//!
//! The gateway never retries. A failed step is reported to the caller,
//! whose cadence decides when the next attempt happens.

use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::utils::format_units;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::rpc::NodeRpc;
use crate::blockchain::transaction::{GasLimit, GasPlan, GasPrice, GasSource, TransactionOutcome};
use crate::blockchain::types::{BlockchainError, BlockchainResult, ConfirmationStatus, Ether};
use crate::blockchain::wallet::Account;
use crate::config::schema::{ChainConfig, GasConfig};
use crate::observability::metrics;
use crate::observability::redact::mask_tx_hash;

/// A contract call, before gas and nonce are decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSpec {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

impl CallSpec {
    pub fn new(from: Address, to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            from,
            to,
            data: data.into(),
            value: U256::ZERO,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    fn to_request(&self) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(self.from)
            .with_to(self.to)
            .with_input(self.data.clone())
            .with_value(self.value)
    }
}

/// Result of a read-only simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    /// The call would succeed.
    Callable(Bytes),
    /// The EVM rejected the call.
    Reverted(String),
    /// The simulation itself failed (transport, node quirks).
    Inconclusive(String),
}

/// Receipt waiting parameters.
#[derive(Debug, Clone)]
pub struct ConfirmationPolicy {
    pub required_blocks: u32,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl From<&ChainConfig> for ConfirmationPolicy {
    fn from(config: &ChainConfig) -> Self {
        Self {
            required_blocks: config.confirmation_blocks.max(1),
            timeout: Duration::from_secs(config.receipt_timeout_secs),
            poll_interval: Duration::from_millis(config.receipt_poll_interval_ms),
        }
    }
}

/// `floor(max(observed, min) × multiplier)`, never below `min`.
pub fn apply_gas_price_policy(observed: u128, min: u128, multiplier: f64) -> u128 {
    let base = observed.max(min);
    let scaled = (base as f64 * multiplier).floor();
    // f64 → u128 saturates, so an absurd multiplier cannot wrap
    (scaled as u128).max(min)
}

/// `floor(estimate × multiplier)`, never below the estimate itself.
pub fn apply_gas_limit_policy(estimate: u64, multiplier: f64) -> u64 {
    ((estimate as f64 * multiplier).floor() as u64).max(estimate)
}

/// Render wei as gwei for log lines.
pub fn format_gwei(wei: u128) -> String {
    format_units(U256::from(wei), "gwei").unwrap_or_else(|_| format!("{} wei", wei))
}

/// Chain access with safety margins for one node endpoint.
#[derive(Clone)]
pub struct ChainGateway {
    rpc: Arc<dyn NodeRpc>,
    gas: GasConfig,
    chain_id: u64,
    confirmation: ConfirmationPolicy,
}

impl ChainGateway {
    pub fn new(
        rpc: Arc<dyn NodeRpc>,
        gas: GasConfig,
        chain_id: u64,
        confirmation: ConfirmationPolicy,
    ) -> Self {
        Self {
            rpc,
            gas,
            chain_id,
            confirmation,
        }
    }

    /// Connect to the configured endpoints and settle the chain id.
    ///
    /// Fails when the node cannot be reached or reports an unexpected chain.
    pub async fn connect(chain: &ChainConfig, gas: &GasConfig) -> BlockchainResult<Self> {
        let client = BlockchainClient::new(chain.clone())?;
        let chain_id = client.resolve_chain_id().await?;
        tracing::info!(chain_id = chain_id.0, "Connected to node");
        Ok(Self::new(
            Arc::new(client),
            gas.clone(),
            chain_id.0,
            ConfirmationPolicy::from(chain),
        ))
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Raw node access for read-only queries.
    pub fn rpc(&self) -> &dyn NodeRpc {
        self.rpc.as_ref()
    }

    /// Native balance. An RPC failure reads as zero ("unknown / insufficient").
    pub async fn get_balance(&self, address: Address) -> Ether {
        match self.rpc.get_balance(address).await {
            Ok(wei) => Ether::from_wei(wei),
            Err(e) => {
                tracing::warn!(error = %e, "Balance query failed, treating balance as zero");
                Ether::ZERO
            }
        }
    }

    /// Network gas price with the configured floor and multiplier applied.
    pub async fn safe_gas_price(&self) -> GasPrice {
        let min = u128::from(self.gas.min_gas_price_wei);
        match self.rpc.get_gas_price().await {
            Ok(observed) => GasPrice {
                wei: apply_gas_price_policy(observed, min, self.gas.gas_price_multiplier),
                source: GasSource::Network,
            },
            Err(e) => {
                tracing::warn!(
                    fallback = "gas_price",
                    min_gas_price_wei = self.gas.min_gas_price_wei,
                    error = %e,
                    "Gas price query failed, using configured minimum"
                );
                metrics::record_gas_fallback("gas_price");
                GasPrice {
                    wei: min,
                    source: GasSource::Fallback,
                }
            }
        }
    }

    /// Scaled gas estimate for `call`, or the configured default.
    pub async fn estimate_gas(&self, call: &CallSpec) -> GasLimit {
        match self.rpc.estimate_gas(call.to_request()).await {
            Ok(estimate) => GasLimit {
                gas: apply_gas_limit_policy(estimate, self.gas.gas_limit_multiplier),
                source: GasSource::Network,
            },
            Err(e) => {
                tracing::warn!(
                    fallback = "gas_limit",
                    default_gas_limit = self.gas.default_gas_limit,
                    error = %e,
                    "Gas estimation failed, using default value"
                );
                metrics::record_gas_fallback("gas_limit");
                GasLimit {
                    gas: self.gas.default_gas_limit,
                    source: GasSource::Fallback,
                }
            }
        }
    }

    /// Fresh price and limit for one transaction attempt.
    pub async fn plan_gas(&self, call: &CallSpec) -> GasPlan {
        let price = self.safe_gas_price().await;
        let limit = self.estimate_gas(call).await;
        GasPlan::new(price, limit)
    }

    /// Simulate `call` without broadcasting anything.
    pub async fn probe(&self, call: &CallSpec) -> ProbeResult {
        match self.rpc.call(call.to_request()).await {
            Ok(output) => ProbeResult::Callable(output),
            Err(BlockchainError::Reverted(reason)) => ProbeResult::Reverted(reason),
            Err(e) => ProbeResult::Inconclusive(e.to_string()),
        }
    }

    /// Fetch the nonce, sign offline, broadcast and wait for inclusion.
    ///
    /// Never fails: every error is returned as [`TransactionOutcome::Failed`].
    pub async fn build_and_send(
        &self,
        call: &CallSpec,
        plan: &GasPlan,
        account: &Account,
    ) -> TransactionOutcome {
        match self.try_build_and_send(call, plan, account).await {
            Ok(tx_hash) => TransactionOutcome::success(tx_hash.to_string()),
            Err(e) => TransactionOutcome::failed(e.to_string()),
        }
    }

    async fn try_build_and_send(
        &self,
        call: &CallSpec,
        plan: &GasPlan,
        account: &Account,
    ) -> BlockchainResult<TxHash> {
        let nonce = self.rpc.get_transaction_count(account.address()).await?;

        tracing::info!(
            gas_price_gwei = %format_gwei(plan.gas_price_wei),
            gas_limit = plan.gas_limit,
            nonce,
            "Transaction details"
        );

        let request = call
            .to_request()
            .with_from(account.address())
            .with_nonce(nonce)
            .with_chain_id(self.chain_id)
            .with_gas_limit(plan.gas_limit)
            .with_gas_price(plan.gas_price_wei);

        let wallet = EthereumWallet::from(account.signer().clone());
        let envelope = request
            .build(&wallet)
            .await
            .map_err(|e| BlockchainError::Signing(e.to_string()))?;

        let tx_hash = self
            .rpc
            .send_raw_transaction(&envelope.encoded_2718())
            .await?;
        tracing::info!(tx_hash = %mask_tx_hash(&tx_hash.to_string()), "Transaction broadcast");

        match self.wait_for_confirmation(tx_hash).await? {
            ConfirmationStatus::Confirmed { block_number } => {
                tracing::debug!(block_number, "Transaction confirmed");
                Ok(tx_hash)
            }
            ConfirmationStatus::Failed(reason) => Err(BlockchainError::Reverted(reason)),
        }
    }

    /// Poll for the receipt until the required depth or the deadline.
    pub async fn wait_for_confirmation(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<ConfirmationStatus> {
        let policy = &self.confirmation;

        let result = timeout(policy.timeout, async {
            loop {
                let receipt = match self.rpc.get_transaction_receipt(tx_hash).await? {
                    Some(r) => r,
                    None => {
                        tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                        sleep(policy.poll_interval).await;
                        continue;
                    }
                };

                if !receipt.success {
                    return Ok(ConfirmationStatus::Failed("Transaction reverted".to_string()));
                }

                let current_block = self.rpc.get_block_number().await?;
                let tx_block = receipt.block_number.unwrap_or(current_block);
                // The inclusion block is the first confirmation
                let confirmations = current_block.saturating_sub(tx_block) + 1;

                if confirmations >= u64::from(policy.required_blocks) {
                    return Ok(ConfirmationStatus::Confirmed {
                        block_number: tx_block,
                    });
                }

                tracing::debug!(
                    tx_hash = %tx_hash,
                    confirmations,
                    required = policy.required_blocks,
                    "Waiting for confirmations"
                );
                sleep(policy.poll_interval).await;
            }
        })
        .await;

        match result {
            Ok(status) => status,
            Err(_) => Err(BlockchainError::ConfirmationTimeout(policy.timeout.as_secs())),
        }
    }
}

impl std::fmt::Debug for ChainGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainGateway")
            .field("chain_id", &self.chain_id)
            .field("gas", &self.gas)
            .finish_non_exhaustive()
    }
}
