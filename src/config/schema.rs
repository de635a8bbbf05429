//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the harvester.
//! All types derive Serde traits for deserialization from config files.

use alloy::primitives::{address, Address, U256};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::blockchain::types::Ether;

/// Root configuration for the harvester.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HarvesterConfig {
    /// Node connection settings.
    pub chain: ChainConfig,

    /// Gas price and gas limit safety margins.
    pub gas: GasConfig,

    /// Off-chain faucet claim.
    pub faucet: FaucetConfig,

    /// On-chain reward claim.
    pub reward: RewardConfig,

    /// On-chain bridge transfer.
    pub bridge: BridgeConfig,

    /// Pacing between steps, wallets and rounds.
    pub schedule: ScheduleConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Blockchain node configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// Expected chain ID. Queried from the node when unset.
    pub chain_id: Option<u64>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Blocks (including the inclusion block) before a transaction counts as done.
    pub confirmation_blocks: u32,

    /// Maximum time to wait for a receipt, in seconds.
    pub receipt_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub receipt_poll_interval_ms: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://rpc.testnet.humanity.org".to_string(),
            failover_urls: Vec::new(),
            chain_id: None,
            rpc_timeout_secs: 30,
            confirmation_blocks: 1,
            receipt_timeout_secs: 180,
            receipt_poll_interval_ms: 2000,
        }
    }
}

/// Gas safety margins.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GasConfig {
    /// Floor for the gas price in wei, also the fallback when the node cannot be asked.
    pub min_gas_price_wei: u64,

    /// Gas price multiplier (1.0 = network price, 1.2 = 20% buffer).
    pub gas_price_multiplier: f64,

    /// Multiplier applied to a successful gas estimate.
    pub gas_limit_multiplier: f64,

    /// Gas limit used when estimation fails.
    pub default_gas_limit: u64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            min_gas_price_wei: 1_000_000_000,
            gas_price_multiplier: 1.2,
            gas_limit_multiplier: 1.2,
            default_gas_limit: 300_000,
        }
    }
}

/// Faucet endpoint and the browser-like headers it insists on.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FaucetConfig {
    pub enabled: bool,

    /// Claim endpoint (POST).
    pub url: String,

    pub origin: String,

    pub referer: String,

    pub user_agent: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for FaucetConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "https://faucet.testnet.humanity.org/api/claim".to_string(),
            origin: "https://faucet.testnet.humanity.org".to_string(),
            referer: "https://faucet.testnet.humanity.org/".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36"
                .to_string(),
            timeout_secs: 30,
        }
    }
}

/// Reward contract settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RewardConfig {
    pub enabled: bool,

    /// Address of the rewards contract exposing `claimReward()`.
    pub contract: Address,

    /// Balance below which the claim is skipped.
    pub min_balance: Ether,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            contract: address!("a18f6FCB2Fd4884436d10610E69DB7BFa1bFe8C7"),
            min_balance: Ether::from_wei(U256::from(1_000_000_000_000_000u64)), // 0.001
        }
    }
}

/// Bridge contract settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub enabled: bool,

    /// Address of the bridge contract exposing `bridgeAsset(...)`.
    pub contract: Address,

    /// Balance below which the bridge is skipped. Must cover amount + gas.
    pub min_balance: Ether,

    /// Amount bridged per cycle, sent as the transaction value.
    pub amount: Ether,

    pub destination_network: u32,

    /// Receiving address on the destination network. Defaults to the sender.
    pub destination_address: Option<Address>,

    /// Token to bridge; the zero address means the native token.
    pub token: Address,

    pub force_update_global_exit_root: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            contract: address!("5F7CaE7D1eFC8cC05da97D988cFFC253ce3273eF"),
            min_balance: Ether::from_wei(U256::from(1_100_000_000_000_000_000u64)), // 1.1
            amount: Ether::from_wei(U256::from(1_000_000_000_000_000_000u64)), // 1.0
            destination_network: 0,
            destination_address: None,
            token: Address::ZERO,
            force_update_global_exit_root: true,
        }
    }
}

/// Pacing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Newline-delimited private key file.
    pub keys_file: PathBuf,

    /// Countdown after the faucet claim, in seconds.
    pub pause_after_faucet_secs: u64,

    /// Countdown after the reward claim, in seconds.
    pub pause_after_reward_secs: u64,

    /// Countdown after the bridge, in seconds.
    pub pause_after_bridge_secs: u64,

    /// Delay before the next wallet, in milliseconds.
    pub between_wallets_ms: u64,

    /// Delay between rounds, in seconds.
    pub between_rounds_secs: u64,

    /// Stop after this many rounds. Runs forever when unset.
    pub max_rounds: Option<u64>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            keys_file: PathBuf::from("private_keys.txt"),
            pause_after_faucet_secs: 10,
            pause_after_reward_secs: 3,
            pause_after_bridge_secs: 3,
            between_wallets_ms: 3000,
            between_rounds_secs: 24 * 60 * 60,
            max_rounds: None,
        }
    }
}

impl ScheduleConfig {
    /// A schedule without any waiting, for tests and dry runs.
    pub fn immediate(max_rounds: u64) -> Self {
        Self {
            pause_after_faucet_secs: 0,
            pause_after_reward_secs: 0,
            pause_after_bridge_secs: 0,
            between_wallets_ms: 0,
            between_rounds_secs: 0,
            max_rounds: Some(max_rounds),
            ..Self::default()
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
