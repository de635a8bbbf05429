//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoint (primary + failovers)
//! - Query chain state (chain id, balances, nonces, gas price, receipts)
//! - Simulate and estimate contract calls, broadcast signed transactions
//! - Classify EVM reverts separately from transport failures

use alloy::primitives::{keccak256, Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::{TransportError, TransportResult};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::rpc::{NodeRpc, ReceiptSummary};
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId};
use crate::config::schema::ChainConfig;

/// JSON-RPC error code used by geth-style nodes for reverted calls.
const REVERT_ERROR_CODE: i64 = 3;

/// Node replies meaning the exact transaction is already in the mempool.
const ALREADY_KNOWN_MARKERS: [&str; 2] = ["already known", "known transaction"];

/// Blockchain RPC client wrapper with failover support.
#[derive(Clone)]
pub struct BlockchainClient {
    /// List of providers (primary + failovers).
    providers: Vec<Arc<dyn Provider + Send + Sync>>,
    /// Configuration.
    config: ChainConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a new blockchain client.
    ///
    /// No request is made here; an unreachable node surfaces on first use.
    pub fn new(config: ChainConfig) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(
            Arc::new(ProviderBuilder::new().connect_http(primary_url))
                as Arc<dyn Provider + Send + Sync>,
        );

        for url_str in &config.failover_urls {
            match url_str.parse::<url::Url>() {
                Ok(url) => providers.push(
                    Arc::new(ProviderBuilder::new().connect_http(url))
                        as Arc<dyn Provider + Send + Sync>,
                ),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        tracing::info!(
            rpc_url = %config.rpc_url,
            failovers = providers.len() - 1,
            "Blockchain client initialized"
        );

        Ok(Self {
            providers,
            config,
            timeout_duration,
        })
    }

    /// Determine the chain id to sign for.
    ///
    /// A configured id is verified against the node; otherwise the node's id
    /// is adopted.
    pub async fn resolve_chain_id(&self) -> BlockchainResult<ChainId> {
        let actual = NodeRpc::get_chain_id(self).await?;
        match self.config.chain_id {
            Some(expected) if expected != actual => {
                Err(BlockchainError::ChainMismatch { expected, actual })
            }
            _ => Ok(ChainId(actual)),
        }
    }

    /// Run `op` against each provider in order until one answers.
    ///
    /// Reverts are deterministic, so they are returned immediately instead of
    /// being retried on the next provider.
    async fn with_failover<T, F, Fut>(&self, op: &'static str, f: F) -> BlockchainResult<T>
    where
        T: Send,
        F: Fn(Arc<dyn Provider + Send + Sync>) -> Fut + Send + Sync,
        Fut: Future<Output = TransportResult<T>> + Send,
    {
        let mut last_error = String::from("no providers configured");
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, f(provider.clone())).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    let err = classify_rpc_error(e);
                    if err.is_revert() {
                        return Err(err);
                    }
                    tracing::warn!(
                        provider_idx = i,
                        op,
                        error = %err,
                        "RPC error, trying next provider"
                    );
                    last_error = err.to_string();
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, op, "RPC timeout, trying next provider");
                    last_error = BlockchainError::Timeout(self.config.rpc_timeout_secs).to_string();
                }
            }
        }
        Err(BlockchainError::Rpc(format!(
            "All providers failed to {}: {}",
            op, last_error
        )))
    }
}

/// Map a transport error onto the crate's taxonomy.
pub fn classify_rpc_error(error: TransportError) -> BlockchainError {
    if let Some(payload) = error.as_error_resp() {
        let message = payload.message.to_string();
        if payload.code == REVERT_ERROR_CODE || message.to_ascii_lowercase().contains("revert") {
            return BlockchainError::Reverted(message);
        }
    }
    BlockchainError::Rpc(error.to_string())
}

/// Whether a broadcast was rejected only because the node already has it.
///
/// Happens when a provider times out after accepting a transaction and the
/// same bytes are then sent to the next provider.
pub fn is_already_known(error: &TransportError) -> bool {
    error.as_error_resp().is_some_and(|payload| {
        let message = payload.message.to_ascii_lowercase();
        ALREADY_KNOWN_MARKERS.iter().any(|marker| message.contains(marker))
    })
}

#[async_trait]
impl NodeRpc for BlockchainClient {
    async fn get_chain_id(&self) -> BlockchainResult<u64> {
        self.with_failover("get chain id", |p| async move { p.get_chain_id().await })
            .await
    }

    async fn get_block_number(&self) -> BlockchainResult<u64> {
        self.with_failover("get block number", |p| async move {
            p.get_block_number().await
        })
        .await
    }

    async fn get_balance(&self, address: Address) -> BlockchainResult<U256> {
        self.with_failover("get balance", move |p| async move {
            p.get_balance(address).await
        })
        .await
    }

    async fn get_transaction_count(&self, address: Address) -> BlockchainResult<u64> {
        self.with_failover("get transaction count", move |p| async move {
            p.get_transaction_count(address).await
        })
        .await
    }

    async fn get_gas_price(&self) -> BlockchainResult<u128> {
        self.with_failover("get gas price", |p| async move { p.get_gas_price().await })
            .await
    }

    async fn estimate_gas(&self, request: TransactionRequest) -> BlockchainResult<u64> {
        self.with_failover("estimate gas", |p| {
            let request = request.clone();
            async move { p.estimate_gas(request).await }
        })
        .await
    }

    async fn call(&self, request: TransactionRequest) -> BlockchainResult<Bytes> {
        self.with_failover("call", |p| {
            let request = request.clone();
            async move { p.call(request).await }
        })
        .await
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash> {
        let raw = raw.to_vec();
        let local_hash = keccak256(&raw);
        self.with_failover("send raw transaction", |p| {
            let raw = raw.clone();
            async move {
                match p.send_raw_transaction(&raw).await {
                    Ok(pending) => Ok(*pending.tx_hash()),
                    Err(e) if is_already_known(&e) => {
                        tracing::info!("Node already has the transaction, using local hash");
                        Ok(local_hash)
                    }
                    Err(e) => Err(e),
                }
            }
        })
        .await
    }

    async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<ReceiptSummary>> {
        let receipt = self
            .with_failover("get receipt", move |p| async move {
                p.get_transaction_receipt(tx_hash).await
            })
            .await?;

        Ok(receipt.map(|r| ReceiptSummary {
            block_number: r.block_number,
            success: r.status(),
        }))
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
