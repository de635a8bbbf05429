//! The raw node surface the rest of the crate depends on.
//!
//! `BlockchainClient` implements it against real JSON-RPC endpoints; tests
//! substitute scripted implementations. Everything above this trait (gas
//! policy, signing, confirmation polling) is shared by both.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;

use crate::blockchain::types::BlockchainResult;

/// The parts of a transaction receipt the harvester looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptSummary {
    pub block_number: Option<u64>,
    /// `true` when the EVM executed the transaction without reverting.
    pub success: bool,
}

/// JSON-RPC calls against one logical node.
///
/// Implementations must report EVM reverts as `BlockchainError::Reverted`
/// so callers can tell them apart from transport failures.
#[async_trait]
pub trait NodeRpc: Send + Sync {
    async fn get_chain_id(&self) -> BlockchainResult<u64>;

    async fn get_block_number(&self) -> BlockchainResult<u64>;

    async fn get_balance(&self, address: Address) -> BlockchainResult<U256>;

    async fn get_transaction_count(&self, address: Address) -> BlockchainResult<u64>;

    async fn get_gas_price(&self) -> BlockchainResult<u128>;

    async fn estimate_gas(&self, request: TransactionRequest) -> BlockchainResult<u64>;

    /// Read-only `eth_call` simulation.
    async fn call(&self, request: TransactionRequest) -> BlockchainResult<Bytes>;

    /// Broadcast an EIP-2718 encoded, signed transaction.
    async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash>;

    async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<ReceiptSummary>>;
}
