//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! private key file
//!     → wallet.rs (key normalisation, address derivation)
//! client.rs (RPC connection with timeouts + failover) implements rpc.rs
//!     → gateway.rs (gas policy, build, sign, broadcast, confirm)
//!     → transaction.rs (GasPlan, TransactionOutcome)
//! contracts.rs (ABI bindings for the reward and bridge contracts)
//! ```
//!
//! # Security Constraints
//! - Never log private keys; addresses and hashes only in masked form
//! - All RPC calls have configurable timeouts
//! - Node failures degrade into data (zero balance, fallback gas, failed outcome)

pub mod client;
pub mod contracts;
pub mod gateway;
pub mod rpc;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::BlockchainClient;
pub use gateway::{CallSpec, ChainGateway, ConfirmationPolicy, ProbeResult};
pub use rpc::{NodeRpc, ReceiptSummary};
pub use transaction::{GasPlan, GasSource, TransactionOutcome};
pub use types::{BlockchainError, ChainId, Ether};
pub use wallet::{Account, LoadError, WalletStore};
