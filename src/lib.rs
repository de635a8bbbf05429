//! Multi-account reward harvester.
//!
//! Each round walks the loaded wallets in order and, per wallet, requests a
//! faucet grant, claims the protocol reward and bridges a fixed amount.
//! Failures are reported as outcomes and never stop the loop.

pub mod blockchain;
pub mod config;
pub mod console;
pub mod lifecycle;
pub mod observability;
pub mod orchestrator;
pub mod services;

pub use blockchain::{Account, ChainGateway, WalletStore};
pub use config::schema::HarvesterConfig;
pub use lifecycle::Shutdown;
pub use orchestrator::{Orchestrator, RunSummary, Services};
