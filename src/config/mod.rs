//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! harvester.toml (optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → HarvesterConfig (validated, immutable)
//!     → CLI overrides applied in main
//!     → handed to each subsystem by value
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError, DEFAULT_CONFIG_PATH};
pub use schema::{
    BridgeConfig, ChainConfig, FaucetConfig, GasConfig, HarvesterConfig, ObservabilityConfig,
    RewardConfig, ScheduleConfig,
};
