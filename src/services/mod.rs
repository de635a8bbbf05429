//! The three per-account actions and the outcomes they report.
//!
//! Every service turns its failures into data: callers receive an
//! [`ActionOutcome`] and never an error.

pub mod bridge;
pub mod faucet;
pub mod outcome;
pub mod reward;

pub use bridge::BridgeService;
pub use faucet::{parse_faucet_message, FaucetClient, FaucetError, ParseError};
pub use outcome::{ActionOutcome, ActionResult, SkipReason};
pub use reward::{ClaimStatus, RewardService};
