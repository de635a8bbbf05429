//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every Pacer wait returns Cancelled → run loop exits
//! ```
//!
//! A shutdown never interrupts a transaction mid-flight; it is observed at
//! the next pause.

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
