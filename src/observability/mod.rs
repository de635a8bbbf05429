//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//! Before anything identifying is logged:
//!     → redact.rs (masked addresses and transaction hashes)
//! ```

pub mod logging;
pub mod metrics;
pub mod redact;
