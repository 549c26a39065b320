//! Internal telemetry for the session ledger.
//!
//! In-process counters and health flags only; nothing here talks to an
//! external metrics system.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
