//! Database connectivity subsystem.
//!
//! # Data Flow
//! ```text
//! wake controller / plain health endpoint
//!     → DatabaseProbe::probe()
//!     → bounded connect + liveness query (prober.rs)
//!     → Ready | Unreachable(detail)
//! ```
//!
//! # Design Decisions
//! - The probe is deliberately cheap: one connection, one `SELECT 1`,
//!   closed immediately. No pooling; each invocation is independent.
//! - Driver errors never escape the trait boundary; everything folds to
//!   `Unreachable` with a diagnostic kept for the log stream.

pub mod prober;

pub use prober::{DatabaseProbe, MySqlProbe, ProbeStatus};
