//! Error taxonomy for the gate.
//!
//! # Design Decisions
//! - Two kinds cross component boundaries: configuration errors (fatal,
//!   retrying cannot fix them) and control-plane failures (logged in full,
//!   surfaced so the caller can retry or redeliver). Ordinary "not ready"
//!   is not an error; it is a probe outcome the orchestrator retries on.
//! - "Already satisfied" is not an error; it is a successful no-op and is
//!   modeled as a dispatch outcome, not an error variant.
//! - Raw provider errors never cross into HTTP response bodies.

use thiserror::Error;

/// Errors produced by gate components.
#[derive(Debug, Error)]
pub enum GateError {
    /// Missing or invalid required input. Fatal: retrying cannot fix it.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A control-plane call failed (auth, not-found, malformed request).
    /// Folded into the 503 path at the HTTP boundary, but kept distinct so
    /// operator-facing logs can tell the cases apart.
    #[error("control plane error: {detail}")]
    ControlPlane { detail: String },
}
