//! Wake controller subsystem.
//!
//! # Data Flow
//! ```text
//! readiness request
//!     → controller.rs: DatabaseProbe
//!         ready?  → report 200 immediately
//!         not ready:
//!     → ControlPlane::describe (one get)
//!     → state.rs: normalize provider strings
//!     → decision.rs: pure decision table
//!     → dispatcher.rs: one async mutation, "already satisfied" folds to ok
//!     → ProbeOutcome::NotReady (the orchestrator retries)
//! ```
//!
//! # Design Decisions
//! - The decision table is a pure function so every correctness fix lands
//!   once; the six drifted script variants this replaces disagreed on it.
//! - Activation is asynchronous: even a successful dispatch reports
//!   not-ready, and the next orchestrator retry re-evaluates from scratch.
//! - An unrecognized provider state is `Unknown` and never triggers an
//!   action.

pub mod controller;
pub mod decision;
pub mod dispatcher;
pub mod state;

pub use controller::{ProbeOutcome, WakeController};
pub use decision::ActivationDecision;
pub use state::{ActivationPolicy, Classification, ResourceState};
