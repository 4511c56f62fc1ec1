//! HTTP boundary.
//!
//! # Data Flow
//! ```text
//! orchestrator readiness probe
//!     → GET /startupz → wake controller → 200 / 503 / 500
//! orchestrator liveness check (resource already warm)
//!     → GET /healthz  → connectivity probe only → 200 / 503
//! message-delivery push
//!     → POST /events/stop → deactivation handler → 204 / 400 / 500 / 502
//! ```

pub mod server;

pub use server::{AppState, GateServer};
