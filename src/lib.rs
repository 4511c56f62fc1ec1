//! wakegate: scale-to-zero readiness gate.
//!
//! Lets a serverless WordPress deployment park its backing database
//! resource (a managed Cloud SQL instance or a GCE VM running MySQL) when
//! idle and wake it on demand: readiness probes test connectivity, consult
//! the cloud control plane when the database is down, and trigger an
//! asynchronous activation where the decision table says so. A push
//! endpoint handles the matching scale-down signal.

// Core subsystems
pub mod cloud;
pub mod config;
pub mod db;
pub mod http;
pub mod wake;

// Scale-down path
pub mod deactivate;

// Cross-cutting concerns
pub mod error;
pub mod observability;

pub use config::GateConfig;
pub use error::GateError;
pub use http::GateServer;
pub use wake::WakeController;
