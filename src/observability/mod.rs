//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging through `tracing`; the log stream is the only
//!   place full provider errors and driver diagnostics appear
//! - HTTP response bodies carry short, non-sensitive diagnostics only
//! - Level configurable via config, overridable with `RUST_LOG`

pub mod logging;

pub use logging::init_logging;
