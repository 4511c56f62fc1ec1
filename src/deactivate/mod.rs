//! Deactivation subsystem.
//!
//! # Data Flow
//! ```text
//! message-delivery push (at-least-once)
//!     → event.rs: parse envelope, decode payload
//!     → handler.rs: validate target, issue stop or suspend
//!     → acknowledge / surface error for redelivery
//! ```
//!
//! # Design Decisions
//! - Redelivery is expected: issuing stop or suspend twice is harmless
//!   because "already satisfied" provider responses acknowledge cleanly.
//! - Control-plane errors are never swallowed; the delivery system applies
//!   its own redelivery policy.

pub mod event;
pub mod handler;

pub use event::PushEnvelope;
pub use handler::{DeactivationHandler, StopAck, StopMode};
