//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overlay: PROJECT_ID, WORDPRESS_DB_*, WAKEGATE_*)
//!     → validation.rs (semantic checks, all errors collected)
//!     → GateConfig (validated, immutable)
//!     → passed by value into each component at startup
//! ```
//!
//! # Design Decisions
//! - Config is resolved once at process entry; no component reads ambient
//!   process state directly afterwards
//! - A missing required value is a configuration error, never a default
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    DatabaseConfig, DeactivationConfig, GateConfig, ListenerConfig, ProbeConfig, ResourceConfig,
};
