//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! plan file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → LifecycleConfig (validated, immutable)
//!     → lifecycle::startup (assemble the orchestrator)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::ComponentConfig;
pub use schema::LifecycleConfig;
pub use schema::LogFormat;
