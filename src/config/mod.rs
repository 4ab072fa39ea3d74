//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → strategy.rs (extract the optional [security] fragment)
//!     → bundle (one-time activation decision)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload path
//! - All fields have defaults to allow minimal configs
//! - A missing [security] section is `None`, never a zero-filled section
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod strategy;
pub mod validation;

pub use schema::ObservabilityConfig;
pub use schema::SecurityConfig;
pub use schema::ServerConfig;
pub use schema::ServiceConfig;
pub use strategy::ConfigurationStrategy;
