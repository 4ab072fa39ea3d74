//! Config-driven security bundle for Axum services.
//!
//! Reads an optional `[security]` fragment from the host configuration and,
//! when enabled, installs a session handler, a security context loader, and
//! a URL-scoped security filter into the host environment.

pub mod bundle;
pub mod config;
pub mod engine;
pub mod host;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use bundle::{Activation, SecurityBundle};
pub use config::{ConfigurationStrategy, SecurityConfig, ServiceConfig};
pub use host::{Environment, HostEnvironment};
pub use http::HttpServer;
pub use lifecycle::{Bootstrap, Shutdown};
