//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace + timeout layers)
//!     → environment layers (session handler, registered filters)
//!     → application handlers
//! ```

pub mod server;

pub use server::HttpServer;
