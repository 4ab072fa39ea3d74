//! Security bundle subsystem.
//!
//! # Data Flow
//! ```text
//! host configuration C
//!     → ConfigurationStrategy<C> (optional [security] fragment)
//!     → coordinator.rs (absent / disabled / activate)
//!     → HostEnvironment (session slot, listener, filter)
//! ```
//!
//! # Design Decisions
//! - Runs once, before serving; no locking
//! - Absent and disabled are normal outcomes, logged at debug
//! - Registration errors propagate and abort startup; nothing is rolled back

pub mod coordinator;

pub use coordinator::{Activation, SecurityBundle, SECURITY_FILTER_NAME};
