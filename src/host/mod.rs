//! Host environment subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (single-threaded):
//!     bundles → environment.rs (session slot, listeners, filters)
//!     → environment.start() (listeners in registration order)
//!
//! Request time:
//!     session.rs layer (outermost, optional)
//!     → filter.rs (each filter in registration order, if url_pattern.rs matches)
//!     → application router
//! ```
//!
//! # Design Decisions
//! - Registration is append-only and happens before serving
//! - One session handler slot, queried before it is set
//! - Filter names are unique; a collision is a registration error

pub mod environment;
pub mod filter;
pub mod listener;
pub mod session;
pub mod url_pattern;

pub use environment::{Environment, HostEnvironment, Registration, RegistrationError};
pub use filter::{FilterRegistration, RequestFilter};
pub use listener::{ContextParameters, LifecycleListener, ListenerError};
pub use session::SessionHandler;
pub use url_pattern::UrlPattern;
