//! Security engine subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     listener.rs (SecurityContextLoader)
//!     → rules.rs (resolve location → parse → compile)
//!     → shared slot (ArcSwapOption<SecurityContext>)
//!
//! Request time:
//!     filter.rs (SecurityFilter)
//!     → read slot → authenticate → authorize (first matching rule)
//!     → 401 / 403 / pass through
//! ```
//!
//! # Design Decisions
//! - The bundle only registers the engine's listener and filter; it never
//!   looks inside them
//! - Listener and filter share one slot, so the filter sees whatever the
//!   listener published before serving began
//! - A missing rule file aborts startup

pub mod filter;
pub mod listener;
pub mod rules;

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::host::{LifecycleListener, RequestFilter};

pub use filter::SecurityFilter;
pub use listener::SecurityContextLoader;
pub use rules::{Access, Decision, EngineError, SecurityContext, Subject};

/// Supplies the listener and filter the bundle registers.
pub trait SecurityEngine: Send + Sync {
    /// Listener that builds the runtime security context at startup.
    fn loader_listener(&self) -> Box<dyn LifecycleListener>;

    /// Filter enforcing the security context on matching requests.
    fn filter(&self) -> Arc<dyn RequestFilter>;
}

/// The rule-file engine shipped with the crate.
#[derive(Clone, Default)]
pub struct RulesEngine {
    slot: Arc<ArcSwapOption<SecurityContext>>,
}

impl RulesEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently published context, if the loader has run.
    pub fn context(&self) -> Option<Arc<SecurityContext>> {
        self.slot.load_full()
    }
}

impl SecurityEngine for RulesEngine {
    fn loader_listener(&self) -> Box<dyn LifecycleListener> {
        Box::new(SecurityContextLoader::new(self.slot.clone()))
    }

    fn filter(&self) -> Arc<dyn RequestFilter> {
        Arc::new(SecurityFilter::new(self.slot.clone()))
    }
}
