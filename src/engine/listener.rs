//! Startup listener building the runtime security context.

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::engine::rules::{load_rules, resolve_location, SecurityContext};
use crate::host::listener::{ContextParameters, LifecycleListener, ListenerError};

pub const LOADER_LISTENER_NAME: &str = "security-context-loader";

/// Loads the rule file on startup and publishes the compiled context.
pub struct SecurityContextLoader {
    slot: Arc<ArcSwapOption<SecurityContext>>,
}

impl SecurityContextLoader {
    pub fn new(slot: Arc<ArcSwapOption<SecurityContext>>) -> Self {
        Self { slot }
    }
}

impl LifecycleListener for SecurityContextLoader {
    fn name(&self) -> &str {
        LOADER_LISTENER_NAME
    }

    fn context_initialized(&self, context: &ContextParameters) -> Result<(), ListenerError> {
        let path = resolve_location(context).map_err(|e| ListenerError::new(LOADER_LISTENER_NAME, e))?;
        let security = load_rules(&path).map_err(|e| ListenerError::new(LOADER_LISTENER_NAME, e))?;

        tracing::info!(
            path = %path.display(),
            users = security.user_count(),
            rules = security.rule_count(),
            "Security context loaded"
        );
        self.slot.store(Some(Arc::new(security)));
        Ok(())
    }

    fn context_destroyed(&self, _context: &ContextParameters) {
        self.slot.store(None);
        tracing::debug!("Security context released");
    }
}
