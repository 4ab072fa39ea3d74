//! The security bundle: a one-time activation decision at startup.
//!
//! ```text
//! Init → Resolve ─┬─ Absent                      (terminal, no side effects)
//!                 └─ Evaluate ─┬─ Disabled        (terminal, no side effects)
//!                              └─ Activate        (terminal)
//!                                  1. session handler, if managed and missing
//!                                  2. context loader listener
//!                                  3. filter scoped to url_pattern
//! ```

use std::fmt;
use std::sync::Arc;

use crate::config::schema::SecurityConfig;
use crate::config::strategy::ConfigurationStrategy;
use crate::engine::{RulesEngine, SecurityEngine};
use crate::host::{HostEnvironment, SessionHandler};
use crate::lifecycle::{BundleError, ConfiguredBundle};
use crate::observability::metrics;

/// Name the security filter is registered under.
pub const SECURITY_FILTER_NAME: &str = "security-filter";

/// Where a bundle run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// The host configuration has no security fragment.
    Absent,
    /// The fragment is present with `enabled = false`.
    Disabled,
    /// The listener and filter were registered.
    Activated {
        url_pattern: String,
        session_handler_installed: bool,
    },
}

impl Activation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Activation::Absent => "absent",
            Activation::Disabled => "disabled",
            Activation::Activated { .. } => "activated",
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conditionally wires a security engine into the host pipeline.
pub struct SecurityBundle<C> {
    strategy: Box<dyn ConfigurationStrategy<C>>,
    engine: Arc<dyn SecurityEngine>,
    filter_name: String,
}

impl<C> SecurityBundle<C> {
    /// Create a bundle using the rule-file engine.
    pub fn new(strategy: impl ConfigurationStrategy<C> + 'static) -> Self {
        Self::with_engine(strategy, Arc::new(RulesEngine::new()))
    }

    /// Create a bundle using a custom engine.
    pub fn with_engine(
        strategy: impl ConfigurationStrategy<C> + 'static,
        engine: Arc<dyn SecurityEngine>,
    ) -> Self {
        Self {
            strategy: Box::new(strategy),
            engine,
            filter_name: SECURITY_FILTER_NAME.to_string(),
        }
    }

    /// Register the filter under a different name.
    pub fn with_filter_name(mut self, name: impl Into<String>) -> Self {
        self.filter_name = name.into();
        self
    }

    /// Resolve the fragment and activate if enabled.
    pub fn activate(
        &self,
        configuration: &C,
        environment: &mut dyn HostEnvironment,
    ) -> Result<Activation, BundleError> {
        let activation = match self.strategy.security_config(configuration) {
            None => {
                tracing::debug!("Security is not configured");
                Activation::Absent
            }
            Some(config) => {
                tracing::debug!(config = %config, "Security is configured");
                self.evaluate(&config, environment)?
            }
        };
        metrics::record_activation(activation.as_str());
        Ok(activation)
    }

    fn evaluate(
        &self,
        config: &SecurityConfig,
        environment: &mut dyn HostEnvironment,
    ) -> Result<Activation, BundleError> {
        if !config.is_enabled() {
            tracing::debug!("Security is not enabled");
            return Ok(Activation::Disabled);
        }
        tracing::debug!("Security is enabled");

        // Never shadow a handler the host installed itself.
        let session_handler_installed =
            config.manages_session_handler() && environment.session_handler().is_none();
        if session_handler_installed {
            tracing::debug!("Adding session handler to environment");
            environment.set_session_handler(SessionHandler::default());
        }

        environment.add_lifecycle_listener(self.engine.loader_listener());

        let url_pattern = config.url_pattern();
        tracing::debug!(
            filter = %self.filter_name,
            url_pattern = %url_pattern,
            "Security filter will check matching URLs"
        );
        environment.add_filter(&self.filter_name, url_pattern, self.engine.filter())?;

        tracing::info!(url_pattern = %url_pattern, "Security layer activated");
        Ok(Activation::Activated {
            url_pattern: url_pattern.to_string(),
            session_handler_installed,
        })
    }
}

impl<C> ConfiguredBundle<C> for SecurityBundle<C> {
    fn name(&self) -> &str {
        "security"
    }

    fn run(&self, configuration: &C, environment: &mut dyn HostEnvironment) -> Result<(), BundleError> {
        self.activate(configuration, environment).map(|_| ())
    }
}
