//! Startup orchestration.
//!
//! # Responsibilities
//! - Hold the ordered list of configured bundles
//! - Initialize each bundle as it is added
//! - Run every bundle against the host environment in order
//!
//! # Design Decisions
//! - Fail fast: the first bundle error is fatal
//! - Bundles run in registration order, not concurrently
//! - No retries; a misconfiguration does not fix itself

use std::error::Error as StdError;

use thiserror::Error;

use crate::host::{HostEnvironment, RegistrationError};

/// A bundle failed while running.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Other(Box<dyn StdError + Send + Sync>),
}

/// Startup was aborted by a bundle.
#[derive(Debug, Error)]
#[error("bundle '{bundle}' failed during startup: {source}")]
pub struct StartupError {
    pub bundle: String,
    #[source]
    pub source: BundleError,
}

/// A reusable unit of host configuration.
pub trait ConfiguredBundle<C>: Send + Sync {
    /// Name used in logs and startup errors.
    fn name(&self) -> &str;

    /// Called once when the bundle is added, before configuration is loaded.
    fn initialize(&self) {}

    /// Called once at startup with the loaded configuration.
    fn run(&self, configuration: &C, environment: &mut dyn HostEnvironment) -> Result<(), BundleError>;
}

/// Ordered collection of bundles for a host configuration type `C`.
pub struct Bootstrap<C> {
    bundles: Vec<Box<dyn ConfiguredBundle<C>>>,
}

impl<C> Bootstrap<C> {
    pub fn new() -> Self {
        Self { bundles: Vec::new() }
    }

    /// Add a bundle, running its `initialize` hook immediately.
    pub fn add_bundle(&mut self, bundle: impl ConfiguredBundle<C> + 'static) {
        bundle.initialize();
        tracing::debug!(bundle = bundle.name(), "Bundle added");
        self.bundles.push(Box::new(bundle));
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    /// Run every bundle in order, stopping at the first failure.
    pub fn run(&self, configuration: &C, environment: &mut dyn HostEnvironment) -> Result<(), StartupError> {
        for bundle in &self.bundles {
            tracing::debug!(bundle = bundle.name(), "Running bundle");
            bundle.run(configuration, environment).map_err(|source| StartupError {
                bundle: bundle.name().to_string(),
                source,
            })?;
        }
        Ok(())
    }
}

impl<C> Default for Bootstrap<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Environment, LifecycleListener, ContextParameters, ListenerError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Named(&'static str);

    impl LifecycleListener for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn context_initialized(&self, _context: &ContextParameters) -> Result<(), ListenerError> {
            Ok(())
        }
    }

    struct ListenerBundle {
        listener: &'static str,
        runs: Arc<AtomicUsize>,
        fail: bool,
    }

    impl ConfiguredBundle<()> for ListenerBundle {
        fn name(&self) -> &str {
            self.listener
        }

        fn run(&self, _configuration: &(), environment: &mut dyn HostEnvironment) -> Result<(), BundleError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(BundleError::Other("misconfigured".into()));
            }
            environment.add_lifecycle_listener(Box::new(Named(self.listener)));
            Ok(())
        }
    }

    #[test]
    fn test_bundles_run_in_order() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut bootstrap = Bootstrap::new();
        assert!(bootstrap.is_empty());
        bootstrap.add_bundle(ListenerBundle { listener: "a", runs: runs.clone(), fail: false });
        bootstrap.add_bundle(ListenerBundle { listener: "b", runs: runs.clone(), fail: false });
        assert_eq!(bootstrap.len(), 2);

        let mut env = Environment::default();
        bootstrap.run(&(), &mut env).unwrap();

        assert_eq!(env.listener_names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_first_failure_aborts() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut bootstrap = Bootstrap::new();
        bootstrap.add_bundle(ListenerBundle { listener: "bad", runs: runs.clone(), fail: true });
        bootstrap.add_bundle(ListenerBundle { listener: "never", runs: runs.clone(), fail: false });

        let mut env = Environment::default();
        let err = bootstrap.run(&(), &mut env).unwrap_err();

        assert_eq!(err.bundle, "bad");
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(env.registrations().is_empty());
    }
}
