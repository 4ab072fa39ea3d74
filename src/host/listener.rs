//! Lifecycle listeners and the context they observe.

use std::collections::BTreeMap;
use std::error::Error as StdError;

use thiserror::Error;

/// Process-level parameters visible to every lifecycle listener.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextParameters {
    params: BTreeMap<String, String>,
}

impl ContextParameters {
    pub fn new(params: BTreeMap<String, String>) -> Self {
        Self { params }
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ContextParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A listener failed while the context was being initialized.
#[derive(Debug, Error)]
#[error("listener '{listener}' failed: {source}")]
pub struct ListenerError {
    pub listener: String,
    #[source]
    pub source: Box<dyn StdError + Send + Sync>,
}

impl ListenerError {
    pub fn new(listener: impl Into<String>, source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            listener: listener.into(),
            source: source.into(),
        }
    }
}

/// Startup/shutdown callbacks registered with the host environment.
pub trait LifecycleListener: Send + Sync {
    /// Stable name used in logs and registration journals.
    fn name(&self) -> &str;

    /// Called once before the first request is dispatched.
    fn context_initialized(&self, context: &ContextParameters) -> Result<(), ListenerError>;

    /// Called once after the server stops accepting requests.
    fn context_destroyed(&self, _context: &ContextParameters) {}
}
