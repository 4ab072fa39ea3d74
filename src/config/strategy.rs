//! Access to the optional security fragment of a host configuration.
//!
//! The bundle never sees a concrete host configuration type. Each host
//! process supplies exactly one strategy that knows where its `[security]`
//! section lives.

use crate::config::schema::SecurityConfig;

/// Extracts the security fragment from a host configuration `C`.
///
/// Implementations must be pure: no side effects, no failure for a
/// well-formed configuration. Deserialization errors belong to the loader.
pub trait ConfigurationStrategy<C>: Send + Sync {
    /// Returns the security fragment, or `None` when the host configuration has none.
    fn security_config(&self, configuration: &C) -> Option<SecurityConfig>;
}

impl<C, F> ConfigurationStrategy<C> for F
where
    F: Fn(&C) -> Option<SecurityConfig> + Send + Sync,
{
    fn security_config(&self, configuration: &C) -> Option<SecurityConfig> {
        self(configuration)
    }
}
