//! Configuration schema definitions.
//!
//! This module defines the host service configuration shipped with the
//! binary and the `[security]` fragment the bundle consumes.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// URL pattern the security filter intercepts when none is configured.
pub const DEFAULT_FILTER_URL_PATTERN: &str = "/*";

/// Root configuration for the host service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings.
    pub server: ServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Optional security fragment. A missing section deserializes to `None`.
    pub security: Option<SecurityConfig>,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Process-level context parameters handed to lifecycle listeners.
    pub context_parameters: BTreeMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
            context_parameters: BTreeMap::new(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// The `[security]` fragment.
///
/// Every field other than `enabled` is inert unless `enabled` is `true`.
/// The value is read once at startup and never mutated afterwards, so the
/// fields are only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    enabled: bool,

    #[serde(rename = "filter_url_pattern")]
    url_pattern: String,

    #[serde(rename = "dropwizard_session_handler")]
    manage_session_handler: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url_pattern: DEFAULT_FILTER_URL_PATTERN.to_string(),
            manage_session_handler: false,
        }
    }
}

impl SecurityConfig {
    /// Build an enabled fragment with default pattern and no session management.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Set the URL pattern the filter is scoped to.
    pub fn with_url_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.url_pattern = pattern.into();
        self
    }

    /// Ask the bundle to provision a session handler.
    pub fn with_session_handler(mut self, manage: bool) -> Self {
        self.manage_session_handler = manage;
        self
    }

    /// Whether the security layer should be installed at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The single URL pattern the filter intercepts. Never empty.
    pub fn url_pattern(&self) -> &str {
        match self.url_pattern.trim() {
            "" => DEFAULT_FILTER_URL_PATTERN,
            pattern => pattern,
        }
    }

    /// Whether the bundle should install a session handler when the host has none.
    pub fn manages_session_handler(&self) -> bool {
        self.manage_session_handler
    }
}

impl fmt::Display for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SecurityConfig {{ enabled: {}, filter_url_pattern: {}, dropwizard_session_handler: {} }}",
            self.enabled,
            self.url_pattern(),
            self.manage_session_handler
        )
    }
}
