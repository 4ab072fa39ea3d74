//! URL pattern matching for filter scopes.
//!
//! # Responsibilities
//! - Parse servlet-style URL patterns
//! - Match request paths against a parsed pattern
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - `/*` matches everything, `/prefix/*` matches the prefix itself and below
//! - `*.ext` matches by extension of the last segment
//! - Anything else is an exact path
//! - No regex to guarantee O(n) matching

use std::fmt;

use thiserror::Error;

/// A pattern that cannot be used as a filter scope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("URL pattern is empty")]
    Empty,

    #[error("URL pattern '{0}' must start with '/' or '*.'")]
    Malformed(String),
}

/// A parsed URL pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlPattern {
    /// `/*`
    All,
    /// `/prefix/*`, stored without the trailing `/*`.
    Prefix(String),
    /// `*.ext`, stored without the leading `*.`.
    Extension(String),
    /// Anything else starting with `/`.
    Exact(String),
}

impl UrlPattern {
    /// Parse a servlet-style pattern.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }

        if pattern == "/*" {
            return Ok(UrlPattern::All);
        }
        if let Some(prefix) = pattern.strip_suffix("/*") {
            if prefix.starts_with('/') {
                return Ok(UrlPattern::Prefix(prefix.to_string()));
            }
        }
        if let Some(ext) = pattern.strip_prefix("*.") {
            if !ext.is_empty() && !ext.contains('/') {
                return Ok(UrlPattern::Extension(ext.to_string()));
            }
        }
        if pattern.starts_with('/') && !pattern.contains('*') {
            return Ok(UrlPattern::Exact(pattern.to_string()));
        }

        Err(PatternError::Malformed(pattern.to_string()))
    }

    /// Returns true if the request path falls inside this pattern.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            UrlPattern::All => true,
            UrlPattern::Prefix(prefix) => {
                path == prefix
                    || path
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
            UrlPattern::Extension(ext) => path
                .rsplit('/')
                .next()
                .and_then(|segment| segment.rsplit_once('.'))
                .is_some_and(|(_, found)| found == ext),
            UrlPattern::Exact(exact) => path == exact,
        }
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlPattern::All => write!(f, "/*"),
            UrlPattern::Prefix(prefix) => write!(f, "{}/*", prefix),
            UrlPattern::Extension(ext) => write!(f, "*.{}", ext),
            UrlPattern::Exact(exact) => write!(f, "{}", exact),
        }
    }
}
