//! Rule file model, location resolution, and the compiled security context.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::host::listener::ContextParameters;
use crate::host::url_pattern::UrlPattern;

/// Context parameter naming the rule file candidates.
pub const CONFIG_LOCATIONS_PARAM: &str = "security_config_locations";

/// Candidates tried when the context parameter is not set.
pub const DEFAULT_CONFIG_LOCATIONS: [&str; 2] = ["security.toml", "config/security.toml"];

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no security rule file found (tried: {})", display_paths(.0))]
    ConfigNotFound(Vec<PathBuf>),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid rule: {0}")]
    InvalidRule(String),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rule file as written on disk.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RuleFile {
    pub users: BTreeMap<String, UserEntry>,
    pub urls: Vec<UrlRule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserEntry {
    pub token: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UrlRule {
    pub pattern: String,
    pub access: String,
}

/// What a URL rule requires of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Anonymous,
    Authenticated,
    Roles(Vec<String>),
}

impl Access {
    /// Parse `anon`, `authc`, or `roles:a,b`.
    pub fn parse(raw: &str) -> Result<Self, EngineError> {
        let raw = raw.trim();
        match raw {
            "anon" => Ok(Access::Anonymous),
            "authc" => Ok(Access::Authenticated),
            _ => {
                let roles = raw
                    .strip_prefix("roles:")
                    .ok_or_else(|| EngineError::InvalidRule(format!("unknown access '{}'", raw)))?;
                let roles: Vec<String> = roles
                    .split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(String::from)
                    .collect();
                if roles.is_empty() {
                    return Err(EngineError::InvalidRule(format!("'{}' lists no roles", raw)));
                }
                Ok(Access::Roles(roles))
            }
        }
    }
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub name: String,
    pub roles: Vec<String>,
}

impl Subject {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Outcome of checking a request against the URL rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Unauthenticated,
    Forbidden,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Unauthenticated => "unauthenticated",
            Decision::Forbidden => "forbidden",
        }
    }
}

/// The compiled, immutable runtime security context.
#[derive(Debug, Default)]
pub struct SecurityContext {
    by_token: HashMap<String, Subject>,
    by_name: HashMap<String, Subject>,
    rules: Vec<(UrlPattern, Access)>,
}

impl SecurityContext {
    /// Compile and validate a parsed rule file.
    pub fn compile(file: RuleFile) -> Result<Self, EngineError> {
        let mut context = SecurityContext::default();

        for (name, user) in file.users {
            if user.token.trim().is_empty() {
                return Err(EngineError::InvalidRule(format!("user '{}' has an empty token", name)));
            }
            let subject = Subject {
                name: name.clone(),
                roles: user.roles,
            };
            if context.by_token.insert(user.token, subject.clone()).is_some() {
                return Err(EngineError::InvalidRule(format!("user '{}' reuses another user's token", name)));
            }
            context.by_name.insert(name, subject);
        }

        for rule in file.urls {
            let pattern = UrlPattern::parse(&rule.pattern)
                .map_err(|e| EngineError::InvalidRule(e.to_string()))?;
            context.rules.push((pattern, Access::parse(&rule.access)?));
        }

        Ok(context)
    }

    pub fn authenticate(&self, token: &str) -> Option<&Subject> {
        self.by_token.get(token)
    }

    pub fn subject(&self, name: &str) -> Option<&Subject> {
        self.by_name.get(name)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn user_count(&self) -> usize {
        self.by_name.len()
    }

    /// First matching rule wins; no matching rule allows the request.
    pub fn authorize(&self, path: &str, subject: Option<&Subject>) -> Decision {
        let Some((_, access)) = self.rules.iter().find(|(pattern, _)| pattern.matches(path)) else {
            return Decision::Allow;
        };

        match (access, subject) {
            (Access::Anonymous, _) => Decision::Allow,
            (_, None) => Decision::Unauthenticated,
            (Access::Authenticated, Some(_)) => Decision::Allow,
            (Access::Roles(roles), Some(subject)) => {
                if roles.iter().all(|r| subject.has_role(r)) {
                    Decision::Allow
                } else {
                    Decision::Forbidden
                }
            }
        }
    }
}

/// Candidate rule file paths, in the order they are tried.
pub fn candidate_locations(context: &ContextParameters) -> Vec<PathBuf> {
    match context.get(CONFIG_LOCATIONS_PARAM) {
        Some(value) if !value.trim().is_empty() => value
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect(),
        _ => DEFAULT_CONFIG_LOCATIONS.iter().map(PathBuf::from).collect(),
    }
}

/// Resolve the first existing candidate.
pub fn resolve_location(context: &ContextParameters) -> Result<PathBuf, EngineError> {
    let candidates = candidate_locations(context);
    let found = candidates.iter().find(|p| p.is_file()).cloned();
    found.ok_or(EngineError::ConfigNotFound(candidates))
}

/// Read, parse, and compile a rule file.
pub fn load_rules(path: &Path) -> Result<SecurityContext, EngineError> {
    let content = fs::read_to_string(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: RuleFile = toml::from_str(&content).map_err(|source| EngineError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    SecurityContext::compile(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &str = r#"
        [users.alice]
        token = "alice-token"
        roles = ["admin", "ops"]

        [users.bob]
        token = "bob-token"

        [[urls]]
        pattern = "/secure/login"
        access = "anon"

        [[urls]]
        pattern = "/secure/admin/*"
        access = "roles:admin"

        [[urls]]
        pattern = "/secure/*"
        access = "authc"
    "#;

    fn context() -> SecurityContext {
        SecurityContext::compile(toml::from_str(RULES).unwrap()).unwrap()
    }

    #[test]
    fn test_access_parse() {
        assert_eq!(Access::parse("anon").unwrap(), Access::Anonymous);
        assert_eq!(Access::parse(" authc ").unwrap(), Access::Authenticated);
        assert_eq!(
            Access::parse("roles:admin, ops").unwrap(),
            Access::Roles(vec!["admin".into(), "ops".into()])
        );
        assert!(Access::parse("roles:").is_err());
        assert!(Access::parse("perms:read").is_err());
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let ctx = context();
        let alice = ctx.authenticate("alice-token").cloned();
        let bob = ctx.authenticate("bob-token").cloned();

        assert_eq!(ctx.authorize("/secure/login", None), Decision::Allow);
        assert_eq!(ctx.authorize("/secure/data", None), Decision::Unauthenticated);
        assert_eq!(ctx.authorize("/secure/data", bob.as_ref()), Decision::Allow);
        assert_eq!(ctx.authorize("/secure/admin/users", bob.as_ref()), Decision::Forbidden);
        assert_eq!(ctx.authorize("/secure/admin/users", alice.as_ref()), Decision::Allow);
        assert_eq!(ctx.authorize("/elsewhere", None), Decision::Allow);
    }

    #[test]
    fn test_duplicate_token_rejected() {
        let file: RuleFile = toml::from_str(
            "[users.a]\ntoken = \"same\"\n[users.b]\ntoken = \"same\"\n",
        )
        .unwrap();
        assert!(matches!(SecurityContext::compile(file), Err(EngineError::InvalidRule(_))));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let file: RuleFile = toml::from_str("[[urls]]\npattern = \"admin\"\naccess = \"authc\"\n").unwrap();
        assert!(matches!(SecurityContext::compile(file), Err(EngineError::InvalidRule(_))));
    }

    #[test]
    fn test_default_locations_without_parameter() {
        let candidates = candidate_locations(&ContextParameters::default());
        assert_eq!(
            candidates,
            vec![PathBuf::from("security.toml"), PathBuf::from("config/security.toml")]
        );
    }

    #[test]
    fn test_parameter_replaces_defaults() {
        let params: ContextParameters =
            [(CONFIG_LOCATIONS_PARAM, "/etc/app/rules.toml, ./rules.toml")].into_iter().collect();
        assert_eq!(
            candidate_locations(&params),
            vec![PathBuf::from("/etc/app/rules.toml"), PathBuf::from("./rules.toml")]
        );
    }

    #[test]
    fn test_resolve_picks_first_existing() {
        let dir = tempfile::tempdir().unwrap();
        let second = dir.path().join("second.toml");
        fs::write(&second, RULES).unwrap();
        let missing = dir.path().join("first.toml");

        let value = format!("{},{}", missing.display(), second.display());
        let params: ContextParameters = [(CONFIG_LOCATIONS_PARAM, value)].into_iter().collect();

        assert_eq!(resolve_location(&params).unwrap(), second);
        assert_eq!(load_rules(&second).unwrap().user_count(), 2);
    }

    #[test]
    fn test_resolve_reports_all_candidates() {
        let params: ContextParameters =
            [(CONFIG_LOCATIONS_PARAM, "/nonexistent/a.toml")].into_iter().collect();
        match resolve_location(&params) {
            Err(EngineError::ConfigNotFound(tried)) => {
                assert_eq!(tried, vec![PathBuf::from("/nonexistent/a.toml")]);
            }
            other => panic!("expected ConfigNotFound, got {:?}", other),
        }
    }
}
