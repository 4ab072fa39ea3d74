//! Shared utilities for integration tests.

use std::path::PathBuf;

use security_bundle::config::schema::SecurityConfig;
use security_bundle::engine::rules::CONFIG_LOCATIONS_PARAM;
use security_bundle::host::ContextParameters;
use security_bundle::{Bootstrap, Environment, SecurityBundle, ServiceConfig};
use tempfile::TempDir;

pub const RULES: &str = r#"
[users.alice]
token = "alice-token"
roles = ["admin"]

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

/// Write the standard rule file into a fresh temp dir.
pub fn write_rules() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("security.toml");
    std::fs::write(&path, RULES).unwrap();
    (dir, path)
}

/// Host configuration pointing the engine at `rules`.
pub fn service_config(security: Option<SecurityConfig>, rules: &PathBuf) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config
        .server
        .context_parameters
        .insert(CONFIG_LOCATIONS_PARAM.to_string(), rules.display().to_string());
    config.security = security;
    config
}

/// Run the security bundle and start listeners, the way the binary does.
pub fn started_environment(config: &ServiceConfig) -> Environment {
    let environment = Environment::new(ContextParameters::new(
        config.server.context_parameters.clone(),
    ));
    start(config, environment)
}

/// Same as `started_environment`, on an environment the host already prepared.
pub fn start(config: &ServiceConfig, mut environment: Environment) -> Environment {
    let mut bootstrap = Bootstrap::new();
    bootstrap.add_bundle(SecurityBundle::new(|c: &ServiceConfig| c.security.clone()));

    bootstrap.run(config, &mut environment).unwrap();
    environment.start().unwrap();
    environment
}
