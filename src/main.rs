//! Security bundle demo service.
//!
//! # Architecture Overview
//!
//! ```text
//!   service.toml ──▶ config::loader ──▶ ServiceConfig
//!                                           │
//!                                           ▼
//!                     lifecycle::Bootstrap ──▶ SecurityBundle ──▶ host::Environment
//!                                                                 │ session handler
//!                                                                 │ context loader
//!                                                                 │ security filter
//!                                                                 ▼
//!   Client ──▶ http::HttpServer ──▶ [session] ──▶ [filter] ──▶ echo handlers
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use security_bundle::config::loader::load_config;
use security_bundle::host::ContextParameters;
use security_bundle::lifecycle::signals;
use security_bundle::observability::{logging, metrics};
use security_bundle::{Bootstrap, Environment, HttpServer, SecurityBundle, ServiceConfig, Shutdown};

#[derive(Parser)]
#[command(name = "security-bundle")]
#[command(about = "HTTP service with a config-driven security layer", long_about = None)]
struct Cli {
    /// Path to the service configuration (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?cli.config,
        "security-bundle starting"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let mut bootstrap = Bootstrap::new();
    bootstrap.add_bundle(SecurityBundle::new(|c: &ServiceConfig| c.security.clone()));

    let mut environment = Environment::new(ContextParameters::new(
        config.server.context_parameters.clone(),
    ));
    tracing::debug!(bundles = bootstrap.len(), "Running bundles");
    bootstrap.run(&config, &mut environment)?;
    environment.start()?;

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let server = HttpServer::new(&config.server, &environment);

    let shutdown = Shutdown::new();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::forward_to(&signal_shutdown).await;
    });

    server.run(listener, shutdown).await?;
    environment.stop();

    tracing::info!("Shutdown complete");
    Ok(())
}
