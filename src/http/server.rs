//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the application handlers
//! - Wrap it with everything registered on the environment
//! - Wire up tracing and request timeout middleware
//! - Serve until shutdown is triggered

use std::time::Duration;

use axum::{
    body::Body,
    http::Request,
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::engine::Subject;
use crate::host::Environment;
use crate::lifecycle::Shutdown;

/// HTTP server for the host service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Build the server from config and a fully registered environment.
    pub fn new(config: &ServerConfig, environment: &Environment) -> Self {
        Self {
            router: Self::build_router(config, environment),
        }
    }

    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, environment: &Environment) -> Router {
        let app = Router::new()
            .route("/health", get(health_handler))
            .route("/", any(echo_handler))
            .route("/{*path}", any(echo_handler));

        environment
            .wrap_router(app)
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// The assembled router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Echo the path and the authenticated subject, if any.
async fn echo_handler(request: Request<Body>) -> String {
    let subject = request
        .extensions()
        .get::<Subject>()
        .map(|s| s.name.as_str())
        .unwrap_or("anonymous");
    format!("{} {} as {}", request.method(), request.uri().path(), subject)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_unsecured_server_echoes() {
        let server = HttpServer::new(&ServerConfig::default(), &Environment::default());
        let res = server
            .router()
            .oneshot(Request::get("/reports/7").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"GET /reports/7 as anonymous");
    }
}
