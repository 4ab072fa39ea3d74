//! The host environment's registration surface.
//!
//! # Responsibilities
//! - Hold the single session handler slot
//! - Record lifecycle listeners and named URL-scoped filters in order
//! - Run listeners at startup and shutdown
//! - Assemble the final Axum router
//!
//! # Design Decisions
//! - Registration happens before serving, so the surface is `&mut`, not locked
//! - Registries are append-only; filter names are unique
//! - Session layer is outermost, then filters in registration order

use std::sync::Arc;

use axum::{middleware, Router};
use thiserror::Error;

use crate::host::filter::{scoped_filter_middleware, FilterRegistration, RequestFilter};
use crate::host::listener::{ContextParameters, LifecycleListener, ListenerError};
use crate::host::session::SessionHandler;
use crate::host::url_pattern::{PatternError, UrlPattern};

/// The host registry rejected a registration.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("a filter named '{0}' is already registered")]
    DuplicateFilter(String),

    #[error("filter '{name}' has an invalid URL pattern: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: PatternError,
    },
}

/// One entry of the registration journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    SessionHandler,
    Listener(String),
    Filter { name: String, url_pattern: String },
}

/// The mutable surface bundles register pipeline components with.
pub trait HostEnvironment {
    /// The currently installed session handler, if any.
    fn session_handler(&self) -> Option<&SessionHandler>;

    /// Install a session handler, replacing the slot's content.
    fn set_session_handler(&mut self, handler: SessionHandler);

    /// Append a lifecycle listener.
    fn add_lifecycle_listener(&mut self, listener: Box<dyn LifecycleListener>);

    /// Append a named filter scoped to `url_pattern`.
    fn add_filter(
        &mut self,
        name: &str,
        url_pattern: &str,
        filter: Arc<dyn RequestFilter>,
    ) -> Result<(), RegistrationError>;
}

/// The concrete environment used by the service binary.
#[derive(Default)]
pub struct Environment {
    context: ContextParameters,
    session_handler: Option<SessionHandler>,
    listeners: Vec<Box<dyn LifecycleListener>>,
    filters: Vec<Arc<FilterRegistration>>,
    journal: Vec<Registration>,
}

impl Environment {
    /// Create an environment exposing the given context parameters.
    pub fn new(context: ContextParameters) -> Self {
        Self {
            context,
            ..Self::default()
        }
    }

    /// Every registration in the order it happened.
    pub fn registrations(&self) -> &[Registration] {
        &self.journal
    }

    pub fn filters(&self) -> impl Iterator<Item = &FilterRegistration> {
        self.filters.iter().map(Arc::as_ref)
    }

    pub fn listener_names(&self) -> impl Iterator<Item = &str> {
        self.listeners.iter().map(|l| l.name())
    }

    /// Run `context_initialized` on every listener in registration order.
    ///
    /// The first failure aborts startup.
    pub fn start(&self) -> Result<(), ListenerError> {
        for listener in &self.listeners {
            tracing::debug!(listener = listener.name(), "Initializing listener");
            listener.context_initialized(&self.context)?;
        }
        tracing::info!(
            listeners = self.listeners.len(),
            filters = self.filters.len(),
            session_handler = self.session_handler.is_some(),
            "Environment started"
        );
        Ok(())
    }

    /// Run `context_destroyed` on every listener in reverse order.
    pub fn stop(&self) {
        for listener in self.listeners.iter().rev() {
            tracing::debug!(listener = listener.name(), "Destroying listener");
            listener.context_destroyed(&self.context);
        }
    }

    /// Wrap `app` with the registered filters and session handler.
    pub fn wrap_router(&self, app: Router) -> Router {
        // Layers added later wrap earlier ones, so apply filters back to front.
        let mut router = app;
        for registration in self.filters.iter().rev() {
            router = router.layer(middleware::from_fn_with_state(
                registration.clone(),
                scoped_filter_middleware,
            ));
        }
        if let Some(handler) = &self.session_handler {
            router = router.layer(handler.layer());
        }
        router
    }
}

impl HostEnvironment for Environment {
    fn session_handler(&self) -> Option<&SessionHandler> {
        self.session_handler.as_ref()
    }

    fn set_session_handler(&mut self, handler: SessionHandler) {
        self.session_handler = Some(handler);
        self.journal.push(Registration::SessionHandler);
    }

    fn add_lifecycle_listener(&mut self, listener: Box<dyn LifecycleListener>) {
        self.journal.push(Registration::Listener(listener.name().to_string()));
        self.listeners.push(listener);
    }

    fn add_filter(
        &mut self,
        name: &str,
        url_pattern: &str,
        filter: Arc<dyn RequestFilter>,
    ) -> Result<(), RegistrationError> {
        if self.filters.iter().any(|f| f.name == name) {
            return Err(RegistrationError::DuplicateFilter(name.to_string()));
        }
        let pattern = UrlPattern::parse(url_pattern).map_err(|source| {
            RegistrationError::InvalidPattern {
                name: name.to_string(),
                source,
            }
        })?;

        self.journal.push(Registration::Filter {
            name: name.to_string(),
            url_pattern: pattern.to_string(),
        });
        self.filters.push(Arc::new(FilterRegistration {
            name: name.to_string(),
            pattern,
            filter,
        }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware::Next,
        response::{IntoResponse, Response},
        routing::get,
    };
    use futures_util::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    struct Deny;

    impl RequestFilter for Deny {
        fn filter<'a>(&'a self, _request: Request<Body>, _next: Next) -> BoxFuture<'a, Response> {
            Box::pin(async { StatusCode::FORBIDDEN.into_response() })
        }
    }

    struct Counting {
        name: &'static str,
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl LifecycleListener for Counting {
        fn name(&self) -> &str {
            self.name
        }

        fn context_initialized(&self, _context: &ContextParameters) -> Result<(), ListenerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ListenerError::new(self.name, "boom"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_duplicate_filter_name_rejected() {
        let mut env = Environment::default();
        env.add_filter("guard", "/*", Arc::new(Deny)).unwrap();
        let err = env.add_filter("guard", "/api/*", Arc::new(Deny)).unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateFilter(name) if name == "guard"));
        assert_eq!(env.filters().count(), 1);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let mut env = Environment::default();
        let err = env.add_filter("guard", "api", Arc::new(Deny)).unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidPattern { .. }));
        assert!(env.registrations().is_empty());
    }

    #[test]
    fn test_start_stops_at_first_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut env = Environment::default();
        for (name, fail) in [("first", true), ("second", false)] {
            env.add_lifecycle_listener(Box::new(Counting {
                name,
                calls: calls.clone(),
                fail,
            }));
        }

        let err = env.start().unwrap_err();
        assert_eq!(err.listener, "first");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_filter_only_runs_inside_scope() {
        let mut env = Environment::default();
        env.add_filter("guard", "/secure/*", Arc::new(Deny)).unwrap();

        let app = Router::new()
            .route("/secure/data", get(|| async { "secret" }))
            .route("/public", get(|| async { "hello" }));
        let router = env.wrap_router(app);

        let res = router
            .clone()
            .oneshot(Request::get("/secure/data").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = router
            .oneshot(Request::get("/public").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
