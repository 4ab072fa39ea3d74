//! Named, URL-scoped request filters.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use futures_util::future::BoxFuture;

use crate::host::url_pattern::UrlPattern;

/// A request filter installed into the host pipeline.
///
/// The filter either answers the request itself or hands it to `next`.
pub trait RequestFilter: Send + Sync {
    fn filter<'a>(&'a self, request: Request<Body>, next: Next) -> BoxFuture<'a, Response>;
}

/// A filter as registered with the environment.
#[derive(Clone)]
pub struct FilterRegistration {
    pub name: String,
    pub pattern: UrlPattern,
    pub filter: Arc<dyn RequestFilter>,
}

impl std::fmt::Debug for FilterRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterRegistration")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

/// Middleware running a registered filter only for paths inside its scope.
pub async fn scoped_filter_middleware(
    State(registration): State<Arc<FilterRegistration>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if registration.pattern.matches(request.uri().path()) {
        tracing::trace!(filter = %registration.name, path = %request.uri().path(), "Filter applies");
        registration.filter.filter(request, next).await
    } else {
        next.run(request).await
    }
}
