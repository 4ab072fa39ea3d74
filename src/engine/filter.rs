//! Request filter delegating to the loaded security context.
//!
//! # Responsibilities
//! - Authenticate `Authorization: Bearer <token>` against the context
//! - Remember the subject in the session, when a session layer is present
//! - Apply the URL rules and reject with 401/403
//! - Attach the authenticated `Subject` to request extensions

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use axum::{
    body::Body,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures_util::future::BoxFuture;
use tower_sessions::Session;

use crate::engine::rules::{Decision, SecurityContext, Subject};
use crate::host::filter::RequestFilter;
use crate::observability::metrics;

/// Session key holding the authenticated subject's name.
pub const SESSION_SUBJECT_KEY: &str = "security.subject";

pub struct SecurityFilter {
    slot: Arc<ArcSwapOption<SecurityContext>>,
}

impl SecurityFilter {
    pub fn new(slot: Arc<ArcSwapOption<SecurityContext>>) -> Self {
        Self { slot }
    }

    async fn enforce(&self, mut request: Request<Body>, next: Next) -> Response {
        let Some(context) = self.slot.load_full() else {
            tracing::error!(path = %request.uri().path(), "Security context not initialized");
            metrics::record_filter_decision("uninitialized");
            return (StatusCode::SERVICE_UNAVAILABLE, "Security context not initialized").into_response();
        };

        let session = request.extensions().get::<Session>().cloned();
        let token = bearer_token(&request).map(String::from);
        let subject = resolve_subject(&context, token.as_deref(), session.as_ref()).await;

        let decision = context.authorize(request.uri().path(), subject.as_ref());
        metrics::record_filter_decision(decision.as_str());

        match decision {
            Decision::Allow => {
                if let Some(subject) = subject {
                    request.extensions_mut().insert(subject);
                }
                next.run(request).await
            }
            Decision::Unauthenticated => {
                tracing::debug!(path = %request.uri().path(), "Rejecting unauthenticated request");
                let mut response = (StatusCode::UNAUTHORIZED, "Authentication required").into_response();
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            Decision::Forbidden => {
                tracing::debug!(
                    path = %request.uri().path(),
                    subject = subject.as_ref().map(|s| s.name.as_str()).unwrap_or_default(),
                    "Rejecting unauthorized request"
                );
                (StatusCode::FORBIDDEN, "Forbidden").into_response()
            }
        }
    }
}

impl RequestFilter for SecurityFilter {
    fn filter<'a>(&'a self, request: Request<Body>, next: Next) -> BoxFuture<'a, Response> {
        Box::pin(self.enforce(request, next))
    }
}

fn bearer_token(request: &Request<Body>) -> Option<&str> {
    let value = request.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("Bearer").then(|| token.trim())
}

/// A presented token decides alone; only token-less requests fall back to
/// the session.
async fn resolve_subject(
    context: &SecurityContext,
    token: Option<&str>,
    session: Option<&Session>,
) -> Option<Subject> {
    if let Some(token) = token {
        let subject = context.authenticate(token).cloned()?;
        if let Some(session) = session {
            remember(session, &subject).await;
        }
        return Some(subject);
    }

    let session = session?;
    match session.get::<String>(SESSION_SUBJECT_KEY).await {
        Ok(Some(name)) => context.subject(&name).cloned(),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read subject from session");
            None
        }
    }
}

/// Log `subject` into the session unless it already is, cycling the id.
async fn remember(session: &Session, subject: &Subject) {
    match session.get::<String>(SESSION_SUBJECT_KEY).await {
        Ok(Some(name)) if name == subject.name => return,
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "Failed to read subject from session"),
    }

    if session.id().is_some() {
        if let Err(e) = session.cycle_id().await {
            tracing::warn!(error = %e, "Failed to cycle session id");
        }
    }
    if let Err(e) = session.insert(SESSION_SUBJECT_KEY, &subject.name).await {
        tracing::warn!(error = %e, "Failed to store subject in session");
    }
}
