//! Inbound Authentication Filter and Access Enforcement
//!
//! Two middleware stages. The authentication filter runs first: for
//! requests under its path scope it asks its extraction strategy for
//! credentials, authenticates them and, on success, installs a
//! [`SecurityContext`] into the request extensions. The filter never
//! rejects a request; a failed or absent attempt simply continues
//! unauthenticated. Rejection is the access-policy stage's job, which maps
//! the table's decision to 401 or 403.
//!
//! Several filter instances can be stacked, one per transport. The
//! outermost instance runs first and later instances skip requests that
//! already carry an authenticated context, so mounting order is the
//! transport precedence order.

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::application::authenticate::AuthenticationService;
use crate::domain::access::{AccessDecision, AccessPolicy, PathPattern};
use crate::domain::entity::principal::SecurityContext;
use crate::domain::repository::UserStore;
use crate::error::AuthError;
use crate::presentation::extract::{CredentialExtractor, FormParams};

/// Upper bound on a buffered urlencoded body; requests declaring more
/// pass through untouched with no extraction attempt
const FORM_BODY_LIMIT: usize = 16 * 1024;

/// State for one mounted authentication filter
pub struct RestAuthState<S, X>
where
    S: UserStore + Send + Sync + 'static,
    X: CredentialExtractor + Clone,
{
    pub service: Arc<AuthenticationService<S>>,
    /// Requests outside this scope pass through untouched
    pub matcher: PathPattern,
    pub extractor: X,
}

// S only lives behind the Arc, so Clone must not require S: Clone
impl<S, X> Clone for RestAuthState<S, X>
where
    S: UserStore + Send + Sync + 'static,
    X: CredentialExtractor + Clone,
{
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            matcher: self.matcher.clone(),
            extractor: self.extractor.clone(),
        }
    }
}

/// The inbound authentication filter
pub async fn rest_auth_filter<S, X>(
    State(state): State<RestAuthState<S, X>>,
    req: Request,
    next: Next,
) -> Response
where
    S: UserStore + Send + Sync + 'static,
    X: CredentialExtractor + Clone,
{
    if !state.matcher.matches(req.uri().path()) {
        return next.run(req).await;
    }

    // An earlier filter in the stack already authenticated this request
    if req
        .extensions()
        .get::<SecurityContext>()
        .is_some_and(SecurityContext::is_authenticated)
    {
        return next.run(req).await;
    }

    let (parts, body) = req.into_parts();
    let (form, body) = if state.extractor.reads_form_body() && should_buffer_form(&parts) {
        match to_bytes(body, FORM_BODY_LIMIT).await {
            Ok(bytes) => {
                let form = FormParams::parse(&bytes);
                (form, Body::from(bytes))
            }
            Err(_) => {
                // Transport failure mid-body; there is nothing left to
                // hand downstream
                tracing::warn!("Failed to read form body, continuing without extraction");
                (None, Body::empty())
            }
        }
    } else {
        (None, body)
    };

    let credentials = state.extractor.extract(&parts, form.as_ref());
    let mut req = Request::from_parts(parts, body);

    let Some(credentials) = credentials else {
        return next.run(req).await;
    };

    match state.service.authenticate(&credentials).await {
        Ok(principal) => {
            tracing::debug!(user = %principal.username, "Security context established");
            req.extensions_mut()
                .insert(SecurityContext::authenticated(principal));
        }
        Err(AuthError::BadCredentials) => {
            // Continue anonymous; the access policy decides the response
            tracing::debug!("Authentication attempt failed, continuing unauthenticated");
        }
        Err(err) => {
            tracing::warn!(error = %err, "Authentication attempt errored, continuing unauthenticated");
        }
    }

    next.run(req).await
}

/// Whether this request's body may be buffered for extraction
///
/// Requires a urlencoded content type and a declared `Content-Length`
/// within [`FORM_BODY_LIMIT`]. The check runs before the body is touched,
/// so oversized or unsized bodies reach the handler intact; they just get
/// no parameter extraction.
fn should_buffer_form(parts: &Parts) -> bool {
    let urlencoded = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
    if !urlencoded {
        return false;
    }
    parts
        .headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .is_some_and(|len| len <= FORM_BODY_LIMIT as u64)
}

/// State for the access enforcement stage
#[derive(Clone)]
pub struct AccessPolicyState {
    pub policy: Arc<AccessPolicy>,
}

/// Evaluate the authorization rule table against the request's context
///
/// Runs after every authentication filter. A request with no context in
/// its extensions is evaluated as anonymous.
pub async fn enforce_access_policy(
    State(state): State<AccessPolicyState>,
    req: Request,
    next: Next,
) -> Response {
    let context = req
        .extensions()
        .get::<SecurityContext>()
        .cloned()
        .unwrap_or_default();

    match state.policy.decide(req.method(), req.uri().path(), &context) {
        AccessDecision::Allow => next.run(req).await,
        AccessDecision::RequireAuthentication => {
            AuthError::AuthenticationRequired.into_response()
        }
        AccessDecision::Deny => AuthError::AccessDenied.into_response(),
    }
}
