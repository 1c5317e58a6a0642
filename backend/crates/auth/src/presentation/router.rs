//! Router Assembly
//!
//! Wires the demo routes, the two authentication filters and the access
//! enforcement stage into one `Router`. Layer ordering carries the
//! security semantics:
//!
//! - the header filter is mounted outermost so it runs first; when both
//!   transports carry credentials, the header transport wins and the
//!   parameter filter skips the already-authenticated request
//! - access enforcement is the innermost layer so it sees whatever context
//!   the filters installed

use std::sync::Arc;

use axum::middleware;
use axum::routing::get;
use axum::{Router, http::Method};
use platform::password::DelegatingPasswordEncoder;

use crate::application::authenticate::AuthenticationService;
use crate::application::config::AuthConfig;
use crate::domain::access::{AccessPolicy, PathPattern};
use crate::domain::repository::UserStore;
use crate::presentation::extract::{HeaderCredentialExtractor, ParamCredentialExtractor};
use crate::presentation::handlers;
use crate::presentation::middleware::{
    AccessPolicyState, RestAuthState, enforce_access_policy, rest_auth_filter,
};

/// The brewery authorization rule table
///
/// Beer reads require `beer.read`, deletes `beer.delete`, the customer
/// listing `customer.read`. The index stays public; anything unlisted
/// falls through to "authenticated".
pub fn brewery_access_policy() -> AccessPolicy {
    AccessPolicy::new()
        .permit_all("/")
        .require_any("/api/v1/beer/**", Some(Method::GET), ["beer.read"])
        .require_any("/api/v1/beer/**", Some(Method::DELETE), ["beer.delete"])
        .require_any("/api/v1/beerUpc/{upc}", Some(Method::GET), ["beer.read"])
        .require_any("/customers", None, ["customer.read"])
}

/// Assemble the full application router
pub fn brewery_router<S>(
    store: Arc<S>,
    encoder: Arc<DelegatingPasswordEncoder>,
    config: &AuthConfig,
    policy: AccessPolicy,
) -> Router
where
    S: UserStore + Send + Sync + 'static,
{
    let service = Arc::new(AuthenticationService::new(store, encoder));
    let matcher = PathPattern::new(&config.filter_pattern);

    let header_filter = RestAuthState {
        service: service.clone(),
        matcher: matcher.clone(),
        extractor: HeaderCredentialExtractor::from_config(config),
    };
    let param_filter = RestAuthState {
        service,
        matcher,
        extractor: ParamCredentialExtractor::from_config(config),
    };
    let access = AccessPolicyState {
        policy: Arc::new(policy),
    };

    Router::new()
        .route("/", get(handlers::index))
        .route("/api/v1/beer", get(handlers::list_beers))
        .route(
            "/api/v1/beer/{beer_id}",
            get(handlers::get_beer).delete(handlers::delete_beer),
        )
        .route("/api/v1/beerUpc/{upc}", get(handlers::get_beer_by_upc))
        .route("/customers", get(handlers::list_customers))
        .layer(middleware::from_fn_with_state(access, enforce_access_policy))
        .layer(middleware::from_fn_with_state(
            param_filter,
            rest_auth_filter::<S, ParamCredentialExtractor>,
        ))
        .layer(middleware::from_fn_with_state(
            header_filter,
            rest_auth_filter::<S, HeaderCredentialExtractor>,
        ))
}
