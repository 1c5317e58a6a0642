//! End-to-end tests over the assembled router
//!
//! Each test drives the full stack with `tower::ServiceExt::oneshot`:
//! both authentication filters, the access policy and the demo handlers.
//! The user store is wrapped in a lookup counter so the tests can assert
//! when the filters did and did not attempt authentication.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::body::{Body, to_bytes};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use axum::routing::post;
use axum::{Router, middleware};
use platform::password::{
    Argon2Encoder, DelegatingPasswordEncoder, NoopEncoder, PasswordEncoder, RawSecret,
    Sha256Encoder, TAG_ARGON2, TAG_NOOP, TAG_SHA256,
};
use tower::ServiceExt;

use crate::application::authenticate::AuthenticationService;
use crate::application::config::AuthConfig;
use crate::domain::access::PathPattern;
use crate::domain::entity::user::User;
use crate::domain::repository::UserStore;
use crate::domain::value_object::authority::Authority;
use crate::domain::value_object::username::Username;
use crate::error::AuthResult;
use crate::infra::memory::InMemoryUserStore;
use crate::presentation::extract::ParamCredentialExtractor;
use crate::presentation::middleware::{RestAuthState, rest_auth_filter};
use crate::presentation::router::{brewery_access_policy, brewery_router};

/// User store that counts lookups, so tests can tell whether a filter
/// actually attempted authentication
#[derive(Clone, Default)]
struct CountingStore {
    inner: InMemoryUserStore,
    lookups: Arc<AtomicUsize>,
}

impl CountingStore {
    fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl UserStore for CountingStore {
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_username(username).await
    }
}

/// Registry with deliberately cheap argon2 parameters to keep tests fast
fn fast_encoder() -> DelegatingPasswordEncoder {
    let mut encoders: HashMap<String, Arc<dyn PasswordEncoder>> = HashMap::new();
    encoders.insert(
        TAG_ARGON2.to_string(),
        Arc::new(Argon2Encoder::new(1024, 1, 1).unwrap()),
    );
    encoders.insert(TAG_NOOP.to_string(), Arc::new(NoopEncoder));
    encoders.insert(TAG_SHA256.to_string(), Arc::new(Sha256Encoder::default()));
    DelegatingPasswordEncoder::new(TAG_ARGON2, encoders)
        .and_then(|e| e.with_fallback(TAG_SHA256))
        .unwrap()
}

fn user(name: &str, password: impl Into<String>, authorities: &[&str]) -> User {
    User::new(
        Username::new(name).unwrap(),
        password,
        authorities.iter().map(|a| Authority::from(*a)),
    )
}

/// Store with the default accounts across all stored-value shapes:
/// spring is argon2-tagged, scott is noop-tagged, elton is an untagged
/// legacy value handled by the sha256 fallback
fn fixture() -> (CountingStore, Router) {
    let encoder = fast_encoder();

    let argon2_guru = encoder.encode(&RawSecret::new("guru")).unwrap();
    let legacy = Sha256Encoder::default()
        .encode(&RawSecret::new("legacy-pass"))
        .unwrap();

    let store = CountingStore::default();
    store.inner.insert(user(
        "spring",
        argon2_guru,
        &[
            "beer.create",
            "beer.read",
            "beer.update",
            "beer.delete",
            "customer.read",
        ],
    ));
    store
        .inner
        .insert(user("scott", "{noop}tiger", &["beer.read", "customer.read"]));
    store.inner.insert(user("elton", legacy, &["beer.read"]));

    let app = brewery_router(
        Arc::new(store.clone()),
        Arc::new(encoder),
        &AuthConfig::default(),
        brewery_access_policy(),
    );
    (store, app)
}

async fn send(app: &Router, req: Request<Body>) -> axum::response::Response {
    app.clone().oneshot(req).await.unwrap()
}

fn get(uri: &str) -> axum::http::request::Builder {
    Request::builder().uri(uri)
}

#[tokio::test]
async fn test_header_credentials_reach_protected_route() {
    let (store, app) = fixture();

    let res = send(
        &app,
        get("/api/v1/beer")
            .header("Api-Key", "spring")
            .header("Api-Secret", "guru")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(store.lookups(), 1);
}

#[tokio::test]
async fn test_wrong_param_secret_is_unauthorized() {
    let (_, app) = fixture();

    let res = send(
        &app,
        get("/api/v1/beer?apiKey=scott&apiSecret=wrong")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_public_route_needs_no_credentials() {
    let (store, app) = fixture();

    let res = send(&app, get("/").body(Body::empty()).unwrap()).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(store.lookups(), 0);
}

#[tokio::test]
async fn test_filters_skip_paths_outside_their_scope() {
    let (store, app) = fixture();

    // /customers is outside /api/**, so the filters never run and the
    // credentials are never read
    let res = send(
        &app,
        get("/customers")
            .header("Api-Key", "spring")
            .header("Api-Secret", "guru")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(store.lookups(), 0);
}

#[tokio::test]
async fn test_untagged_legacy_value_verifies_via_fallback() {
    let (_, app) = fixture();

    let res = send(
        &app,
        get("/api/v1/beer")
            .header("Api-Key", "elton")
            .header("Api-Secret", "legacy-pass")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_header_transport_wins_over_params() {
    let (store, app) = fixture();

    let res = send(
        &app,
        get("/api/v1/beer?apiKey=scott&apiSecret=tiger")
            .header("Api-Key", "spring")
            .header("Api-Secret", "guru")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    // The header filter authenticates spring; the parameter filter must
    // skip the already-authenticated request
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(store.lookups(), 1);
}

#[tokio::test]
async fn test_param_transport_tried_after_header_failure() {
    let (store, app) = fixture();

    let res = send(
        &app,
        get("/api/v1/beer?apiKey=scott&apiSecret=tiger")
            .header("Api-Key", "spring")
            .header("Api-Secret", "wrong")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(store.lookups(), 2);
}

#[tokio::test]
async fn test_delete_requires_delete_authority() {
    let (_, app) = fixture();

    // scott reads beers but cannot delete them
    let res = send(
        &app,
        get("/api/v1/beer/1")
            .method("DELETE")
            .header("Api-Key", "scott")
            .header("Api-Secret", "tiger")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = send(
        &app,
        get("/api/v1/beer/1")
            .method("DELETE")
            .header("Api-Key", "spring")
            .header("Api-Secret", "guru")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_missing_credentials_on_protected_route() {
    let (store, app) = fixture();

    let res = send(&app, get("/api/v1/beer").body(Body::empty()).unwrap()).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(store.lookups(), 0);
}

#[tokio::test]
async fn test_unknown_user_and_wrong_secret_are_indistinguishable() {
    let (_, app) = fixture();

    let unknown = send(
        &app,
        get("/api/v1/beer")
            .header("Api-Key", "nobody")
            .header("Api-Secret", "guru")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    let mismatch = send(
        &app,
        get("/api/v1/beer")
            .header("Api-Key", "spring")
            .header("Api-Secret", "wrong")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), mismatch.status());

    let unknown_body = to_bytes(unknown.into_body(), 4096).await.unwrap();
    let mismatch_body = to_bytes(mismatch.into_body(), 4096).await.unwrap();
    assert_eq!(unknown_body, mismatch_body);
}

#[tokio::test]
async fn test_form_body_credentials_authenticate() {
    let (store, app) = fixture();

    // No POST route exists, so an authenticated request gets 405 while an
    // unauthenticated one is turned away with 401 first
    let payload = "apiKey=scott&apiSecret=tiger";
    let res = send(
        &app,
        Request::builder()
            .uri("/api/v1/beer")
            .method("POST")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(CONTENT_LENGTH, payload.len().to_string())
            .body(Body::from(payload))
            .unwrap(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(store.lookups(), 1);

    let res = send(
        &app,
        Request::builder()
            .uri("/api/v1/beer")
            .method("POST")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_oversized_form_body_reaches_handler_intact() {
    // The filter must decide from Content-Length alone; a body over the
    // buffering limit is never consumed, so a downstream handler still
    // sees every byte
    let store = CountingStore::default();
    let service = Arc::new(AuthenticationService::new(
        Arc::new(store.clone()),
        Arc::new(fast_encoder()),
    ));
    let filter = RestAuthState {
        service,
        matcher: PathPattern::new("/api/**"),
        extractor: ParamCredentialExtractor::new("apiKey", "apiSecret"),
    };
    let app = Router::new()
        .route(
            "/api/echo",
            post(|body: String| async move { body.len().to_string() }),
        )
        .layer(middleware::from_fn_with_state(
            filter,
            rest_auth_filter::<CountingStore, ParamCredentialExtractor>,
        ));

    let payload = format!("apiKey=scott&apiSecret={}", "x".repeat(20 * 1024));
    let res = send(
        &app,
        Request::builder()
            .uri("/api/echo")
            .method("POST")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(CONTENT_LENGTH, payload.len().to_string())
            .body(Body::from(payload.clone()))
            .unwrap(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let echoed = to_bytes(res.into_body(), 4096).await.unwrap();
    assert_eq!(echoed, payload.len().to_string().as_bytes());
    // No extraction means no authentication attempt either
    assert_eq!(store.lookups(), 0);
}

#[tokio::test]
async fn test_upc_lookup_with_query_credentials() {
    let (_, app) = fixture();

    let res = send(
        &app,
        get("/api/v1/beerUpc/0631234200036?apiKey=scott&apiSecret=tiger")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body = to_bytes(res.into_body(), 4096).await.unwrap();
    let beer: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(beer["beerName"], "Mango Bobs");
}

#[tokio::test]
async fn test_disabled_account_is_rejected() {
    let (store, app) = fixture();
    store
        .inner
        .insert(user("gone", "{noop}secret", &["beer.read"]).disabled());

    let res = send(
        &app,
        get("/api/v1/beer")
            .header("Api-Key", "gone")
            .header("Api-Secret", "secret")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unlisted_route_falls_through_to_authenticated() {
    let (_, app) = fixture();

    // Any authenticated principal passes the fallthrough rule, but the
    // router has no such route
    let res = send(
        &app,
        get("/api/v1/unlisted?apiKey=scott&apiSecret=tiger")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = send(&app, get("/api/v1/unlisted").body(Body::empty()).unwrap()).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
