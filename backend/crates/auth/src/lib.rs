//! Auth (Authentication) Backend Module
//!
//! The authentication core of the brewery backend:
//! - `domain/` - principals, authorities, the user-store boundary trait and
//!   the authorization rule table
//! - `application/` - the authentication decision service and configuration
//! - `infra/` - in-memory and PostgreSQL user stores, seed data
//! - `presentation/` - credential extraction strategies, the inbound
//!   authentication filter, access enforcement, router and demo handlers
//!
//! ## Security Model
//! - Credentials travel either in the `Api-Key`/`Api-Secret` headers or in
//!   the `apiKey`/`apiSecret` parameters; one filter instance per transport,
//!   both scoped to the `/api` prefix, header transport wins
//! - Stored passwords are verified through the tagged multi-algorithm
//!   registry in `platform::password`
//! - Authentication failure never rejects a request by itself; rejection is
//!   the access policy's decision, so public routes keep working anonymously
//! - Unknown identifier and wrong secret are indistinguishable to callers

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::authenticate::AuthenticationService;
pub use application::config::AuthConfig;
pub use domain::access::{Access, AccessDecision, AccessPolicy, AccessRule, PathPattern};
pub use domain::entity::principal::{Principal, SecurityContext};
pub use domain::repository::UserStore;
pub use error::{AuthError, AuthResult};
pub use infra::memory::{InMemoryUserStore, seed_default_users};
pub use infra::postgres::PgUserStore;
pub use presentation::router::{brewery_access_policy, brewery_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
