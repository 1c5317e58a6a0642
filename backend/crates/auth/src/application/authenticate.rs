//! Authentication Decision Service
//!
//! Takes candidate credentials, loads the principal from the user store
//! and verifies the secret through the password registry. Every failure
//! collapses to [`AuthError::BadCredentials`] before it leaves this
//! module; the specific reason is recorded in the log only, so the
//! response never reveals whether an account exists.

use std::sync::Arc;

use platform::password::{DelegatingPasswordEncoder, PasswordEncoder};

use crate::domain::entity::principal::Principal;
use crate::domain::repository::UserStore;
use crate::domain::value_object::credentials::Credentials;
use crate::error::{AuthError, AuthResult};

/// Internal failure classification, for diagnostics only
#[derive(Debug, Clone, Copy)]
enum FailureReason {
    UnknownIdentifier,
    SecretMismatch,
    AccountDisabled,
}

/// The authentication decision service
///
/// Stateless across requests; holds only the immutable store handle and
/// the password registry, so one instance serves all requests concurrently.
pub struct AuthenticationService<S>
where
    S: UserStore,
{
    store: Arc<S>,
    encoder: Arc<DelegatingPasswordEncoder>,
}

impl<S> AuthenticationService<S>
where
    S: UserStore,
{
    pub fn new(store: Arc<S>, encoder: Arc<DelegatingPasswordEncoder>) -> Self {
        Self { store, encoder }
    }

    /// Decide one authentication attempt
    ///
    /// Store errors propagate as-is; they are infrastructure failures, not
    /// authentication outcomes.
    pub async fn authenticate(&self, credentials: &Credentials) -> AuthResult<Principal> {
        let user = self.store.find_by_username(credentials.identifier()).await?;

        let user = match user {
            Some(user) => user,
            None => return Err(self.rejected(credentials, FailureReason::UnknownIdentifier)),
        };

        if !user.enabled {
            return Err(self.rejected(credentials, FailureReason::AccountDisabled));
        }

        if !self.encoder.matches(credentials.secret(), &user.password) {
            return Err(self.rejected(credentials, FailureReason::SecretMismatch));
        }

        tracing::debug!(user = %user.username, "Authentication succeeded");
        Ok(Principal::from(user))
    }

    fn rejected(&self, credentials: &Credentials, reason: FailureReason) -> AuthError {
        // Identifier and reason stay server-side; the caller only ever
        // sees BadCredentials
        tracing::debug!(
            identifier = %credentials.identifier(),
            reason = ?reason,
            "Authentication rejected"
        );
        AuthError::BadCredentials
    }
}
