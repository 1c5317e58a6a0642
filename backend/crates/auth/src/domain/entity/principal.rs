//! Principal and Security Context
//!
//! The authenticated subject and the request-scoped holder that carries it.
//! The context travels in request extensions, so it is created and dropped
//! with the request; cross-request leakage is structurally impossible.

use std::collections::HashSet;

use crate::domain::entity::user::User;
use crate::domain::value_object::authority::Authority;
use crate::domain::value_object::username::Username;

/// The authenticated subject with its resolved authorities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: Username,
    pub authorities: HashSet<Authority>,
}

impl Principal {
    pub fn has_authority(&self, authority: &Authority) -> bool {
        self.authorities.contains(authority)
    }

    pub fn has_any_authority<'a>(
        &self,
        authorities: impl IntoIterator<Item = &'a Authority>,
    ) -> bool {
        authorities.into_iter().any(|a| self.has_authority(a))
    }
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            authorities: user.authorities,
        }
    }
}

/// Request-scoped holder of the authenticated principal, if any
///
/// Lives in the request's extensions. A request without a context (or with
/// `Anonymous`) is an unauthenticated request; downstream authorization
/// decides whether that is acceptable for the route.
#[derive(Debug, Clone, Default)]
pub enum SecurityContext {
    #[default]
    Anonymous,
    Authenticated(Principal),
}

impl SecurityContext {
    pub fn authenticated(principal: Principal) -> Self {
        Self::Authenticated(principal)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Authenticated(p) => Some(p),
            Self::Anonymous => None,
        }
    }
}
