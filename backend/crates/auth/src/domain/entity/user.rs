//! User Entity
//!
//! The stored account the authentication path reads: username, stored
//! password encoding and the flattened authority set. Role grouping lives
//! in the user store; by the time a `User` reaches this crate the roles
//! have been flattened away.

use std::collections::HashSet;

use crate::domain::value_object::authority::Authority;
use crate::domain::value_object::username::Username;

/// Stored user account
#[derive(Debug, Clone)]
pub struct User {
    /// Unique account name
    pub username: Username,
    /// Stored password in `{tag}encoded` form
    pub password: String,
    /// Disabled accounts never authenticate
    pub enabled: bool,
    /// Flattened authority set (roles already resolved by the store)
    pub authorities: HashSet<Authority>,
}

impl User {
    pub fn new(
        username: Username,
        password: impl Into<String>,
        authorities: impl IntoIterator<Item = Authority>,
    ) -> Self {
        Self {
            username,
            password: password.into(),
            enabled: true,
            authorities: authorities.into_iter().collect(),
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn has_authority(&self, authority: &Authority) -> bool {
        self.authorities.contains(authority)
    }
}
