//! Repository Traits
//!
//! The narrow boundary to the external user store. The authentication path
//! is read-only: it looks a principal up by identifier and never mutates.

use crate::domain::entity::user::User;
use crate::error::AuthResult;

/// Read-only user lookup consumed by the authentication decision service
#[trait_variant::make(UserStore: Send)]
pub trait LocalUserStore {
    /// Find a user (with flattened authorities) by account name
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>>;
}
