//! In-Memory User Store
//!
//! `HashMap`-backed [`UserStore`] used in development mode and tests, plus
//! the default seed data. The map is only written during seeding; the
//! authentication path takes the read lock for a plain lookup.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use platform::password::{DelegatingPasswordEncoder, PasswordEncoder, RawSecret};

use crate::domain::entity::user::User;
use crate::domain::repository::UserStore;
use crate::domain::value_object::authority::Authority;
use crate::domain::value_object::username::Username;
use crate::error::{AuthError, AuthResult};

/// In-memory user store
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: User) {
        let mut users = self.users.write().expect("user store lock poisoned");
        users.insert(user.username.as_str().to_string(), user);
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().expect("user store lock poisoned").is_empty()
    }

    pub fn len(&self) -> usize {
        self.users.read().expect("user store lock poisoned").len()
    }
}

impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        let users = self.users.read().expect("user store lock poisoned");
        Ok(users.get(username).cloned())
    }
}

/// Seed the store with the default brewery accounts
///
/// Three roles flattened to authority sets: ADMIN holds every beer
/// authority plus `customer.read`, CUSTOMER reads beers and customers,
/// USER reads beers. Passwords are minted through the registry's current
/// default algorithm. A store that already has users is left untouched.
pub fn seed_default_users(
    store: &InMemoryUserStore,
    encoder: &DelegatingPasswordEncoder,
) -> AuthResult<()> {
    if !store.is_empty() {
        tracing::debug!("User store already populated, skipping seed");
        return Ok(());
    }

    let admin = [
        "beer.create",
        "beer.read",
        "beer.update",
        "beer.delete",
        "customer.read",
    ];
    let customer = ["beer.read", "customer.read"];
    let user = ["beer.read"];

    let accounts: [(&str, &str, &[&str]); 3] = [
        ("spring", "guru", &admin),
        ("user", "password", &user),
        ("scott", "tiger", &customer),
    ];

    for (name, password, authorities) in accounts {
        let encoded = encoder
            .encode(&RawSecret::new(password))
            .map_err(|e| AuthError::Internal(format!("Failed to encode seed password: {e}")))?;
        let username =
            Username::new(name).map_err(|e| AuthError::Internal(format!("Bad seed user: {e}")))?;
        store.insert(User::new(
            username,
            encoded,
            authorities.iter().map(|a| Authority::from(*a)),
        ));
    }

    tracing::info!(users = store.len(), "Seeded user store");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::password::standard_password_encoder;

    #[tokio::test]
    async fn test_lookup() {
        let store = InMemoryUserStore::new();
        store.insert(User::new(
            Username::new("scott").unwrap(),
            "{noop}tiger",
            [Authority::from("beer.read")],
        ));

        let found = store.find_by_username("scott").await.unwrap();
        assert!(found.is_some());
        assert!(store.find_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = InMemoryUserStore::new();
        let encoder = standard_password_encoder();

        seed_default_users(&store, &encoder).unwrap();
        assert_eq!(store.len(), 3);

        // A second run must not re-encode or overwrite anything
        let before = store
            .find_by_username("spring")
            .await
            .unwrap()
            .unwrap()
            .password;
        seed_default_users(&store, &encoder).unwrap();
        let after = store
            .find_by_username("spring")
            .await
            .unwrap()
            .unwrap()
            .password;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_seeded_passwords_use_default_algorithm() {
        let store = InMemoryUserStore::new();
        let encoder = standard_password_encoder();
        seed_default_users(&store, &encoder).unwrap();

        let spring = store.find_by_username("spring").await.unwrap().unwrap();
        assert!(spring.password.starts_with("{argon2}"));
        assert!(encoder.matches(&RawSecret::new("guru"), &spring.password));
    }
}
