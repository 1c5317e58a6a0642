//! PostgreSQL User Store
//!
//! Read-only [`UserStore`] over the `users` / `roles` / `authorities`
//! schema. Roles are flattened to the authority set at load time, so the
//! rest of the crate never sees role rows.

use sqlx::PgPool;

use crate::domain::entity::user::User;
use crate::domain::repository::UserStore;
use crate::domain::value_object::authority::Authority;
use crate::domain::value_object::username::Username;
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed user store
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    username: String,
    password: String,
    enabled: bool,
}

impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                username,
                password,
                enabled
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let permissions: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT a.permission
            FROM authorities a
            JOIN role_authorities ra ON ra.authority_id = a.id
            JOIN user_roles ur ON ur.role_id = ra.role_id
            JOIN users u ON u.id = ur.user_id
            WHERE u.username = $1
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        let name = Username::new(row.username)
            .map_err(|e| AuthError::Internal(format!("Stored username is invalid: {e}")))?;

        let mut user = User::new(
            name,
            row.password,
            permissions.iter().map(|p| Authority::new(p.clone())),
        );
        user.enabled = row.enabled;

        Ok(Some(user))
    }
}
