//! Username Value Object
//!
//! The username is the public identifier a caller claims when presenting
//! credentials. Validation is deliberately loose: the store owns uniqueness
//! and provisioning rules, this type only rejects values that could never
//! name an account.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a username (in characters)
pub const USERNAME_MAX_LENGTH: usize = 64;

/// Validation error for [`Username`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsernameError {
    #[error("Username cannot be empty")]
    Empty,
    #[error("Username must be at most {USERNAME_MAX_LENGTH} characters")]
    TooLong,
    #[error("Username cannot contain whitespace or control characters")]
    InvalidCharacter,
}

/// A validated account name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    pub fn new(raw: impl Into<String>) -> Result<Self, UsernameError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(UsernameError::Empty);
        }
        if raw.chars().count() > USERNAME_MAX_LENGTH {
            return Err(UsernameError::TooLong);
        }
        if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(UsernameError::InvalidCharacter);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
