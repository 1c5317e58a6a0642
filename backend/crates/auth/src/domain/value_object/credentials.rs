//! Candidate Credentials
//!
//! The (identifier, secret) pair a request claims to authenticate with.
//! Constructed per request by an extraction strategy and dropped when the
//! authentication attempt ends; never persisted, never cloned.

use platform::password::RawSecret;

/// Candidate credentials for one authentication attempt
///
/// The secret is zeroized on drop and redacted in `Debug` output.
#[derive(Debug)]
pub struct Credentials {
    identifier: String,
    secret: RawSecret,
}

impl Credentials {
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: RawSecret::new(secret),
        }
    }

    /// The claimed account name
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The claimed secret
    pub fn secret(&self) -> &RawSecret {
        &self.secret
    }
}
