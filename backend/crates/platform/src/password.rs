//! Password Encoding and Verification
//!
//! A tagged multi-algorithm password registry. Every stored credential is a
//! single string of the form `{tag}encoded`; the tag names the algorithm
//! that produced the encoding. New encodings always use the registry's
//! default algorithm, while verification dispatches on the stored tag, so a
//! user store can hold a mix of algorithms during a live migration.
//!
//! ## Security Model
//! - New encodings use Argon2id (memory-hard, configurable work factor)
//! - Legacy schemes (salted SHA-1, fixed-salt SHA-256, plain text) are kept
//!   for verification of existing rows only
//! - Unrecognized tags and corrupt stored values fail closed: `matches`
//!   returns `false` and never panics
//! - Plaintext secrets are zeroized on drop and redacted in `Debug` output

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto;

// ============================================================================
// Algorithm tags
// ============================================================================

/// Tag for the Argon2id encoder (current default)
pub const TAG_ARGON2: &str = "argon2";
/// Tag for the salted SHA-1 (LDAP SSHA) legacy encoder
pub const TAG_LDAP: &str = "ldap";
/// Tag for the plain-text no-op encoder (tests and legacy data only)
pub const TAG_NOOP: &str = "noop";
/// Tag for the fixed-salt SHA-256 legacy encoder
pub const TAG_SHA256: &str = "sha256";

/// Salt length for the SSHA scheme, in bytes
const SSHA_SALT_LEN: usize = 8;
/// SHA-1 digest length, in bytes
const SHA1_LEN: usize = 20;

// ============================================================================
// Error Types
// ============================================================================

/// Password encoding errors
///
/// Verification never produces an error; a stored value that cannot be
/// parsed simply does not match.
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Hashing operation failed
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Invalid work-factor parameters
    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),

    /// Registry configured with a default tag that has no encoder
    #[error("No encoder registered for algorithm tag '{0}'")]
    UnknownAlgorithm(String),
}

// ============================================================================
// Raw Secret (Zeroized on drop)
// ============================================================================

/// Plaintext secret with automatic memory zeroization
///
/// Does not implement `Clone`, so a secret lives in exactly one place and
/// is erased when the request that carried it ends. `Debug` output is
/// redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct RawSecret(String);

impl RawSecret {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for RawSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawSecret").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// Encoder trait
// ============================================================================

/// A single password hashing algorithm
///
/// `encode` mints a new stored value (without the registry tag prefix);
/// `matches` verifies a plaintext against one. Implementations must not
/// panic on malformed stored values.
pub trait PasswordEncoder: Send + Sync {
    /// Encode a plaintext secret for storage
    fn encode(&self, raw: &RawSecret) -> Result<String, PasswordHashError>;

    /// Verify a plaintext secret against a stored encoding
    fn matches(&self, raw: &RawSecret, encoded: &str) -> bool;
}

// ============================================================================
// Argon2id (current default)
// ============================================================================

/// Argon2id encoder with configurable work factor
pub struct Argon2Encoder {
    argon2: Argon2<'static>,
}

impl Argon2Encoder {
    /// Encoder with explicit work-factor parameters
    ///
    /// `m_cost` is in KiB, `t_cost` is the iteration count, `p_cost` the
    /// parallelism degree.
    pub fn new(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, PasswordHashError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| PasswordHashError::InvalidParams(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl Default for Argon2Encoder {
    /// OWASP recommended parameters: m=19456 (19 MiB), t=2, p=1
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl PasswordEncoder for Argon2Encoder {
    fn encode(&self, raw: &RawSecret) -> Result<String, PasswordHashError> {
        let salt = SaltString::generate(OsRng);
        let hash = self
            .argon2
            .hash_password(raw.as_bytes(), &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn matches(&self, raw: &RawSecret, encoded: &str) -> bool {
        let parsed = match PasswordHash::new(encoded) {
            Ok(h) => h,
            Err(_) => return false,
        };
        // Argon2 uses constant-time comparison internally
        self.argon2.verify_password(raw.as_bytes(), &parsed).is_ok()
    }
}

// ============================================================================
// Salted SHA-1 (LDAP SSHA, legacy)
// ============================================================================

/// LDAP-style salted SHA-1 encoder
///
/// Stored form: `base64(sha1(secret || salt) || salt)` with a random
/// 8-byte salt. Kept only so rows encoded by the old directory-backed
/// store keep verifying; never used for new encodings.
pub struct LdapShaEncoder;

impl PasswordEncoder for LdapShaEncoder {
    fn encode(&self, raw: &RawSecret) -> Result<String, PasswordHashError> {
        let salt = crypto::random_bytes(SSHA_SALT_LEN);
        let mut input = raw.as_bytes().to_vec();
        input.extend_from_slice(&salt);
        let digest = crypto::sha1(&input);

        let mut out = digest.to_vec();
        out.extend_from_slice(&salt);
        Ok(crypto::to_base64(&out))
    }

    fn matches(&self, raw: &RawSecret, encoded: &str) -> bool {
        let decoded = match crypto::from_base64(encoded) {
            Some(d) => d,
            None => return false,
        };
        if decoded.len() < SHA1_LEN {
            return false;
        }
        let (digest, salt) = decoded.split_at(SHA1_LEN);

        let mut input = raw.as_bytes().to_vec();
        input.extend_from_slice(salt);
        let expected = crypto::sha1(&input);

        crypto::constant_time_eq(digest, &expected)
    }
}

// ============================================================================
// Fixed-salt SHA-256 (legacy)
// ============================================================================

/// Fixed-salt SHA-256 digest encoder
///
/// Stored form: `hex(sha256(salt || secret))`. The salt is a deployment
/// constant, so identical secrets encode identically. This scheme is also
/// the fallback for stored values carrying no recognized tag prefix.
pub struct Sha256Encoder {
    salt: Vec<u8>,
}

impl Sha256Encoder {
    pub fn new(salt: impl Into<Vec<u8>>) -> Self {
        Self { salt: salt.into() }
    }
}

impl Default for Sha256Encoder {
    fn default() -> Self {
        Self::new(&b"brewery-static-salt"[..])
    }
}

impl PasswordEncoder for Sha256Encoder {
    fn encode(&self, raw: &RawSecret) -> Result<String, PasswordHashError> {
        let mut input = self.salt.clone();
        input.extend_from_slice(raw.as_bytes());
        Ok(crypto::to_hex(&crypto::sha256(&input)))
    }

    fn matches(&self, raw: &RawSecret, encoded: &str) -> bool {
        let expected = match self.encode(raw) {
            Ok(e) => e,
            Err(_) => return false,
        };
        crypto::constant_time_eq(expected.as_bytes(), encoded.as_bytes())
    }
}

// ============================================================================
// No-op (plain text)
// ============================================================================

/// Plain-text equivalence encoder
///
/// Exists for tests and for verifying pre-migration rows that were never
/// hashed. Must never be a production default; the standard registry only
/// registers it for verification.
pub struct NoopEncoder;

impl PasswordEncoder for NoopEncoder {
    fn encode(&self, raw: &RawSecret) -> Result<String, PasswordHashError> {
        Ok(raw.as_str().to_string())
    }

    fn matches(&self, raw: &RawSecret, encoded: &str) -> bool {
        crypto::constant_time_eq(raw.as_bytes(), encoded.as_bytes())
    }
}

// ============================================================================
// Delegating registry
// ============================================================================

/// Tag-dispatching password encoder registry
///
/// Built once at startup and shared as an immutable handle; reconfiguring
/// means building a new registry and swapping the `Arc`, so in-flight
/// requests never observe a half-updated table.
pub struct DelegatingPasswordEncoder {
    default_tag: String,
    fallback_tag: String,
    encoders: HashMap<String, Arc<dyn PasswordEncoder>>,
}

impl DelegatingPasswordEncoder {
    /// Build a registry from a tag table
    ///
    /// `default_tag` selects the algorithm used by `encode`; it must be
    /// present in the table. The fallback for untagged stored values
    /// defaults to the same algorithm until [`with_fallback`] is called.
    ///
    /// [`with_fallback`]: DelegatingPasswordEncoder::with_fallback
    pub fn new(
        default_tag: impl Into<String>,
        encoders: HashMap<String, Arc<dyn PasswordEncoder>>,
    ) -> Result<Self, PasswordHashError> {
        let default_tag = default_tag.into();
        if !encoders.contains_key(&default_tag) {
            return Err(PasswordHashError::UnknownAlgorithm(default_tag));
        }
        Ok(Self {
            fallback_tag: default_tag.clone(),
            default_tag,
            encoders,
        })
    }

    /// Set the algorithm used for stored values with no `{tag}` prefix
    pub fn with_fallback(mut self, tag: impl Into<String>) -> Result<Self, PasswordHashError> {
        let tag = tag.into();
        if !self.encoders.contains_key(&tag) {
            return Err(PasswordHashError::UnknownAlgorithm(tag));
        }
        self.fallback_tag = tag;
        Ok(self)
    }

    /// Tag stamped onto new encodings
    pub fn default_tag(&self) -> &str {
        &self.default_tag
    }

    /// Whether a stored value should be re-encoded on next password change
    ///
    /// True when the value was produced by anything other than the current
    /// default algorithm, including untagged legacy values.
    pub fn needs_upgrade(&self, encoded: &str) -> bool {
        match split_tag(encoded) {
            TagSplit::Tagged(tag, _) => tag != self.default_tag,
            TagSplit::Untagged(_) | TagSplit::Malformed => true,
        }
    }
}

impl PasswordEncoder for DelegatingPasswordEncoder {
    fn encode(&self, raw: &RawSecret) -> Result<String, PasswordHashError> {
        // new() guarantees the default tag is registered
        let encoder = self
            .encoders
            .get(&self.default_tag)
            .ok_or_else(|| PasswordHashError::UnknownAlgorithm(self.default_tag.clone()))?;
        let encoded = encoder.encode(raw)?;
        Ok(format!("{{{}}}{}", self.default_tag, encoded))
    }

    fn matches(&self, raw: &RawSecret, encoded: &str) -> bool {
        if encoded.is_empty() {
            return false;
        }
        let (tag, rest) = match split_tag(encoded) {
            TagSplit::Tagged(tag, rest) => (tag, rest),
            TagSplit::Untagged(rest) => (self.fallback_tag.as_str(), rest),
            TagSplit::Malformed => {
                tracing::warn!("Stored credential has an unterminated algorithm tag");
                return false;
            }
        };
        match self.encoders.get(tag) {
            Some(encoder) => encoder.matches(raw, rest),
            None => {
                // Fail closed on unknown tags; this is a data-integrity
                // problem, not an authentication error
                tracing::warn!(tag = %tag, "Stored credential uses an unregistered algorithm tag");
                false
            }
        }
    }
}

/// Outcome of parsing the `{tag}` prefix of a stored value
enum TagSplit<'a> {
    Tagged(&'a str, &'a str),
    Untagged(&'a str),
    Malformed,
}

fn split_tag(encoded: &str) -> TagSplit<'_> {
    match encoded.strip_prefix('{') {
        Some(rest) => match rest.find('}') {
            Some(end) => TagSplit::Tagged(&rest[..end], &rest[end + 1..]),
            None => TagSplit::Malformed,
        },
        None => TagSplit::Untagged(encoded),
    }
}

/// The standard registry for this backend
///
/// Argon2id mints new encodings; `ldap`, `noop` and `sha256` verify legacy
/// rows, with the fixed-salt SHA-256 scheme doubling as the fallback for
/// untagged values.
pub fn standard_password_encoder() -> DelegatingPasswordEncoder {
    let mut encoders: HashMap<String, Arc<dyn PasswordEncoder>> = HashMap::new();
    encoders.insert(TAG_ARGON2.to_string(), Arc::new(Argon2Encoder::default()));
    encoders.insert(TAG_LDAP.to_string(), Arc::new(LdapShaEncoder));
    encoders.insert(TAG_NOOP.to_string(), Arc::new(NoopEncoder));
    encoders.insert(TAG_SHA256.to_string(), Arc::new(Sha256Encoder::default()));

    DelegatingPasswordEncoder::new(TAG_ARGON2, encoders)
        .and_then(|e| e.with_fallback(TAG_SHA256))
        .unwrap_or_else(|_| unreachable!("standard tags are always registered"))
}

// ============================================================================
// Tests
// ============================================================================
