//! Credential Extraction Strategies
//!
//! A strategy reads the (identifier, secret) pair out of one transport:
//! fixed header names, or fixed query/form parameter names. Strategies are
//! pure over the request parts they are given; malformed input is simply
//! "no credentials", never an error. The filter is parameterized by
//! exactly one strategy, so each transport gets its own filter instance.

use axum::http::request::Parts;

use crate::application::config::AuthConfig;
use crate::domain::value_object::credentials::Credentials;

/// Decoded `application/x-www-form-urlencoded` body pairs
///
/// Buffered by the filter only when the mounted strategy reads form
/// bodies; header-based filters never touch the body.
#[derive(Debug, Clone)]
pub struct FormParams(Vec<(String, String)>);

impl FormParams {
    /// Decode a raw urlencoded body; non-UTF-8 or undecodable input is
    /// treated as absent
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let text = std::str::from_utf8(bytes).ok()?;
        let pairs = serde_urlencoded::from_str::<Vec<(String, String)>>(text).ok()?;
        Some(Self(pairs))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// One credential-transport strategy
pub trait CredentialExtractor: Send + Sync + 'static {
    /// Read candidate credentials from the request, if the transport
    /// carries a complete, non-empty pair
    fn extract(&self, parts: &Parts, form: Option<&FormParams>) -> Option<Credentials>;

    /// Whether the filter should buffer a urlencoded body for this strategy
    fn reads_form_body(&self) -> bool {
        false
    }
}

// ============================================================================
// Header transport
// ============================================================================

/// Reads credentials from a fixed pair of request headers
#[derive(Debug, Clone)]
pub struct HeaderCredentialExtractor {
    identifier_header: String,
    secret_header: String,
}

impl HeaderCredentialExtractor {
    pub fn new(identifier_header: impl Into<String>, secret_header: impl Into<String>) -> Self {
        Self {
            identifier_header: identifier_header.into(),
            secret_header: secret_header.into(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.header_identifier, &config.header_secret)
    }
}

impl CredentialExtractor for HeaderCredentialExtractor {
    fn extract(&self, parts: &Parts, _form: Option<&FormParams>) -> Option<Credentials> {
        let identifier = header_value(parts, &self.identifier_header)?;
        let secret = header_value(parts, &self.secret_header)?;
        Some(Credentials::new(identifier, secret))
    }
}

/// Non-empty, valid-UTF-8 header value or nothing
fn header_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    let value = parts.headers.get(name)?.to_str().ok()?;
    if value.is_empty() { None } else { Some(value) }
}

// ============================================================================
// Parameter transport
// ============================================================================

/// Reads credentials from a fixed pair of query or form parameters
///
/// The query string is consulted first, then the buffered form body, which
/// mirrors how a servlet-style `getParameter` merges the two sources.
#[derive(Debug, Clone)]
pub struct ParamCredentialExtractor {
    identifier_param: String,
    secret_param: String,
}

impl ParamCredentialExtractor {
    pub fn new(identifier_param: impl Into<String>, secret_param: impl Into<String>) -> Self {
        Self {
            identifier_param: identifier_param.into(),
            secret_param: secret_param.into(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.param_identifier, &config.param_secret)
    }

    fn param_value(&self, parts: &Parts, form: Option<&FormParams>, name: &str) -> Option<String> {
        if let Some(query) = parts.uri.query() {
            if let Ok(pairs) = serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
                if let Some((_, value)) = pairs.into_iter().find(|(k, _)| k == name) {
                    if !value.is_empty() {
                        return Some(value);
                    }
                }
            }
        }
        form.and_then(|f| f.get(name))
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

impl CredentialExtractor for ParamCredentialExtractor {
    fn extract(&self, parts: &Parts, form: Option<&FormParams>) -> Option<Credentials> {
        let identifier = self.param_value(parts, form, &self.identifier_param)?;
        let secret = self.param_value(parts, form, &self.secret_param)?;
        Some(Credentials::new(identifier, secret))
    }

    fn reads_form_body(&self) -> bool {
        true
    }
}
