//! Authorization Rule Table
//!
//! An ordered list of (path pattern, method, access requirement) rules
//! evaluated after authentication. First match wins; a request matching no
//! rule requires authentication. The table is built at startup and never
//! mutated, so it can be shared freely across requests.
//!
//! Patterns are ant-style: `*` and `{name}` match exactly one path segment,
//! a trailing `**` matches zero or more remaining segments.

use http::Method;

use crate::domain::entity::principal::SecurityContext;
use crate::domain::value_object::authority::Authority;

// ============================================================================
// Path patterns
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `*` or `{name}`: exactly one segment
    Wildcard,
    /// trailing `**`: zero or more segments
    DeepWildcard,
}

/// Compiled ant-style path pattern
#[derive(Debug, Clone)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile a pattern such as `/api/v1/beer/**` or `/api/v1/beerUpc/{upc}`
    ///
    /// `**` is only meaningful as the last segment; anywhere else it would
    /// make first-match ordering ambiguous and is treated as `*`.
    pub fn new(pattern: &str) -> Self {
        let raw: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
        let last = raw.len().saturating_sub(1);
        let segments = raw
            .iter()
            .enumerate()
            .map(|(i, s)| match *s {
                "**" if i == last => Segment::DeepWildcard,
                "*" | "**" => Segment::Wildcard,
                s if s.starts_with('{') && s.ends_with('}') => Segment::Wildcard,
                s => Segment::Literal(s.to_string()),
            })
            .collect();
        Self { segments }
    }

    /// Whether a concrete request path matches this pattern
    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        self.match_from(0, &parts)
    }

    fn match_from(&self, seg: usize, parts: &[&str]) -> bool {
        match self.segments.get(seg) {
            None => parts.is_empty(),
            Some(Segment::DeepWildcard) => true,
            Some(Segment::Wildcard) => !parts.is_empty() && self.match_from(seg + 1, &parts[1..]),
            Some(Segment::Literal(lit)) => {
                parts.first() == Some(&lit.as_str()) && self.match_from(seg + 1, &parts[1..])
            }
        }
    }
}

// ============================================================================
// Rules
// ============================================================================

/// What a matched rule demands of the request
#[derive(Debug, Clone)]
pub enum Access {
    /// Anyone, including anonymous requests
    PermitAll,
    /// Any authenticated principal
    Authenticated,
    /// An authenticated principal holding at least one of these authorities
    RequireAny(Vec<Authority>),
}

impl Access {
    fn evaluate(&self, context: &SecurityContext) -> AccessDecision {
        match self {
            Access::PermitAll => AccessDecision::Allow,
            Access::Authenticated => match context.principal() {
                Some(_) => AccessDecision::Allow,
                None => AccessDecision::RequireAuthentication,
            },
            Access::RequireAny(authorities) => match context.principal() {
                None => AccessDecision::RequireAuthentication,
                Some(p) if p.has_any_authority(authorities.iter()) => AccessDecision::Allow,
                Some(_) => AccessDecision::Deny,
            },
        }
    }
}

/// Outcome of evaluating the policy for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Proceed to the handler
    Allow,
    /// Anonymous on a protected route (maps to 401)
    RequireAuthentication,
    /// Authenticated but lacking the required authority (maps to 403)
    Deny,
}

/// One ordered rule of the table
#[derive(Debug, Clone)]
pub struct AccessRule {
    pattern: PathPattern,
    /// `None` matches any HTTP method
    method: Option<Method>,
    access: Access,
}

impl AccessRule {
    pub fn new(pattern: &str, method: Option<Method>, access: Access) -> Self {
        Self {
            pattern: PathPattern::new(pattern),
            method,
            access,
        }
    }

    fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.as_ref().is_none_or(|m| m == method) && self.pattern.matches(path)
    }
}

/// The ordered authorization rule table
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
}

impl AccessPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule allowing anyone
    pub fn permit_all(mut self, pattern: &str) -> Self {
        self.rules
            .push(AccessRule::new(pattern, None, Access::PermitAll));
        self
    }

    /// Append a rule requiring any of the given authorities
    pub fn require_any<'a>(
        mut self,
        pattern: &str,
        method: Option<Method>,
        authorities: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let authorities = authorities.into_iter().map(Authority::from).collect();
        self.rules
            .push(AccessRule::new(pattern, method, Access::RequireAny(authorities)));
        self
    }

    /// Evaluate the table for one request; first matching rule wins and
    /// unmatched requests require authentication
    pub fn decide(&self, method: &Method, path: &str, context: &SecurityContext) -> AccessDecision {
        for rule in &self.rules {
            if rule.matches(method, path) {
                return rule.access.evaluate(context);
            }
        }
        Access::Authenticated.evaluate(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::principal::Principal;
    use crate::domain::value_object::username::Username;

    fn context(authorities: &[&str]) -> SecurityContext {
        SecurityContext::authenticated(Principal {
            username: Username::new("tester").unwrap(),
            authorities: authorities.iter().map(|a| Authority::from(*a)).collect(),
        })
    }

    #[test]
    fn test_pattern_literals() {
        let p = PathPattern::new("/customers");
        assert!(p.matches("/customers"));
        assert!(p.matches("/customers/"));
        assert!(!p.matches("/customers/42"));
        assert!(!p.matches("/"));
    }

    #[test]
    fn test_pattern_deep_wildcard() {
        let p = PathPattern::new("/api/**");
        assert!(p.matches("/api"));
        assert!(p.matches("/api/v1/beer"));
        assert!(p.matches("/api/v1/beer/42"));
        assert!(!p.matches("/apiary"));
        assert!(!p.matches("/customers"));
    }

    #[test]
    fn test_pattern_single_wildcards() {
        let p = PathPattern::new("/api/v1/beerUpc/{upc}");
        assert!(p.matches("/api/v1/beerUpc/0631234200036"));
        assert!(!p.matches("/api/v1/beerUpc"));
        assert!(!p.matches("/api/v1/beerUpc/0631234200036/extra"));

        let p = PathPattern::new("/beers/*");
        assert!(p.matches("/beers/find"));
        assert!(!p.matches("/beers"));
    }

    #[test]
    fn test_root_pattern() {
        let p = PathPattern::new("/");
        assert!(p.matches("/"));
        assert!(!p.matches("/api"));
    }

    #[test]
    fn test_first_match_wins() {
        let policy = AccessPolicy::new()
            .require_any("/api/v1/beer/**", Some(Method::DELETE), ["beer.delete"])
            .require_any("/api/v1/beer/**", None, ["beer.read"]);

        // DELETE hits the first rule, reader authority is not enough
        let reader = context(&["beer.read"]);
        assert_eq!(
            policy.decide(&Method::DELETE, "/api/v1/beer/42", &reader),
            AccessDecision::Deny
        );
        assert_eq!(
            policy.decide(&Method::GET, "/api/v1/beer/42", &reader),
            AccessDecision::Allow
        );
    }

    #[test]
    fn test_unmatched_requires_authentication() {
        let policy = AccessPolicy::new().permit_all("/");
        assert_eq!(
            policy.decide(&Method::GET, "/unlisted", &SecurityContext::Anonymous),
            AccessDecision::RequireAuthentication
        );
        assert_eq!(
            policy.decide(&Method::GET, "/unlisted", &context(&[])),
            AccessDecision::Allow
        );
    }

    #[test]
    fn test_permit_all_allows_anonymous() {
        let policy = AccessPolicy::new().permit_all("/");
        assert_eq!(
            policy.decide(&Method::GET, "/", &SecurityContext::Anonymous),
            AccessDecision::Allow
        );
    }

    #[test]
    fn test_anonymous_on_protected_route() {
        let policy = AccessPolicy::new().require_any("/customers", None, ["customer.read"]);
        assert_eq!(
            policy.decide(&Method::GET, "/customers", &SecurityContext::Anonymous),
            AccessDecision::RequireAuthentication
        );
    }
}
