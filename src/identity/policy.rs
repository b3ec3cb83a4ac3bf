//! Route-level access policy: an ordered rule table mapping (method, path
//! pattern) to an access requirement. Evaluated top to bottom, first match
//! wins; anything unmatched requires authentication.

use axum::http::Method;

/// What a matched route demands of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Reachable with or without a principal.
    Public,
    /// Reachable only with a verified principal attached.
    Authenticated,
}

/// One entry in the ordered rule table. `method = None` matches any method.
/// Patterns are exact, or a prefix match with a trailing `*`, or a suffix
/// match with a leading `*`.
#[derive(Debug, Clone)]
pub struct AccessRule {
    method: Option<Method>,
    pattern: String,
    requirement: Requirement,
}

impl AccessRule {
    pub fn new(method: Option<Method>, pattern: &str, requirement: Requirement) -> Self {
        Self { method, pattern: pattern.to_string(), requirement }
    }

    fn matches(&self, method: &Method, path: &str) -> bool {
        if let Some(m) = &self.method {
            if m != method {
                return false;
            }
        }
        if let Some(prefix) = self.pattern.strip_suffix('*') {
            path.starts_with(prefix)
        } else if let Some(suffix) = self.pattern.strip_prefix('*') {
            path.ends_with(suffix)
        } else {
            path == self.pattern
        }
    }
}

/// Static ordered rule table, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
}

impl AccessPolicy {
    pub fn new(rules: Vec<AccessRule>) -> Self {
        Self { rules }
    }

    /// The shipped table: login/logout public, `/me` authenticated, the demo
    /// collaborator routes (files, AI feedback, KV) deliberately public,
    /// everything else authenticated by default.
    pub fn gateway_defaults() -> Self {
        Self::new(vec![
            AccessRule::new(Some(Method::POST), "/login", Requirement::Public),
            AccessRule::new(Some(Method::POST), "/logout", Requirement::Public),
            AccessRule::new(Some(Method::GET), "/me", Requirement::Authenticated),
            AccessRule::new(None, "/files/*", Requirement::Public),
            AccessRule::new(None, "/ai/*", Requirement::Public),
            AccessRule::new(None, "/kv/*", Requirement::Public),
        ])
    }

    /// First matching rule wins; no match falls back to `Authenticated`.
    pub fn decide(&self, method: &Method, path: &str) -> Requirement {
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map(|rule| rule.requirement)
            .unwrap_or(Requirement::Authenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_and_method() {
        let policy = AccessPolicy::gateway_defaults();
        assert_eq!(policy.decide(&Method::POST, "/login"), Requirement::Public);
        // Same path, wrong method: no rule matches, default applies.
        assert_eq!(policy.decide(&Method::GET, "/login"), Requirement::Authenticated);
    }

    #[test]
    fn prefix_wildcard_matches_subpaths() {
        let policy = AccessPolicy::gateway_defaults();
        assert_eq!(policy.decide(&Method::GET, "/files/report.pdf"), Requirement::Public);
        assert_eq!(policy.decide(&Method::PUT, "/kv/some-key"), Requirement::Public);
        assert_eq!(policy.decide(&Method::POST, "/ai/feedback"), Requirement::Public);
    }

    #[test]
    fn unmatched_routes_require_authentication() {
        let policy = AccessPolicy::gateway_defaults();
        assert_eq!(policy.decide(&Method::GET, "/"), Requirement::Authenticated);
        assert_eq!(policy.decide(&Method::GET, "/admin/anything"), Requirement::Authenticated);
    }

    #[test]
    fn first_matching_rule_wins() {
        let policy = AccessPolicy::new(vec![
            AccessRule::new(None, "/a/*", Requirement::Public),
            AccessRule::new(None, "/a/secret", Requirement::Authenticated),
        ]);
        // The broader public rule sits first, so the later rule never fires.
        assert_eq!(policy.decide(&Method::GET, "/a/secret"), Requirement::Public);

        let flipped = AccessPolicy::new(vec![
            AccessRule::new(None, "/a/secret", Requirement::Authenticated),
            AccessRule::new(None, "/a/*", Requirement::Public),
        ]);
        assert_eq!(flipped.decide(&Method::GET, "/a/secret"), Requirement::Authenticated);
        assert_eq!(flipped.decide(&Method::GET, "/a/open"), Requirement::Public);
    }

    #[test]
    fn suffix_wildcard_matches() {
        let policy = AccessPolicy::new(vec![
            AccessRule::new(None, "*.png", Requirement::Public),
        ]);
        assert_eq!(policy.decide(&Method::GET, "/images/logo.png"), Requirement::Public);
        assert_eq!(policy.decide(&Method::GET, "/images/logo.svg"), Requirement::Authenticated);
    }
}
