use serde::{Deserialize, Serialize};

/// Verified identity attached to a single request's extensions after a
/// successful token verification. Never persisted and never shared between
/// requests; absence of a `Principal` is what "anonymous" means here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    /// Always empty: this gateway issues no role or permission claims.
    #[serde(default)]
    pub authorities: Vec<String>,
}

impl Principal {
    pub fn new(username: impl Into<String>) -> Self {
        Self { username: username.into(), authorities: Vec::new() }
    }
}
