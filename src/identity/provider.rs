//! Credential verification behind a pluggable trait so the demo rule can be
//! swapped for a real directory lookup without touching the login handler.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Canonical user record returned at login and from `/me`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl User {
    /// Derive the canonical record from a username: `id = username` and a
    /// placeholder email. Nothing here is validated against a directory.
    pub fn for_username(username: &str) -> Self {
        Self {
            id: username.to_string(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
        }
    }
}

/// Validates login input and resolves it to a user record.
pub trait CredentialVerifier: Send + Sync {
    fn verify_credentials(&self, username: &str, password: &str) -> AppResult<User>;
}

/// Demo stand-in for a real credential check: any non-empty username and
/// password pair is accepted. Do not ship this against real resources;
/// replace it with a `CredentialVerifier` backed by an actual user store.
pub struct OpenCredentialVerifier;

impl CredentialVerifier for OpenCredentialVerifier {
    fn verify_credentials(&self, username: &str, password: &str) -> AppResult<User> {
        if username.is_empty() || password.is_empty() {
            return Err(AppError::auth("invalid_credentials", "invalid username or password"));
        }
        Ok(User::for_username(username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_username_rejected() {
        let err = OpenCredentialVerifier.verify_credentials("", "pw").unwrap_err();
        assert_eq!(err.http_status(), 401);
    }

    #[test]
    fn empty_password_rejected() {
        let err = OpenCredentialVerifier.verify_credentials("alice", "").unwrap_err();
        assert_eq!(err.http_status(), 401);
    }

    #[test]
    fn non_empty_pair_accepted() {
        let user = OpenCredentialVerifier.verify_credentials("alice", "pw").expect("login");
        assert_eq!(user.id, "alice");
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");
    }

    /// Fixed-table verifier standing in for a real directory lookup,
    /// exercised through the trait object the login handler uses.
    struct FixedCredentialVerifier {
        username: &'static str,
        password: &'static str,
    }

    impl CredentialVerifier for FixedCredentialVerifier {
        fn verify_credentials(&self, username: &str, password: &str) -> AppResult<User> {
            if username == self.username && password == self.password {
                Ok(User::for_username(username))
            } else {
                Err(AppError::auth("invalid_credentials", "invalid username or password"))
            }
        }
    }

    #[test]
    fn trait_supports_real_lookup_semantics() {
        let verifier: Box<dyn CredentialVerifier> =
            Box::new(FixedCredentialVerifier { username: "carol", password: "s3cret" });
        assert!(verifier.verify_credentials("carol", "s3cret").is_ok());
        assert!(verifier.verify_credentials("carol", "wrong").is_err());
        assert!(verifier.verify_credentials("mallory", "s3cret").is_err());
    }
}
