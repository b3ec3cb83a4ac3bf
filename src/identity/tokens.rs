//! Token issuance and verification.
//! HS256-signed JWTs carrying `sub`/`iat`/`exp`; validity is purely a
//! function of signature and expiry at verification time. Nothing is stored
//! server-side, so an issued token stays usable until its expiry.

use anyhow::{Result, anyhow};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::principal::Principal;

/// Access tokens live for 24 hours.
const ACCESS_TTL_SECS: i64 = 24 * 3600;
/// Refresh tokens live for 7 days.
const REFRESH_TTL_SECS: i64 = 7 * 24 * 3600;

/// Process-wide symmetric signing secret. Loaded once at startup and
/// injected into `TokenService`; never rotated at runtime.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    /// Minimum 32 bytes so the HS256 secret is at least 256 bits.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.len() < 32 {
            return Err(anyhow!("signing key must be at least 32 bytes, got {}", bytes.len()));
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Why a token failed verification. Collapsed into "not a valid token" at
/// the HTTP boundary; the distinction exists for logs and tests only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
}

/// Issues and verifies signed identity tokens against a single signing key.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(key: &SigningKey) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Strict `now < exp`; the crate default of 60s leeway would keep
        // expired tokens alive past their window.
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(key.as_bytes()),
            decoding: DecodingKey::from_secret(key.as_bytes()),
            validation,
        }
    }

    /// Issue a short-lived access token for `username` (`exp = now + 24h`).
    pub fn issue_access_token(&self, username: &str) -> Result<String> {
        self.issue(username, ACCESS_TTL_SECS)
    }

    /// Issue a refresh token for `username` (`exp = now + 7d`). The refresh
    /// exchange itself is out of scope; the token is handed to the caller at
    /// login alongside the access token.
    pub fn issue_refresh_token(&self, username: &str) -> Result<String> {
        self.issue(username, REFRESH_TTL_SECS)
    }

    fn issue(&self, username: &str, ttl_secs: i64) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims { sub: username.to_string(), iat: now, exp: now + ttl_secs };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| anyhow!("failed to sign token: {e}"))
    }

    /// Verify signature and expiry, returning the request-scoped principal.
    /// Stateless and side-effect free; the same token verifies to the same
    /// principal every time until it expires.
    pub fn verify(&self, token: &str) -> Result<Principal, VerificationError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(map_jwt_error)?;
        Ok(Principal::new(data.claims.sub))
    }

    /// Same verification path as `verify`, returning only the subject.
    pub fn extract_username(&self, token: &str) -> Result<String, VerificationError> {
        self.verify(token).map(|p| p.username)
    }
}

fn map_jwt_error(error: jsonwebtoken::errors::Error) -> VerificationError {
    use jsonwebtoken::errors::ErrorKind;

    match error.kind() {
        ErrorKind::InvalidSignature => VerificationError::InvalidSignature,
        ErrorKind::ExpiredSignature => VerificationError::Expired,
        _ => VerificationError::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> SigningKey {
        SigningKey::from_bytes(&b"0123456789abcdef0123456789abcdef"[..]).expect("test key")
    }

    fn encode_with_exp(key: &SigningKey, sub: &str, exp: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims { sub: sub.to_string(), iat: now, exp };
        encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(key.as_bytes()))
            .expect("encode test token")
    }

    #[test]
    fn short_signing_key_rejected() {
        assert!(SigningKey::from_bytes(&b"too short"[..]).is_err());
        assert!(SigningKey::from_bytes(vec![7u8; 32]).is_ok());
    }

    #[test]
    fn access_token_round_trip() {
        let svc = TokenService::new(&test_key());
        let token = svc.issue_access_token("alice").expect("issue");
        assert_eq!(svc.extract_username(&token).expect("extract"), "alice");
    }

    #[test]
    fn refresh_token_round_trip() {
        let svc = TokenService::new(&test_key());
        let token = svc.issue_refresh_token("bob").expect("issue");
        assert_eq!(svc.extract_username(&token).expect("extract"), "bob");
    }

    #[test]
    fn verify_attaches_no_authorities() {
        let svc = TokenService::new(&test_key());
        let token = svc.issue_access_token("alice").expect("issue");
        let principal = svc.verify(&token).expect("verify");
        assert_eq!(principal.username, "alice");
        assert!(principal.authorities.is_empty());
    }

    #[test]
    fn verify_is_idempotent() {
        let svc = TokenService::new(&test_key());
        let token = svc.issue_access_token("alice").expect("issue");
        let first = svc.verify(&token).expect("first verify");
        let second = svc.verify(&token).expect("second verify");
        assert_eq!(first, second);
    }

    #[test]
    fn expired_token_fails() {
        let key = test_key();
        let svc = TokenService::new(&key);
        let past = chrono::Utc::now().timestamp() - 3600;
        let token = encode_with_exp(&key, "alice", past);
        assert_eq!(svc.verify(&token), Err(VerificationError::Expired));
    }

    #[test]
    fn tampered_signature_fails() {
        let svc = TokenService::new(&test_key());
        let token = svc.issue_access_token("alice").expect("issue");
        // Flip bits in the first signature character.
        let sig = token.rfind('.').expect("signature separator") + 1;
        let mut bytes = token.into_bytes();
        bytes[sig] = if bytes[sig] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).expect("ascii token");
        assert!(svc.verify(&tampered).is_err());
    }

    #[test]
    fn tampered_payload_fails() {
        let svc = TokenService::new(&test_key());
        let token = svc.issue_access_token("alice").expect("issue");
        // Alter one payload character between the two dots.
        let dot = token.find('.').expect("header separator") + 1;
        let mut bytes = token.into_bytes();
        bytes[dot] = if bytes[dot] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).expect("ascii token");
        assert!(svc.verify(&tampered).is_err());
    }

    #[test]
    fn wrong_key_fails_with_signature_error() {
        let svc = TokenService::new(&test_key());
        let other = SigningKey::from_bytes(vec![9u8; 32]).expect("other key");
        let token = TokenService::new(&other).issue_access_token("alice").expect("issue");
        assert_eq!(svc.verify(&token), Err(VerificationError::InvalidSignature));
    }

    #[test]
    fn garbage_token_is_malformed() {
        let svc = TokenService::new(&test_key());
        assert_eq!(svc.verify("not-a-jwt"), Err(VerificationError::Malformed));
        assert_eq!(svc.verify(""), Err(VerificationError::Malformed));
    }
}
