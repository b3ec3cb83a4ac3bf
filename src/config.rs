//! Environment-driven configuration, loaded once at startup.

use anyhow::Result;
use std::path::PathBuf;
use tracing::warn;

use crate::identity::SigningKey;

/// Built-in development secret, 79 bytes so HS256 gets well over 256 bits.
/// Only used when `AUTHGATE_SIGNING_KEY` is unset; startup logs a warning.
const DEV_SIGNING_KEY: &str =
    "MyVeryLongSecretKeyForJWTSigningThatIsAtLeast256BitsLongForHS256Algorithm123456";

/// CORS preflight results may be cached for an hour.
pub const CORS_MAX_AGE_SECS: u64 = 3600;

/// Static browser-side cross-origin allow-list. Orthogonal to
/// authentication: it governs which origins may call, not who the caller is.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            // Local frontend dev servers plus the gateway itself.
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
                "http://localhost:8080".to_string(),
                "http://127.0.0.1:5173".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            allow_credentials: true,
            max_age_secs: CORS_MAX_AGE_SECS,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub http_port: u16,
    pub signing_key: SigningKey,
    pub upload_dir: PathBuf,
    pub cors: CorsConfig,
}

impl Config {
    /// Read `AUTHGATE_*` variables, falling back to development defaults.
    pub fn from_env() -> Result<Self> {
        let http_port = std::env::var("AUTHGATE_HTTP_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);

        let signing_key = match std::env::var("AUTHGATE_SIGNING_KEY") {
            Ok(secret) => SigningKey::from_bytes(secret.into_bytes())?,
            Err(_) => {
                warn!("AUTHGATE_SIGNING_KEY not set, using built-in development secret");
                SigningKey::from_bytes(DEV_SIGNING_KEY.as_bytes().to_vec())?
            }
        };

        let upload_dir = PathBuf::from(
            std::env::var("AUTHGATE_UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
        );

        let mut cors = CorsConfig::default();
        if let Ok(origins) = std::env::var("AUTHGATE_CORS_ORIGINS") {
            let parsed: Vec<String> = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !parsed.is_empty() {
                cors.allowed_origins = parsed;
            }
        }

        Ok(Self { http_port, signing_key, upload_dir, cors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cors_allows_local_frontends() {
        let cors = CorsConfig::default();
        assert!(cors.allowed_origins.contains(&"http://localhost:5173".to_string()));
        assert!(cors.allow_credentials);
        assert_eq!(cors.max_age_secs, 3600);
    }

    #[test]
    fn dev_signing_key_is_long_enough() {
        assert!(DEV_SIGNING_KEY.len() >= 32);
        assert!(SigningKey::from_bytes(DEV_SIGNING_KEY.as_bytes().to_vec()).is_ok());
    }
}
