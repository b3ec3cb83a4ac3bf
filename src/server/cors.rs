//! Static CORS policy for the HTTP API. Fixed allow-list, never negotiated,
//! and orthogonal to authentication.

use axum::http::{HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{AllowHeaders, CorsLayer};
use tracing::warn;

use crate::config::CorsConfig;

/// Build the CORS layer from the startup config.
///
/// Headers are mirrored from the request rather than wildcarded: with
/// credentials enabled, a literal `*` is rejected by browsers, and mirroring
/// preserves the original "allow all headers" behavior.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();

    let mut cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_origin(origins)
        .max_age(Duration::from_secs(config.max_age_secs));

    if config.allow_credentials {
        cors = cors.allow_credentials(true);
    }

    cors
}
