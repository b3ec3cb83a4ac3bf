//! Per-request interception pipeline: bearer extraction first, then the
//! access-policy gate.
//!
//! The split is deliberate and must stay: the interceptor never rejects a
//! request, even for a garbage token. It only attaches a principal when
//! verification succeeds. Whether the request may proceed without one is
//! decided by the policy gate, so public routes remain reachable with a bad
//! `Authorization` header present.

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::warn;

use crate::identity::{Principal, Requirement};
use crate::server::AppState;

const BEARER_PREFIX: &str = "Bearer ";

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
}

/// Runs once per request, before the policy gate. Attaches a `Principal` to
/// the request extensions when a bearer token verifies; otherwise the
/// request continues anonymous. Verification is recomputed on every request,
/// nothing is cached.
pub async fn attach_principal(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(request.headers()) {
        match state.tokens.verify(token) {
            Ok(principal) => {
                request.extensions_mut().insert(principal);
            }
            Err(err) => {
                // Swallowed: rejection is the policy gate's job.
                warn!("token verification failed: {err}");
            }
        }
    }
    next.run(request).await
}

/// Consults the rule table after interception. Public routes always pass;
/// authenticated routes pass only when a principal was attached. The 401
/// body is uniform; it must not reveal whether the token was missing,
/// malformed, or expired.
pub async fn enforce_access_policy(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    match state.policy.decide(request.method(), request.uri().path()) {
        Requirement::Public => next.run(request).await,
        Requirement::Authenticated => {
            if request.extensions().get::<Principal>().is_some() {
                next.run(request).await
            } else {
                warn!(
                    "unauthenticated access to {} {}",
                    request.method(),
                    request.uri().path()
                );
                (StatusCode::UNAUTHORIZED, Json(json!({"status": "unauthorized"}))).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn missing_or_non_bearer_header_yields_none() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwdw=="));
        assert_eq!(bearer_token(&headers), None);
    }
}
