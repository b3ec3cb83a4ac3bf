//!
//! authgate HTTP server
//! --------------------
//! This module defines the Axum-based HTTP API for the authentication
//! gateway.
//!
//! Responsibilities:
//! - Login endpoint issuing stateless access/refresh tokens.
//! - Bearer-token interception attaching a per-request principal.
//! - Route-level access policy enforcement (first-match-wins rule table).
//! - CORS layer with a static origin allow-list.
//! - Demo collaborator endpoints: file upload/serving, in-memory KV store,
//!   canned AI feedback.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{Config, CorsConfig};
use crate::identity::{
    AccessPolicy, CredentialVerifier, OpenCredentialVerifier, Principal, TokenService, User,
};

pub mod ai;
pub mod cors;
pub mod files;
pub mod kv;
pub mod middleware;

/// Shared server state injected into all handlers.
///
/// Everything auth-related is immutable after startup: the token service
/// owns the signing key, and the policy table never changes. The KV map is
/// the only mutable piece and belongs to a demo collaborator, not the core.
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub policy: Arc<AccessPolicy>,
    pub kv: Arc<parking_lot::RwLock<HashMap<String, String>>>,
    pub upload_dir: PathBuf,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            tokens: Arc::new(TokenService::new(&config.signing_key)),
            verifier: Arc::new(OpenCredentialVerifier),
            policy: Arc::new(AccessPolicy::gateway_defaults()),
            kv: Arc::new(parking_lot::RwLock::new(HashMap::new())),
            upload_dir: config.upload_dir.clone(),
        }
    }
}

/// Mount all routes and middleware onto a router.
///
/// Layer order matters: the interceptor must run before the policy gate so
/// the gate sees any attached principal, and CORS sits outermost so
/// preflights never reach the policy. Axum runs layers bottom-up.
pub fn build_router(state: AppState, cors_config: &CorsConfig) -> Router {
    Router::new()
        .route("/", get(|| async { "authgate ok" }))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/files/upload", post(files::upload))
        .route("/files/{name}", get(files::serve))
        .route("/kv/{key}", put(kv::set).get(kv::fetch).delete(kv::remove))
        .route("/ai/feedback", post(ai::feedback))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::enforce_access_policy,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::attach_principal,
        ))
        .layer(cors::cors_layer(cors_config))
        .with_state(state)
}

/// Start the gateway bound to the configured port.
pub async fn run_with_config(config: Config) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.upload_dir)
        .with_context(|| format!("failed to create upload dir: {}", config.upload_dir.display()))?;

    let state = AppState::new(&config);
    let app = build_router(state, &config.cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Convenience entry point loading configuration from the environment.
pub async fn run() -> anyhow::Result<()> {
    run_with_config(Config::from_env()?).await
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    user: User,
    access_token: String,
    refresh_token: String,
}

/// Validate credentials and hand out a fresh access/refresh token pair.
/// Tokens are self-contained; nothing about them is retained server-side.
async fn login(State(state): State<AppState>, Json(payload): Json<LoginPayload>) -> impl IntoResponse {
    let user = match state.verifier.verify_credentials(&payload.username, &payload.password) {
        Ok(user) => user,
        Err(err) => {
            info!("auth.login rejected user={}", payload.username);
            return err.into_response();
        }
    };

    let access_token = match state.tokens.issue_access_token(&user.username) {
        Ok(t) => t,
        Err(e) => return crate::error::AppError::from(e).into_response(),
    };
    let refresh_token = match state.tokens.issue_refresh_token(&user.username) {
        Ok(t) => t,
        Err(e) => return crate::error::AppError::from(e).into_response(),
    };

    info!("auth.login user={}", user.username);
    Json(AuthResponse { user, access_token, refresh_token }).into_response()
}

/// Return the authenticated caller's user record. The policy gate already
/// requires a principal for this route; the handler re-checks so the route
/// stays correct even if the rule table is edited.
async fn me(request: Request) -> impl IntoResponse {
    match request.extensions().get::<Principal>() {
        Some(principal) => {
            Json(User::for_username(&principal.username)).into_response()
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"status": "unauthorized"})),
        )
            .into_response(),
    }
}

/// Stateless logout: there is no server-side session to clear and no
/// revocation list, so previously issued tokens stay valid until expiry.
/// Callers are expected to discard their tokens client-side.
async fn logout() -> impl IntoResponse {
    info!("auth.logout");
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}
