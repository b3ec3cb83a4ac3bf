//! In-memory key/value store over raw string values. Demo collaborator:
//! values live only for the process lifetime and the shipped policy leaves
//! the routes public.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::server::AppState;

pub async fn set(State(state): State<AppState>, Path(key): Path<String>, body: String) -> StatusCode {
    state.kv.write().insert(key, body);
    StatusCode::OK
}

pub async fn fetch(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    match state.kv.read().get(&key) {
        Some(value) => value.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Deleting an absent key is fine; the operation is idempotent.
pub async fn remove(State(state): State<AppState>, Path(key): Path<String>) -> StatusCode {
    state.kv.write().remove(&key);
    StatusCode::OK
}
