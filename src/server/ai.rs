//! Placeholder feedback endpoint. Returns a fixed canned payload whose
//! `message.content` is itself a JSON string the frontend parses.

use axum::Json;
use axum::extract::Query;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const CANNED_FEEDBACK: &str = "{\"score\": 85, \"comments\": \"This is sample feedback\"}";

#[derive(Debug, Deserialize)]
pub struct FeedbackParams {
    pub path: String,
}

pub async fn feedback(Query(params): Query<FeedbackParams>, _instructions: String) -> impl IntoResponse {
    debug!("ai.feedback path={}", params.path);
    Json(json!({"message": {"content": CANNED_FEEDBACK}}))
}
