//! File upload and serving. Demo collaborator: the shipped policy leaves
//! these routes public, and the only contract with the auth core is that
//! reachability is the policy's decision.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::AppError;
use crate::server::AppState;

/// Store an uploaded file under a fresh UUID name, keeping the original
/// extension so served content types stay sensible.
pub async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let original = field.file_name().unwrap_or("file").to_string();
        let bytes = match field.bytes().await {
            Ok(b) => b,
            Err(e) => {
                error!("upload read failed: {e}");
                return AppError::user("bad_upload", "failed to read upload").into_response();
            }
        };

        let ext = original.rfind('.').map(|i| original[i..].to_string()).unwrap_or_default();
        let stored = format!("{}{}", Uuid::new_v4(), ext);
        let target = state.upload_dir.join(&stored);
        if let Err(e) = std::fs::write(&target, &bytes) {
            error!("upload write failed: {e}");
            return AppError::io("upload_failed", "failed to upload file").into_response();
        }

        info!("files.upload name={} stored={} size={}", original, stored, bytes.len());
        return Json(json!({
            "name": original,
            "path": format!("/files/{stored}"),
            "size": bytes.len(),
        }))
        .into_response();
    }

    AppError::user("bad_upload", "missing 'file' field").into_response()
}

/// Serve a previously uploaded file as an attachment. Names are opaque UUID
/// strings; anything trying to walk out of the upload dir is treated as
/// absent.
pub async fn serve(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    if name.contains('/') || name.contains("..") {
        return StatusCode::NOT_FOUND.into_response();
    }

    let path = state.upload_dir.join(&name);
    let bytes = match std::fs::read(&path) {
        Ok(b) => b,
        Err(_) => return StatusCode::NOT_FOUND.into_response(),
    };

    let content_type = content_type_for(&name);
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{name}\"")),
        ],
        bytes,
    )
        .into_response()
}

/// Content type from the file extension; unknown extensions fall back to
/// an opaque octet stream.
fn content_type_for(name: &str) -> &'static str {
    let ext = name.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "html" => "text/html",
        "css" => "text/css",
        "js" => "text/javascript",
        "json" => "application/json",
        "mp4" => "video/mp4",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}
