//! # Icon Upload Routes
//!
//! `POST /api/upload` stores the multipart field `file` under a generated
//! name and answers with the public URL. `DELETE /api/upload/{filename}`
//! removes a stored icon; names that could escape the icons directory are
//! rejected before touching the filesystem.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::PathRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, ErrorBody};
use crate::extractors::extract_path;
use crate::icons::MAX_ICON_BYTES;
use crate::state::AppState;

/// Multipart framing allowance on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Stored icon reference.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Generated filename, to be saved in a record's `icono`.
    pub filename: String,
    /// Public URL, `/icons/<filename>`.
    pub url: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/upload",
            post(upload_icon).layer(DefaultBodyLimit::max(MAX_ICON_BYTES + MULTIPART_OVERHEAD)),
        )
        .route("/api/upload/{filename}", delete(delete_icon))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}

/// POST /api/upload — Store an icon.
#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content_type = "multipart/form-data", description = "Form with a `file` field"),
    responses(
        (status = 200, description = "Icon stored", body = UploadResponse),
        (status = 400, description = "Missing file or unsupported type", body = ErrorBody),
        (status = 413, description = "File too large", body = ErrorBody),
    ),
    tag = "upload"
)]
pub async fn upload_icon(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let original = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        let filename = state.catalog.icons().save(&original, &bytes).await?;
        let url = format!("/icons/{filename}");
        return Ok(Json(UploadResponse { filename, url }));
    }

    Err(AppError::InvalidUpload("no file uploaded".to_string()))
}

/// DELETE /api/upload/{filename} — Remove a stored icon.
#[utoipa::path(
    delete,
    path = "/api/upload/{filename}",
    params(("filename" = String, Path, description = "Stored icon filename")),
    responses(
        (status = 204, description = "Icon deleted"),
        (status = 400, description = "Invalid filename", body = ErrorBody),
        (status = 404, description = "No such icon", body = ErrorBody),
    ),
    tag = "upload"
)]
pub async fn delete_icon(
    State(state): State<AppState>,
    filename: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let filename = extract_path(filename)?;
    if state.catalog.icons().delete(&filename).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("icon {filename}")))
    }
}
