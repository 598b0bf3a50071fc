//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps catalog, validation and icon errors to HTTP status codes with a
//! JSON body carrying an error code and message. Internal error details
//! are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::catalog::CatalogError;
use crate::icons::IconError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorBody {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body, path or query could not be parsed (422).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or wrong credentials (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Conflict with current resource state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Uploaded or referenced icon file rejected (400).
    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    /// Request body exceeds the accepted size (413).
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::UNPROCESSABLE_ENTITY, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::InvalidUpload(_) => (StatusCode::BAD_REQUEST, "INVALID_UPLOAD"),
            Self::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if let Self::Internal(_) = &self {
            tracing::error!(error = %self, "internal server error");
        }

        (status, Json(ErrorBody::new(code, message))).into_response()
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(what) => Self::NotFound(what),
            CatalogError::Validation(e) => Self::Validation(e.to_string()),
            CatalogError::Conflict(what) => Self::Conflict(what),
            CatalogError::Database(e) => Self::Internal(format!("database: {e}")),
        }
    }
}

impl From<IconError> for AppError {
    fn from(err: IconError) -> Self {
        match err {
            IconError::Extension | IconError::InvalidName => Self::InvalidUpload(err.to_string()),
            IconError::TooLarge { .. } => Self::PayloadTooLarge(err.to_string()),
            IconError::Io(e) => Self::Internal(format!("icon storage: {e}")),
        }
    }
}

impl From<totem_core::ValidationError> for AppError {
    fn from(err: totem_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn not_found_status_code() {
        let (status, code) = AppError::NotFound("tramite 9".into()).status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_FOUND");
    }

    #[test]
    fn bad_request_is_unprocessable() {
        let (status, code) = AppError::BadRequest("malformed JSON".into()).status_and_code();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, "BAD_REQUEST");
    }

    #[test]
    fn conflict_status_code() {
        let (status, _) = AppError::Conflict("dup".into()).status_and_code();
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[test]
    fn catalog_errors_map_to_statuses() {
        let err = AppError::from(CatalogError::NotFound("modulo 3".into()));
        assert!(matches!(err, AppError::NotFound(_)));

        let err = AppError::from(CatalogError::Validation(
            totem_core::ValidationError::Empty { field: "titulo" },
        ));
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("titulo")));

        let err = AppError::from(CatalogError::Database(sqlx::Error::PoolTimedOut));
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn icon_errors_map_to_statuses() {
        assert!(matches!(
            AppError::from(IconError::InvalidName),
            AppError::InvalidUpload(_)
        ));
        assert!(matches!(
            AppError::from(IconError::TooLarge { limit: 10 }),
            AppError::PayloadTooLarge(_)
        ));
    }

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn into_response_not_found() {
        let (status, body) = response_parts(AppError::NotFound("tramite 42".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error.code, "NOT_FOUND");
        assert!(body.error.message.contains("tramite 42"));
    }

    #[tokio::test]
    async fn into_response_internal_hides_details() {
        let (status, body) =
            response_parts(AppError::Internal("db connection failed".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "INTERNAL_ERROR");
        assert_eq!(body.error.message, "An internal error occurred");
    }
}
