//! # Procedure Routes
//!
//! Reads are public and carry a short shared-cache lifetime so the kiosk
//! can poll them; writes need an admin session.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use totem_core::{Tramite, TramiteDetail, TramiteInput};

use super::PUBLIC_READ_CACHE;
use crate::error::{AppError, ErrorBody};
use crate::extractors::{extract_path, extract_validated_json};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tramites", get(list_tramites).post(create_tramite))
        .route(
            "/api/tramites/{id}",
            get(get_tramite).put(update_tramite).delete(delete_tramite),
        )
}

/// GET /api/tramites — All procedures.
#[utoipa::path(
    get,
    path = "/api/tramites",
    responses(
        (status = 200, description = "All procedures ordered by id", body = Vec<Tramite>),
    ),
    tag = "tramites"
)]
pub async fn list_tramites(
    State(state): State<AppState>,
) -> Result<([(header::HeaderName, &'static str); 1], Json<Vec<Tramite>>), AppError> {
    let list = state.catalog.list_tramites().await?;
    Ok(([(header::CACHE_CONTROL, PUBLIC_READ_CACHE)], Json(list)))
}

/// GET /api/tramites/{id} — A procedure with requirements and counters.
#[utoipa::path(
    get,
    path = "/api/tramites/{id}",
    params(("id" = i64, Path, description = "Procedure id")),
    responses(
        (status = 200, description = "Procedure detail", body = TramiteDetail),
        (status = 404, description = "Procedure not found", body = ErrorBody),
    ),
    tag = "tramites"
)]
pub async fn get_tramite(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<([(header::HeaderName, &'static str); 1], Json<TramiteDetail>), AppError> {
    let id = extract_path(id)?;
    let detail = state
        .catalog
        .get_tramite(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("tramite {id}")))?;
    Ok(([(header::CACHE_CONTROL, PUBLIC_READ_CACHE)], Json(detail)))
}

/// POST /api/tramites — Create a procedure.
#[utoipa::path(
    post,
    path = "/api/tramites",
    request_body = TramiteInput,
    responses(
        (status = 201, description = "Procedure created", body = Tramite),
        (status = 422, description = "Validation error", body = ErrorBody),
    ),
    tag = "tramites"
)]
pub async fn create_tramite(
    State(state): State<AppState>,
    body: Result<Json<TramiteInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Tramite>), AppError> {
    let input = extract_validated_json(body)?;
    let tramite = state.catalog.create_tramite(input).await?;
    Ok((StatusCode::CREATED, Json(tramite)))
}

/// PUT /api/tramites/{id} — Replace a procedure's title and icon.
#[utoipa::path(
    put,
    path = "/api/tramites/{id}",
    params(("id" = i64, Path, description = "Procedure id")),
    request_body = TramiteInput,
    responses(
        (status = 200, description = "Procedure updated", body = Tramite),
        (status = 404, description = "Procedure not found", body = ErrorBody),
        (status = 422, description = "Validation error", body = ErrorBody),
    ),
    tag = "tramites"
)]
pub async fn update_tramite(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<TramiteInput>, JsonRejection>,
) -> Result<Json<Tramite>, AppError> {
    let id = extract_path(id)?;
    let input = extract_validated_json(body)?;
    state
        .catalog
        .update_tramite(id, input)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("tramite {id}")))
}

/// DELETE /api/tramites/{id} — Delete a procedure with its requirements,
/// associations and icon.
#[utoipa::path(
    delete,
    path = "/api/tramites/{id}",
    params(("id" = i64, Path, description = "Procedure id")),
    responses(
        (status = 204, description = "Procedure deleted"),
        (status = 404, description = "Procedure not found", body = ErrorBody),
    ),
    tag = "tramites"
)]
pub async fn delete_tramite(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = extract_path(id)?;
    if state.catalog.delete_tramite(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("tramite {id}")))
    }
}
