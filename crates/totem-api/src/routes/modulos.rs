//! # Counter Routes
//!
//! Admin-only CRUD over service counters. Lists come back in counter
//! order (number, floor, name).

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use totem_core::{Modulo, ModuloInput};

use crate::error::{AppError, ErrorBody};
use crate::extractors::{extract_path, extract_validated_json};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/modulos", get(list_modulos).post(create_modulo))
        .route(
            "/api/modulos/{id}",
            get(get_modulo).put(update_modulo).delete(delete_modulo),
        )
}

/// GET /api/modulos — All counters.
#[utoipa::path(
    get,
    path = "/api/modulos",
    responses(
        (status = 200, description = "All counters in counter order", body = Vec<Modulo>),
        (status = 401, description = "Not authenticated", body = ErrorBody),
    ),
    tag = "modulos"
)]
pub async fn list_modulos(State(state): State<AppState>) -> Result<Json<Vec<Modulo>>, AppError> {
    Ok(Json(state.catalog.list_modulos().await?))
}

/// GET /api/modulos/{id} — One counter.
#[utoipa::path(
    get,
    path = "/api/modulos/{id}",
    params(("id" = i64, Path, description = "Counter id")),
    responses(
        (status = 200, description = "Counter", body = Modulo),
        (status = 404, description = "Counter not found", body = ErrorBody),
    ),
    tag = "modulos"
)]
pub async fn get_modulo(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Modulo>, AppError> {
    let id = extract_path(id)?;
    state
        .catalog
        .get_modulo(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("modulo {id}")))
}

/// POST /api/modulos — Create a counter.
#[utoipa::path(
    post,
    path = "/api/modulos",
    request_body = ModuloInput,
    responses(
        (status = 201, description = "Counter created", body = Modulo),
        (status = 422, description = "Validation error", body = ErrorBody),
    ),
    tag = "modulos"
)]
pub async fn create_modulo(
    State(state): State<AppState>,
    body: Result<Json<ModuloInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Modulo>), AppError> {
    let input = extract_validated_json(body)?;
    let modulo = state.catalog.create_modulo(input).await?;
    Ok((StatusCode::CREATED, Json(modulo)))
}

/// PUT /api/modulos/{id} — Replace a counter.
#[utoipa::path(
    put,
    path = "/api/modulos/{id}",
    params(("id" = i64, Path, description = "Counter id")),
    request_body = ModuloInput,
    responses(
        (status = 200, description = "Counter updated", body = Modulo),
        (status = 404, description = "Counter not found", body = ErrorBody),
        (status = 422, description = "Validation error", body = ErrorBody),
    ),
    tag = "modulos"
)]
pub async fn update_modulo(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ModuloInput>, JsonRejection>,
) -> Result<Json<Modulo>, AppError> {
    let id = extract_path(id)?;
    let input = extract_validated_json(body)?;
    state
        .catalog
        .update_modulo(id, input)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("modulo {id}")))
}

/// DELETE /api/modulos/{id} — Delete a counter, its associations and icon.
#[utoipa::path(
    delete,
    path = "/api/modulos/{id}",
    params(("id" = i64, Path, description = "Counter id")),
    responses(
        (status = 204, description = "Counter deleted"),
        (status = 404, description = "Counter not found", body = ErrorBody),
    ),
    tag = "modulos"
)]
pub async fn delete_modulo(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = extract_path(id)?;
    if state.catalog.delete_modulo(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("modulo {id}")))
    }
}
