//! # Requirement Routes
//!
//! New requirements are appended after the procedure's last one; updates
//! may move a requirement by sending an explicit `sort_order`.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use totem_core::{NewRequisito, Requisito, RequisitoFilter, RequisitoUpdate};

use crate::error::{AppError, ErrorBody};
use crate::extractors::{extract_path, extract_query, extract_validated_json};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/requisitos", get(list_requisitos).post(create_requisito))
        .route(
            "/api/requisitos/{id}",
            get(get_requisito).put(update_requisito).delete(delete_requisito),
        )
}

/// GET /api/requisitos — Requirements, optionally for one procedure.
#[utoipa::path(
    get,
    path = "/api/requisitos",
    params(RequisitoFilter),
    responses(
        (status = 200, description = "Requirements in display order", body = Vec<Requisito>),
    ),
    tag = "requisitos"
)]
pub async fn list_requisitos(
    State(state): State<AppState>,
    filter: Result<Query<RequisitoFilter>, QueryRejection>,
) -> Result<Json<Vec<Requisito>>, AppError> {
    let filter = extract_query(filter)?;
    Ok(Json(state.catalog.list_requisitos(filter).await?))
}

/// GET /api/requisitos/{id} — One requirement.
#[utoipa::path(
    get,
    path = "/api/requisitos/{id}",
    params(("id" = i64, Path, description = "Requirement id")),
    responses(
        (status = 200, description = "Requirement", body = Requisito),
        (status = 404, description = "Requirement not found", body = ErrorBody),
    ),
    tag = "requisitos"
)]
pub async fn get_requisito(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Requisito>, AppError> {
    let id = extract_path(id)?;
    state
        .catalog
        .get_requisito(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("requisito {id}")))
}

/// POST /api/requisitos — Append a requirement to a procedure.
#[utoipa::path(
    post,
    path = "/api/requisitos",
    request_body = NewRequisito,
    responses(
        (status = 201, description = "Requirement created", body = Requisito),
        (status = 404, description = "Procedure not found", body = ErrorBody),
        (status = 422, description = "Validation error", body = ErrorBody),
    ),
    tag = "requisitos"
)]
pub async fn create_requisito(
    State(state): State<AppState>,
    body: Result<Json<NewRequisito>, JsonRejection>,
) -> Result<(StatusCode, Json<Requisito>), AppError> {
    let input = extract_validated_json(body)?;
    let requisito = state.catalog.create_requisito(input).await?;
    Ok((StatusCode::CREATED, Json(requisito)))
}

/// PUT /api/requisitos/{id} — Edit a requirement's text and, optionally, position.
#[utoipa::path(
    put,
    path = "/api/requisitos/{id}",
    params(("id" = i64, Path, description = "Requirement id")),
    request_body = RequisitoUpdate,
    responses(
        (status = 200, description = "Requirement updated", body = Requisito),
        (status = 404, description = "Requirement not found", body = ErrorBody),
        (status = 422, description = "Validation error", body = ErrorBody),
    ),
    tag = "requisitos"
)]
pub async fn update_requisito(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<RequisitoUpdate>, JsonRejection>,
) -> Result<Json<Requisito>, AppError> {
    let id = extract_path(id)?;
    let input = extract_validated_json(body)?;
    state
        .catalog
        .update_requisito(id, input)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("requisito {id}")))
}

/// DELETE /api/requisitos/{id} — Delete a requirement.
#[utoipa::path(
    delete,
    path = "/api/requisitos/{id}",
    params(("id" = i64, Path, description = "Requirement id")),
    responses(
        (status = 204, description = "Requirement deleted"),
        (status = 404, description = "Requirement not found", body = ErrorBody),
    ),
    tag = "requisitos"
)]
pub async fn delete_requisito(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = extract_path(id)?;
    if state.catalog.delete_requisito(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("requisito {id}")))
    }
}
