//! # Association Routes
//!
//! Links between procedures and the counters that attend them. A pair is
//! identified by both ids; there is nothing to update.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use totem_core::{AssociationFilter, TramiteModulo};

use crate::error::{AppError, ErrorBody};
use crate::extractors::{extract_path, extract_query, extract_validated_json};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/tramite-modulo",
            get(list_associations).post(create_association),
        )
        .route(
            "/api/tramite-modulo/{tramite_id}/{modulo_id}",
            get(get_association).delete(delete_association),
        )
}

fn link_from_path(path: Result<Path<(i64, i64)>, PathRejection>) -> Result<TramiteModulo, AppError> {
    let (tramite_id, modulo_id) = extract_path(path)?;
    Ok(TramiteModulo {
        tramite_id,
        modulo_id,
    })
}

/// GET /api/tramite-modulo — Associations filtered by either side.
#[utoipa::path(
    get,
    path = "/api/tramite-modulo",
    params(AssociationFilter),
    responses(
        (status = 200, description = "Associations ordered by procedure, then counter", body = Vec<TramiteModulo>),
    ),
    tag = "tramite-modulo"
)]
pub async fn list_associations(
    State(state): State<AppState>,
    filter: Result<Query<AssociationFilter>, QueryRejection>,
) -> Result<Json<Vec<TramiteModulo>>, AppError> {
    let filter = extract_query(filter)?;
    Ok(Json(state.catalog.list_associations(filter).await?))
}

/// GET /api/tramite-modulo/{tramite_id}/{modulo_id} — One association.
#[utoipa::path(
    get,
    path = "/api/tramite-modulo/{tramite_id}/{modulo_id}",
    params(
        ("tramite_id" = i64, Path, description = "Procedure id"),
        ("modulo_id" = i64, Path, description = "Counter id"),
    ),
    responses(
        (status = 200, description = "Association", body = TramiteModulo),
        (status = 404, description = "Association not found", body = ErrorBody),
    ),
    tag = "tramite-modulo"
)]
pub async fn get_association(
    State(state): State<AppState>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<Json<TramiteModulo>, AppError> {
    let link = link_from_path(path)?;
    state
        .catalog
        .get_association(link)
        .await?
        .map(Json)
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "association {}/{}",
                link.tramite_id, link.modulo_id
            ))
        })
}

/// POST /api/tramite-modulo — Associate a procedure with a counter.
#[utoipa::path(
    post,
    path = "/api/tramite-modulo",
    request_body = TramiteModulo,
    responses(
        (status = 201, description = "Association created", body = TramiteModulo),
        (status = 404, description = "Procedure or counter not found", body = ErrorBody),
        (status = 409, description = "Association already exists", body = ErrorBody),
        (status = 422, description = "Validation error", body = ErrorBody),
    ),
    tag = "tramite-modulo"
)]
pub async fn create_association(
    State(state): State<AppState>,
    body: Result<Json<TramiteModulo>, JsonRejection>,
) -> Result<(StatusCode, Json<TramiteModulo>), AppError> {
    let link = extract_validated_json(body)?;
    let link = state.catalog.create_association(link).await?;
    Ok((StatusCode::CREATED, Json(link)))
}

/// DELETE /api/tramite-modulo/{tramite_id}/{modulo_id} — Remove an association.
#[utoipa::path(
    delete,
    path = "/api/tramite-modulo/{tramite_id}/{modulo_id}",
    params(
        ("tramite_id" = i64, Path, description = "Procedure id"),
        ("modulo_id" = i64, Path, description = "Counter id"),
    ),
    responses(
        (status = 204, description = "Association deleted"),
        (status = 404, description = "Association not found", body = ErrorBody),
    ),
    tag = "tramite-modulo"
)]
pub async fn delete_association(
    State(state): State<AppState>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let link = link_from_path(path)?;
    if state.catalog.delete_association(link).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!(
            "association {}/{}",
            link.tramite_id, link.modulo_id
        )))
    }
}
