//! # Kiosk Routes
//!
//! Public feed for the touchscreen front-end: its timing and speech
//! settings, and the procedure catalog cut into pages of cards with the
//! range label and arrow visibility already worked out.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::header;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use totem_core::{KioskSettings, NavButtons, Pager};
use utoipa::ToSchema;

use super::PUBLIC_READ_CACHE;
use crate::error::{AppError, ErrorBody};
use crate::extractors::extract_path;
use crate::state::AppState;

/// One procedure card.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KioskCard {
    /// 1-based position across all pages.
    pub numero: usize,
    pub id: i64,
    pub titulo: String,
    pub icono: Option<String>,
}

/// One page of cards.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KioskPage {
    /// 0-based page index.
    pub page: usize,
    pub page_count: usize,
    /// `"start-end / total"`.
    pub range: String,
    pub cards: Vec<KioskCard>,
    pub nav: NavButtons,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/kiosk/config", get(kiosk_config))
        .route("/api/kiosk/pages/{page}", get(kiosk_page))
}

/// GET /api/kiosk/config — Kiosk timings, messages and speech settings.
#[utoipa::path(
    get,
    path = "/api/kiosk/config",
    responses(
        (status = 200, description = "Kiosk settings", body = KioskSettings),
    ),
    tag = "kiosk"
)]
pub async fn kiosk_config(State(state): State<AppState>) -> Json<KioskSettings> {
    Json(state.config.kiosk.clone())
}

/// GET /api/kiosk/pages/{page} — One page of procedure cards.
///
/// Page 0 of an empty catalog is an empty page; any other page past the
/// end is 404.
#[utoipa::path(
    get,
    path = "/api/kiosk/pages/{page}",
    params(("page" = usize, Path, description = "0-based page index")),
    responses(
        (status = 200, description = "Page of cards", body = KioskPage),
        (status = 404, description = "Page past the end", body = ErrorBody),
    ),
    tag = "kiosk"
)]
pub async fn kiosk_page(
    State(state): State<AppState>,
    page: Result<Path<usize>, PathRejection>,
) -> Result<([(header::HeaderName, &'static str); 1], Json<KioskPage>), AppError> {
    let page = extract_path(page)?;
    let tramites = state.catalog.list_tramites().await?;
    let pager = Pager::at(tramites.len(), state.config.kiosk.cards_per_page, page);

    if pager.current() != page {
        return Err(AppError::NotFound(format!("kiosk page {page}")));
    }

    let bounds = pager.page_bounds();
    let cards = tramites[bounds]
        .iter()
        .enumerate()
        .map(|(index, tramite)| KioskCard {
            numero: pager.card_number(index),
            id: tramite.id,
            titulo: tramite.titulo.clone(),
            icono: tramite.icono.clone(),
        })
        .collect();

    let body = KioskPage {
        page,
        page_count: pager.page_count(),
        range: pager.range_label(),
        cards,
        nav: pager.nav(false),
    };
    Ok(([(header::CACHE_CONTROL, PUBLIC_READ_CACHE)], Json(body)))
}
