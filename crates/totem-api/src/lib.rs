//! # totem-api — Axum Service for the Notary Procedure Catalog
//!
//! Serves the admin CRUD surface over procedures, counters, requirements
//! and their associations, the public kiosk feed, and the static
//! front-end (kiosk, login and admin pages).
//!
//! ## API Surface
//!
//! | Prefix | Module | Domain |
//! |--------|--------|--------|
//! | `/api/tramites/*` | [`routes::tramites`] | Procedures |
//! | `/api/modulos/*` | [`routes::modulos`] | Service counters |
//! | `/api/requisitos/*` | [`routes::requisitos`] | Requirement lines |
//! | `/api/tramite-modulo/*` | [`routes::tramite_modulo`] | Associations |
//! | `/api/upload/*` | [`routes::upload`] | Icon files |
//! | `/api/login`, `/api/logout`, `/api/auth-check` | [`routes::session`] | Admin session |
//! | `/api/kiosk/*` | [`routes::kiosk`] | Public kiosk feed |
//! | `/`, `/login`, `/admin`, `/icons/*`, static | [`routes::pages`] | Front-end |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → Compression → SecurityHeaders → Metrics → BodyLimit → AdminGuard → Handler
//! ```
//!
//! Health probes and `/metrics` sit outside the admin guard.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod icons;
pub mod memory;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::Router;
use tower_http::compression::CompressionLayer;

use crate::state::AppState;

/// JSON request body limit outside the upload route.
pub const JSON_BODY_LIMIT: usize = 200 * 1024;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::tramites::router())
        .merge(routes::modulos::router())
        .merge(routes::requisitos::router())
        .merge(routes::tramite_modulo::router())
        .merge(routes::upload::router())
        .merge(routes::session::router(state.login_limiter.clone()))
        .merge(routes::kiosk::router())
        .merge(openapi::router())
        .merge(routes::pages::router())
        .layer(from_fn_with_state(state.clone(), auth::require_admin))
        .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT));

    let mut ops = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));
    if state.config.metrics_enabled {
        ops = ops.route("/metrics", get(middleware::metrics::render));
    }

    let icons = routes::pages::static_files(&state.config.icons_dir);
    let assets = routes::pages::static_files(&state.config.public_dir);

    let router = Router::new()
        .merge(ops)
        .merge(api)
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .with_state(state)
        .nest_service("/icons", icons)
        .fallback_service(assets);

    middleware::security::apply(router)
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer::layer())
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — 200 once the database answers, or immediately in
/// in-memory mode.
async fn readiness(State(state): State<AppState>) -> Result<&'static str, (StatusCode, &'static str)> {
    if let Some(pool) = &state.db_pool {
        if let Err(e) = db::ping(pool).await {
            tracing::warn!(error = %e, "readiness check failed");
            return Err((StatusCode::SERVICE_UNAVAILABLE, "database unavailable"));
        }
    }
    Ok("ready")
}
