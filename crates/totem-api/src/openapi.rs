//! # OpenAPI Document Assembly
//!
//! Collects the utoipa-documented handlers and schemas into one OpenAPI
//! document served at `/api/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::SESSION_COOKIE;
use crate::state::AppState;

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    SESSION_COOKIE,
                    "Signed admin session cookie issued by POST /api/login.",
                ))),
            );
        }
    }
}

/// OpenAPI document for the catalog service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Totem — Notary Procedure Catalog",
        version = "0.1.0",
        description = "Admin CRUD over procedures (trámites), service counters (módulos), requirement lines (requisitos) and their associations, plus the public kiosk feed.\n\nProcedure reads and everything under `/api/kiosk/` are public. Every other `/api/*` call needs the admin session cookie from `POST /api/login`.",
        license(name = "AGPL-3.0-or-later")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server"),
    ),
    paths(
        // ── Procedures ──────────────────────────────────────────────────
        crate::routes::tramites::list_tramites,
        crate::routes::tramites::get_tramite,
        crate::routes::tramites::create_tramite,
        crate::routes::tramites::update_tramite,
        crate::routes::tramites::delete_tramite,
        // ── Counters ────────────────────────────────────────────────────
        crate::routes::modulos::list_modulos,
        crate::routes::modulos::get_modulo,
        crate::routes::modulos::create_modulo,
        crate::routes::modulos::update_modulo,
        crate::routes::modulos::delete_modulo,
        // ── Requirements ────────────────────────────────────────────────
        crate::routes::requisitos::list_requisitos,
        crate::routes::requisitos::get_requisito,
        crate::routes::requisitos::create_requisito,
        crate::routes::requisitos::update_requisito,
        crate::routes::requisitos::delete_requisito,
        // ── Associations ────────────────────────────────────────────────
        crate::routes::tramite_modulo::list_associations,
        crate::routes::tramite_modulo::get_association,
        crate::routes::tramite_modulo::create_association,
        crate::routes::tramite_modulo::delete_association,
        // ── Icons ───────────────────────────────────────────────────────
        crate::routes::upload::upload_icon,
        crate::routes::upload::delete_icon,
        // ── Session ─────────────────────────────────────────────────────
        crate::auth::login,
        crate::auth::logout,
        crate::auth::auth_check,
        // ── Kiosk ───────────────────────────────────────────────────────
        crate::routes::kiosk::kiosk_config,
        crate::routes::kiosk::kiosk_page,
    ),
    components(
        schemas(
            totem_core::Tramite,
            totem_core::TramiteDetail,
            totem_core::Modulo,
            totem_core::Requisito,
            totem_core::TramiteModulo,
            totem_core::TramiteInput,
            totem_core::ModuloInput,
            totem_core::NewRequisito,
            totem_core::RequisitoUpdate,
            totem_core::KioskSettings,
            totem_core::SpeechSettings,
            totem_core::NavButtons,
            crate::error::ErrorBody,
            crate::error::ErrorDetail,
            crate::auth::LoginRequest,
            crate::auth::LoginResponse,
            crate::auth::AuthStatus,
            crate::routes::upload::UploadResponse,
            crate::routes::kiosk::KioskCard,
            crate::routes::kiosk::KioskPage,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "tramites", description = "Procedures"),
        (name = "modulos", description = "Service counters"),
        (name = "requisitos", description = "Requirement lines"),
        (name = "tramite-modulo", description = "Procedure/counter associations"),
        (name = "upload", description = "Icon files"),
        (name = "session", description = "Admin login"),
        (name = "kiosk", description = "Public kiosk feed"),
    )
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_catalog_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/tramites"));
        assert!(paths.contains_key("/api/tramites/{id}"));
        assert!(paths.contains_key("/api/tramite-modulo/{tramite_id}/{modulo_id}"));
        assert!(paths.contains_key("/api/kiosk/pages/{page}"));
    }

    #[test]
    fn document_has_cookie_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("session_cookie"));
    }
}
