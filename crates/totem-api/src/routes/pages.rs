//! # Pages & Static Assets
//!
//! The three HTML entry points are read from the public directory on each
//! request and never cached by the browser. Everything else under the
//! public directory, and uploaded icons under `/icons/`, is served as
//! static files with a long immutable cache lifetime.

use std::path::Path;

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue};
use axum::middleware::{from_fn, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use axum_extra::extract::cookie::SignedCookieJar;
use tower_http::services::ServeDir;

use crate::auth::is_admin;
use crate::error::AppError;
use crate::state::AppState;

const NO_CACHE: &str = "no-cache";
const IMMUTABLE: &str = "public, max-age=604800, immutable";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(kiosk_page))
        .route("/login", get(login_page))
        .route("/admin", get(admin_page))
}

/// Static file service for `dir` with cache headers by file type.
pub fn static_files(dir: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(from_fn(static_cache_headers))
}

async fn html_file(state: &AppState, name: &str) -> Result<Response, AppError> {
    let path = state.config.public_dir.join(name);
    let body = tokio::fs::read_to_string(&path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::NotFound(format!("page {name}"))
        } else {
            AppError::Internal(format!("reading {}: {e}", path.display()))
        }
    })?;
    Ok(([(header::CACHE_CONTROL, NO_CACHE)], Html(body)).into_response())
}

/// GET / — Kiosk.
async fn kiosk_page(State(state): State<AppState>) -> Result<Response, AppError> {
    html_file(&state, "index.html").await
}

/// GET /login — Admin login form.
async fn login_page(State(state): State<AppState>) -> Result<Response, AppError> {
    html_file(&state, "login.html").await
}

/// GET /admin — Admin console with a session, login form without.
async fn admin_page(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<Response, AppError> {
    if is_admin(&state, &jar) {
        html_file(&state, "admin.html").await
    } else {
        html_file(&state, "login.html").await
    }
}

/// `Cache-Control` for a static file, chosen by extension.
fn cache_policy(path: &str) -> Option<&'static str> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("html") | None => Some(NO_CACHE),
        Some("js" | "css" | "png" | "jpg" | "jpeg" | "svg" | "webp" | "avif" | "ico" | "gif") => {
            Some(IMMUTABLE)
        }
        Some(_) => None,
    }
}

async fn static_cache_headers(request: Request, next: Next) -> Response {
    let policy = cache_policy(request.uri().path());
    let mut response = next.run(request).await;
    if let Some(policy) = policy {
        if response.status().is_success() {
            response
                .headers_mut()
                .insert(header::CACHE_CONTROL, HeaderValue::from_static(policy));
        }
    }
    response
}
