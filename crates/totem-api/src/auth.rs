//! # Admin Session Authentication
//!
//! A single admin password unlocks the catalog's write surface. A
//! successful login creates a server-side session whose id travels in the
//! signed `totem.sid` cookie (`HttpOnly`, `SameSite=Lax`).
//!
//! ## Access rules
//!
//! The guard runs over every `/api/*` request:
//!
//! | Request | Access |
//! |---------|--------|
//! | `GET /api/tramites`, `GET /api/tramites/{id}` | public |
//! | anything under `/api/kiosk/` | public |
//! | `/api/login`, `/api/logout`, `/api/auth-check`, `/api/openapi.json` | public |
//! | every other `/api/*` call | admin session, else 401 |
//!
//! Sessions expire 30 minutes after login. Expired sessions are dropped
//! the next time they are presented and swept by [`SessionStore::purge_expired`].

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Request, State};
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "totem.sid";

/// Session lifetime after login, in minutes.
pub const SESSION_TTL_MINUTES: i64 = 30;

// -- Sessions -----------------------------------------------------------------

#[derive(Debug, Clone)]
struct Session {
    expires_at: DateTime<Utc>,
}

/// In-memory admin sessions keyed by the cookie's session id.
#[derive(Debug, Clone)]
pub struct SessionStore {
    ttl: TimeDelta,
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(TimeDelta::minutes(SESSION_TTL_MINUTES))
    }
}

impl SessionStore {
    pub fn new(ttl: TimeDelta) -> Self {
        Self {
            ttl,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Open a fresh admin session and return its id.
    pub fn create_admin(&self) -> Uuid {
        self.create_admin_at(Utc::now())
    }

    pub fn create_admin_at(&self, now: DateTime<Utc>) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.write().insert(
            id,
            Session {
                expires_at: now + self.ttl,
            },
        );
        id
    }

    /// Whether `id` names a live admin session.
    pub fn is_admin(&self, id: &Uuid) -> bool {
        self.is_admin_at(id, Utc::now())
    }

    pub fn is_admin_at(&self, id: &Uuid, now: DateTime<Utc>) -> bool {
        let live = match self.sessions.read().get(id) {
            None => return false,
            Some(session) => session.expires_at > now,
        };
        if !live {
            self.destroy(id);
        }
        live
    }

    pub fn destroy(&self, id: &Uuid) {
        self.sessions.write().remove(id);
    }

    /// Drop every expired session; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > now);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Session id carried by the request's signed cookie, if any.
pub fn session_id(jar: &SignedCookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

/// Whether the request carries a live admin session.
pub fn is_admin(state: &AppState, jar: &SignedCookieJar) -> bool {
    session_id(jar).is_some_and(|id| state.sessions.is_admin(&id))
}

// -- Password check -----------------------------------------------------------

/// Constant-time password comparison.
///
/// Length mismatch still performs a comparison so the timing does not
/// depend on how much of the prefix matched.
fn constant_time_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

// -- Guard --------------------------------------------------------------------

/// Requests that never need a session.
pub fn is_public(method: &Method, path: &str) -> bool {
    if !path.starts_with("/api/") {
        return true;
    }
    if path.starts_with("/api/kiosk/") {
        return true;
    }
    if matches!(
        path,
        "/api/login" | "/api/logout" | "/api/auth-check" | "/api/openapi.json"
    ) {
        return true;
    }
    if method == Method::GET || method == Method::HEAD {
        if path == "/api/tramites" {
            return true;
        }
        if let Some(rest) = path.strip_prefix("/api/tramites/") {
            return !rest.is_empty() && !rest.contains('/');
        }
    }
    false
}

/// Middleware rejecting non-public `/api/*` calls without an admin session.
pub async fn require_admin(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    request: Request,
    next: Next,
) -> Response {
    if is_public(request.method(), request.uri().path()) || is_admin(&state, &jar) {
        return next.run(request).await;
    }
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorBody::new("UNAUTHORIZED", "Not authenticated")),
    )
        .into_response()
}

// -- Handlers -----------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), String> {
        if self.password.is_empty() {
            return Err("password must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthStatus {
    pub authenticated: bool,
}

/// POST /api/login — Exchange the admin password for a session cookie.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; session cookie set", body = LoginResponse),
        (status = 401, description = "Wrong password", body = ErrorBody),
        (status = 429, description = "Too many login attempts", body = ErrorBody),
    ),
    tag = "session"
)]
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(SignedCookieJar, Json<LoginResponse>), AppError> {
    let req = extract_validated_json(body)?;

    if !constant_time_eq(&req.password, state.config.admin_password.expose()) {
        tracing::warn!("admin login rejected");
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    }

    // Regenerate: never keep a session id that existed before login.
    if let Some(previous) = session_id(&jar) {
        state.sessions.destroy(&previous);
    }
    let id = state.sessions.create_admin();
    state.sessions.purge_expired();

    let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.secure_cookies());

    tracing::info!("admin logged in");
    Ok((jar.add(cookie), Json(LoginResponse { ok: true })))
}

/// POST /api/logout — End the session and clear the cookie.
#[utoipa::path(
    post,
    path = "/api/logout",
    responses(
        (status = 200, description = "Logged out", body = LoginResponse),
    ),
    tag = "session"
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> (SignedCookieJar, Json<LoginResponse>) {
    if let Some(id) = session_id(&jar) {
        state.sessions.destroy(&id);
        tracing::info!("admin logged out");
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Json(LoginResponse { ok: true }))
}

/// GET /api/auth-check — Whether the caller holds an admin session.
#[utoipa::path(
    get,
    path = "/api/auth-check",
    responses(
        (status = 200, description = "Session status", body = AuthStatus),
    ),
    tag = "session"
)]
pub async fn auth_check(State(state): State<AppState>, jar: SignedCookieJar) -> Json<AuthStatus> {
    Json(AuthStatus {
        authenticated: is_admin(&state, &jar),
    })
}
