//! # Session Routes
//!
//! Login, logout and session status. Handlers live in [`crate::auth`];
//! this module only mounts them. Only `/api/login` is rate limited.

use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::{Extension, Router};

use crate::auth::{auth_check, login, logout};
use crate::middleware::rate_limit::{rate_limit_middleware, RateLimiter};
use crate::state::AppState;

pub fn router(limiter: RateLimiter) -> Router<AppState> {
    let login_routes = Router::new()
        .route("/api/login", post(login))
        .route_layer(from_fn(rate_limit_middleware))
        .layer(Extension(limiter));

    Router::new()
        .merge(login_routes)
        .route("/api/logout", post(logout))
        .route("/api/auth-check", get(auth_check))
}
