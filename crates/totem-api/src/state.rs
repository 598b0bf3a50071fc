//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor. Everything in it is cheap to clone and
//! clones share the same underlying data.
//!
//! - **Catalog** — cached catalog service over Postgres or memory
//! - **Sessions** — admin sessions behind the signed cookie
//! - **Login limiter** — fixed-window limit on `/api/login`
//! - **Cookie key** — derived from `SESSION_SECRET`
//! - **Database pool** — present when `DATABASE_URL` is configured

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use sqlx::PgPool;

use crate::auth::SessionStore;
use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::icons::IconStore;
use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub sessions: SessionStore,
    pub login_limiter: RateLimiter,
    pub cookie_key: Key,
    /// `None` in in-memory mode.
    pub db_pool: Option<PgPool>,
    pub config: Arc<AppConfig>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("catalog", &self.catalog)
            .field("sessions", &self.sessions.len())
            .field("cookie_key", &"[REDACTED]")
            .field("db_pool", &self.db_pool.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

impl AppState {
    /// Development state: default configuration, in-memory catalog.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None)
    }

    /// Build state from configuration and an optional database pool.
    pub fn with_config(config: AppConfig, db_pool: Option<PgPool>) -> Self {
        let icons = IconStore::new(config.icons_dir.clone());
        let catalog = Catalog::new(db_pool.clone(), config.cache_ttls, icons);
        let cookie_key = derive_cookie_key(config.session_secret.expose());
        Self {
            catalog,
            sessions: SessionStore::default(),
            login_limiter: RateLimiter::new(
                RateLimitConfig::login().with_trusted_proxy_hops(config.trusted_proxy_hops),
            ),
            cookie_key,
            db_pool,
            config: Arc::new(config),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Stretch the session secret to the 64 bytes the cookie signer needs.
fn derive_cookie_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_in_memory() {
        let state = AppState::new();
        assert!(state.db_pool.is_none());
        assert!(!state.catalog.is_persistent());
        assert!(state.sessions.is_empty());
    }

    #[test]
    fn cookie_key_depends_on_secret() {
        let a = derive_cookie_key("one");
        let b = derive_cookie_key("one");
        let c = derive_cookie_key("two");
        assert_eq!(a.master(), b.master());
        assert_ne!(a.master(), c.master());
    }

    #[test]
    fn debug_hides_key() {
        let debug = format!("{:?}", AppState::new());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("totem-admin-secret-key"));
    }
}
