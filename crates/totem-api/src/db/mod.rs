//! # Database Persistence Layer
//!
//! Postgres persistence for the catalog via SQLx.
//!
//! The database is **optional**. When `DATABASE_URL` is set the catalog
//! reads and writes the four tables created by `migrations/`; when absent
//! the service runs on [`crate::memory::MemoryCatalog`] and nothing survives
//! a restart.
//!
//! Each submodule owns one table and exposes plain async functions taking
//! a `&PgPool`. Cascading deletes are left to the foreign keys.

pub mod modulos;
pub mod requisitos;
pub mod tramite_modulo;
pub mod tramites;

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::SecretString;

/// Connect to Postgres and run migrations.
///
/// Returns `None` if no URL is configured (in-memory mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool(url: Option<&SecretString>) -> Result<Option<PgPool>, sqlx::Error> {
    let Some(url) = url else {
        tracing::warn!(
            "DATABASE_URL not set — running with the in-memory catalog. \
             Changes will not survive restarts."
        );
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .connect(url.expose())
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Readiness check: a trivial round trip.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}
