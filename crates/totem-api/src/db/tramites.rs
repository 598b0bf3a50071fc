//! Procedure persistence operations on the `tramites` table.

use sqlx::PgPool;
use totem_core::{Tramite, TramiteInput};

/// All procedures, oldest first.
pub async fn list(pool: &PgPool) -> Result<Vec<Tramite>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TramiteRow>("SELECT id, titulo, icono FROM tramites ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(TramiteRow::into_record).collect())
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<Tramite>, sqlx::Error> {
    let row = sqlx::query_as::<_, TramiteRow>("SELECT id, titulo, icono FROM tramites WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(TramiteRow::into_record))
}

pub async fn insert(pool: &PgPool, input: &TramiteInput) -> Result<Tramite, sqlx::Error> {
    let row = sqlx::query_as::<_, TramiteRow>(
        "INSERT INTO tramites (titulo, icono) VALUES ($1, $2) RETURNING id, titulo, icono",
    )
    .bind(&input.titulo)
    .bind(&input.icono)
    .fetch_one(pool)
    .await?;

    Ok(row.into_record())
}

/// Replace a procedure's fields. `None` if it does not exist.
pub async fn update(
    pool: &PgPool,
    id: i64,
    input: &TramiteInput,
) -> Result<Option<Tramite>, sqlx::Error> {
    let row = sqlx::query_as::<_, TramiteRow>(
        "UPDATE tramites SET titulo = $1, icono = $2 WHERE id = $3 RETURNING id, titulo, icono",
    )
    .bind(&input.titulo)
    .bind(&input.icono)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(TramiteRow::into_record))
}

/// Delete a procedure; its requirements and associations go with it
/// (`ON DELETE CASCADE`). Returns the removed row.
pub async fn delete(pool: &PgPool, id: i64) -> Result<Option<Tramite>, sqlx::Error> {
    let row = sqlx::query_as::<_, TramiteRow>(
        "DELETE FROM tramites WHERE id = $1 RETURNING id, titulo, icono",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(TramiteRow::into_record))
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct TramiteRow {
    id: i64,
    titulo: String,
    icono: Option<String>,
}

impl TramiteRow {
    fn into_record(self) -> Tramite {
        Tramite {
            id: self.id,
            titulo: self.titulo,
            icono: self.icono,
        }
    }
}
