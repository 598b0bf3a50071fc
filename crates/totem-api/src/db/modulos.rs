//! Counter persistence operations on the `modulos` table.
//!
//! Rows come back in id order; callers apply the canonical counter order
//! (`totem_core::sort_modulos`) since it compares digits inside free-text
//! labels, which SQL ordering cannot express portably.

use sqlx::PgPool;
use totem_core::{Modulo, ModuloInput};

const COLUMNS: &str = "id, nombre, numero, piso, icono";

pub async fn list(pool: &PgPool) -> Result<Vec<Modulo>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ModuloRow>(&format!("SELECT {COLUMNS} FROM modulos ORDER BY id"))
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(ModuloRow::into_record).collect())
}

/// Counters associated with one procedure.
pub async fn list_for_tramite(pool: &PgPool, tramite_id: i64) -> Result<Vec<Modulo>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ModuloRow>(
        "SELECT m.id, m.nombre, m.numero, m.piso, m.icono
         FROM modulos m
         JOIN tramite_modulo tm ON tm.modulo_id = m.id
         WHERE tm.tramite_id = $1
         ORDER BY m.id",
    )
    .bind(tramite_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ModuloRow::into_record).collect())
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<Modulo>, sqlx::Error> {
    let row = sqlx::query_as::<_, ModuloRow>(&format!("SELECT {COLUMNS} FROM modulos WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(ModuloRow::into_record))
}

pub async fn insert(pool: &PgPool, input: &ModuloInput) -> Result<Modulo, sqlx::Error> {
    let row = sqlx::query_as::<_, ModuloRow>(&format!(
        "INSERT INTO modulos (nombre, numero, piso, icono) VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
    ))
    .bind(&input.nombre)
    .bind(&input.numero)
    .bind(&input.piso)
    .bind(&input.icono)
    .fetch_one(pool)
    .await?;

    Ok(row.into_record())
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    input: &ModuloInput,
) -> Result<Option<Modulo>, sqlx::Error> {
    let row = sqlx::query_as::<_, ModuloRow>(&format!(
        "UPDATE modulos SET nombre = $1, numero = $2, piso = $3, icono = $4
         WHERE id = $5 RETURNING {COLUMNS}"
    ))
    .bind(&input.nombre)
    .bind(&input.numero)
    .bind(&input.piso)
    .bind(&input.icono)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(ModuloRow::into_record))
}

/// Delete a counter; its associations cascade. Returns the removed row.
pub async fn delete(pool: &PgPool, id: i64) -> Result<Option<Modulo>, sqlx::Error> {
    let row = sqlx::query_as::<_, ModuloRow>(&format!(
        "DELETE FROM modulos WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(ModuloRow::into_record))
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct ModuloRow {
    id: i64,
    nombre: String,
    numero: Option<String>,
    piso: Option<String>,
    icono: Option<String>,
}

impl ModuloRow {
    fn into_record(self) -> Modulo {
        Modulo {
            id: self.id,
            nombre: self.nombre,
            numero: self.numero,
            piso: self.piso,
            icono: self.icono,
        }
    }
}
