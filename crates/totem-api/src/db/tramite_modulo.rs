//! Association persistence operations on the `tramite_modulo` table.
//!
//! The composite primary key rejects duplicate pairs (unique violation)
//! and the foreign keys reject unknown sides (foreign key violation);
//! the catalog service maps both to domain errors.

use sqlx::PgPool;
use totem_core::{AssociationFilter, TramiteModulo};

pub async fn list(
    pool: &PgPool,
    filter: AssociationFilter,
) -> Result<Vec<TramiteModulo>, sqlx::Error> {
    let rows = sqlx::query_as::<_, LinkRow>(
        "SELECT tramite_id, modulo_id FROM tramite_modulo
         WHERE ($1::BIGINT IS NULL OR tramite_id = $1)
           AND ($2::BIGINT IS NULL OR modulo_id = $2)
         ORDER BY tramite_id, modulo_id",
    )
    .bind(filter.tramite_id)
    .bind(filter.modulo_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(LinkRow::into_record).collect())
}

pub async fn get(pool: &PgPool, link: TramiteModulo) -> Result<Option<TramiteModulo>, sqlx::Error> {
    let row = sqlx::query_as::<_, LinkRow>(
        "SELECT tramite_id, modulo_id FROM tramite_modulo WHERE tramite_id = $1 AND modulo_id = $2",
    )
    .bind(link.tramite_id)
    .bind(link.modulo_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(LinkRow::into_record))
}

pub async fn insert(pool: &PgPool, link: TramiteModulo) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO tramite_modulo (tramite_id, modulo_id) VALUES ($1, $2)")
        .bind(link.tramite_id)
        .bind(link.modulo_id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn delete(pool: &PgPool, link: TramiteModulo) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tramite_modulo WHERE tramite_id = $1 AND modulo_id = $2")
        .bind(link.tramite_id)
        .bind(link.modulo_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct LinkRow {
    tramite_id: i64,
    modulo_id: i64,
}

impl LinkRow {
    fn into_record(self) -> TramiteModulo {
        TramiteModulo {
            tramite_id: self.tramite_id,
            modulo_id: self.modulo_id,
        }
    }
}
